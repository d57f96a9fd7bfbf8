/// A cooking fat the model tends to leave out of meal logs.
#[derive(Debug, Clone, Copy)]
pub struct CookingFat {
    pub name: &'static str,
    pub usda_query: &'static str,
    pub synonyms: &'static [&'static str],
    pub grams_per_tbsp: f64,
    /// Words that turn a synonym into a different food (`peanut butter`).
    pub excluded_before: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct Medication {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    pub dose_per_unit: f64,
    pub unit: &'static str,
    pub form: &'static str,
}

/// A food usually reported by count rather than weight.
#[derive(Debug, Clone, Copy)]
pub struct PortionFood {
    pub name: &'static str,
    pub terms: &'static [&'static str],
    pub grams_per_unit: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SaltConstants {
    pub label: &'static str,
    pub usda_query: &'static str,
    pub grams_per_tsp: f64,
    pub grams_per_tbsp: f64,
}

/// Lookup data for every enrichment rule. Tests swap in their own.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTables {
    pub fats: &'static [CookingFat],
    pub medications: &'static [Medication],
    pub portions: &'static [PortionFood],
    pub salt: SaltConstants,
}

const NUT_BUTTERS: &[&str] = &[
    "peanut", "almond", "cashew", "nut", "apple", "cocoa", "shea", "sunflower", "coconut",
];

pub const COOKING_FATS: &[CookingFat] = &[
    CookingFat {
        name: "olive oil",
        usda_query: "olive oil",
        synonyms: &["extra virgin olive oil", "olive oil", "evoo"],
        grams_per_tbsp: 13.5,
        excluded_before: &[],
    },
    CookingFat {
        name: "vegetable oil",
        usda_query: "vegetable oil",
        synonyms: &["vegetable oil"],
        grams_per_tbsp: 13.6,
        excluded_before: &[],
    },
    CookingFat {
        name: "canola oil",
        usda_query: "canola oil",
        synonyms: &["canola oil", "rapeseed oil"],
        grams_per_tbsp: 14.0,
        excluded_before: &[],
    },
    CookingFat {
        name: "coconut oil",
        usda_query: "coconut oil",
        synonyms: &["coconut oil"],
        grams_per_tbsp: 13.6,
        excluded_before: &[],
    },
    CookingFat {
        name: "avocado oil",
        usda_query: "avocado oil",
        synonyms: &["avocado oil"],
        grams_per_tbsp: 14.0,
        excluded_before: &[],
    },
    CookingFat {
        name: "sesame oil",
        usda_query: "sesame oil",
        synonyms: &["sesame oil"],
        grams_per_tbsp: 13.6,
        excluded_before: &[],
    },
    CookingFat {
        name: "butter",
        usda_query: "butter, salted",
        synonyms: &["butter"],
        grams_per_tbsp: 14.2,
        excluded_before: NUT_BUTTERS,
    },
    CookingFat {
        name: "ghee",
        usda_query: "ghee",
        synonyms: &["ghee", "clarified butter"],
        grams_per_tbsp: 12.8,
        excluded_before: &[],
    },
    CookingFat {
        name: "lard",
        usda_query: "lard",
        synonyms: &["lard"],
        grams_per_tbsp: 12.8,
        excluded_before: &[],
    },
];

pub const MEDICATIONS: &[Medication] = &[
    Medication {
        name: "ibuprofen",
        synonyms: &["ibuprofen", "advil", "motrin"],
        dose_per_unit: 200.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "acetaminophen",
        synonyms: &["acetaminophen", "tylenol", "paracetamol"],
        dose_per_unit: 500.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "naproxen",
        synonyms: &["naproxen", "aleve"],
        dose_per_unit: 220.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "aspirin",
        synonyms: &["aspirin", "bayer"],
        dose_per_unit: 325.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "diphenhydramine",
        synonyms: &["diphenhydramine", "benadryl"],
        dose_per_unit: 25.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "loratadine",
        synonyms: &["loratadine", "claritin"],
        dose_per_unit: 10.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "cetirizine",
        synonyms: &["cetirizine", "zyrtec"],
        dose_per_unit: 10.0,
        unit: "mg",
        form: "tablet",
    },
    Medication {
        name: "famotidine",
        synonyms: &["famotidine", "pepcid"],
        dose_per_unit: 20.0,
        unit: "mg",
        form: "tablet",
    },
];

pub const PORTION_FOODS: &[PortionFood] = &[
    PortionFood {
        name: "egg",
        terms: &["egg"],
        grams_per_unit: 50.0,
    },
    PortionFood {
        name: "bacon",
        terms: &["bacon"],
        grams_per_unit: 8.0,
    },
    PortionFood {
        name: "waffle",
        terms: &["waffle"],
        grams_per_unit: 75.0,
    },
    PortionFood {
        name: "chicken breast",
        terms: &["chicken breast"],
        grams_per_unit: 172.0,
    },
    PortionFood {
        name: "chicken thigh",
        terms: &["chicken thigh"],
        grams_per_unit: 109.0,
    },
];

pub const TABLE_SALT: SaltConstants = SaltConstants {
    label: "salt",
    usda_query: "salt, table",
    grams_per_tsp: 6.0,
    grams_per_tbsp: 18.0,
};

pub const DEFAULT_TABLES: HeuristicTables = HeuristicTables {
    fats: COOKING_FATS,
    medications: MEDICATIONS,
    portions: PORTION_FOODS,
    salt: TABLE_SALT,
};
