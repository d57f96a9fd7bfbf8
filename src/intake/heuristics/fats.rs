use crate::intake::action::{MealData, MealItem, append_note};
use crate::intake::heuristics::item_mentions;
use crate::intake::heuristics::quantity::{
    SpoonUnit, format_amount, mentions, mentions_unqualified, round_grams, spoon_measure_near,
};
use crate::intake::heuristics::tables::{CookingFat, SaltConstants};

pub const SALT_NOTE: &str = "Salt mentioned without an amount; not estimated.";

fn already_listed(meal: &MealData, fat: &CookingFat) -> bool {
    meal.items.iter().any(|item| {
        item_mentions(item, fat.name) || fat.synonyms.iter().any(|syn| item_mentions(item, syn))
    })
}

/// Append one item per cooking fat the note names but the meal lacks.
/// Grams are only filled when a spoon measure sits next to the fat.
pub fn add_cooking_fats(meal: &mut MealData, text: &str, fats: &[CookingFat]) {
    for fat in fats {
        let Some(synonym) = fat
            .synonyms
            .iter()
            .find(|syn| mentions_unqualified(text, syn, fat.excluded_before))
        else {
            continue;
        };
        if already_listed(meal, fat) {
            continue;
        }

        let mut item = MealItem::new(fat.name, fat.usda_query);
        if let Some(measure) = spoon_measure_near(text, synonym) {
            let grams = round_grams(measure.in_tablespoons() * fat.grams_per_tbsp);
            item.grams_consumed = Some(grams);
            item.append_note(&format!(
                "assumed {} {} ≈ {} g",
                measure.describe(),
                fat.name,
                format_amount(grams)
            ));
        }
        meal.items.push(item);
    }
}

pub fn add_salt(meal: &mut MealData, text: &str, salt: &SaltConstants) {
    if !mentions(text, "salt") {
        return;
    }
    if meal.items.iter().any(|item| item_mentions(item, "salt")) {
        return;
    }

    match spoon_measure_near(text, "salt") {
        Some(measure) => {
            let per_unit = match measure.unit {
                SpoonUnit::Teaspoon => salt.grams_per_tsp,
                SpoonUnit::Tablespoon => salt.grams_per_tbsp,
            };
            let grams = round_grams(measure.amount * per_unit);
            let mut item = MealItem::new(salt.label, salt.usda_query);
            item.grams_consumed = Some(grams);
            item.append_note(&format!(
                "assumed {} salt ≈ {} g",
                measure.describe(),
                format_amount(grams)
            ));
            meal.items.push(item);
        }
        None => append_note(&mut meal.notes, SALT_NOTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::heuristics::tables::{COOKING_FATS, TABLE_SALT};

    fn meal_of(labels: &[&str]) -> MealData {
        MealData {
            date: None,
            meal_type: None,
            items: labels.iter().map(|l| MealItem::new(*l, *l)).collect(),
            notes: None,
        }
    }

    #[test]
    fn measured_olive_oil_becomes_a_weighed_item() {
        let mut meal = meal_of(&["salmon"]);
        add_cooking_fats(&mut meal, "salmon with 1 tbsp olive oil", COOKING_FATS);
        assert_eq!(meal.items.len(), 2);
        let oil = &meal.items[1];
        assert!(oil.usda_query.contains("olive oil"));
        assert_eq!(oil.grams_consumed, Some(13.5));
        assert!(oil.notes.as_deref().unwrap_or("").contains("1 tbsp"));
    }

    #[test]
    fn teaspoons_convert_to_a_third_of_a_tablespoon() {
        let mut meal = meal_of(&["toast"]);
        add_cooking_fats(&mut meal, "toast with 3 tsp butter", COOKING_FATS);
        assert_eq!(meal.items[1].grams_consumed, Some(14.2));
    }

    #[test]
    fn unmeasured_fat_is_added_without_grams() {
        let mut meal = meal_of(&["eggs"]);
        add_cooking_fats(&mut meal, "eggs fried in butter", COOKING_FATS);
        assert_eq!(meal.items[1].label, "butter");
        assert_eq!(meal.items[1].grams_consumed, None);
        assert_eq!(meal.items[1].notes, None);
    }

    #[test]
    fn existing_or_disqualified_fats_are_left_alone() {
        let mut meal = meal_of(&["salmon", "olive oil"]);
        add_cooking_fats(&mut meal, "salmon with 1 tbsp olive oil", COOKING_FATS);
        assert_eq!(meal.items.len(), 2);

        let mut toast = meal_of(&["toast"]);
        add_cooking_fats(&mut toast, "toast with peanut butter", COOKING_FATS);
        assert_eq!(toast.items.len(), 1);
    }

    #[test]
    fn measured_salt_is_weighed() {
        let mut meal = meal_of(&["rice"]);
        add_salt(&mut meal, "rice with 1 tsp salt", &TABLE_SALT);
        let salt = &meal.items[1];
        assert_eq!(salt.usda_query, "salt, table");
        assert_eq!(salt.grams_consumed, Some(6.0));
    }

    #[test]
    fn unmeasured_salt_only_leaves_a_note_once() {
        let mut meal = meal_of(&["rice"]);
        add_salt(&mut meal, "rice with salt", &TABLE_SALT);
        add_salt(&mut meal, "rice with salt", &TABLE_SALT);
        assert_eq!(meal.items.len(), 1);
        assert_eq!(meal.notes.as_deref(), Some(SALT_NOTE));
    }

    #[test]
    fn salted_and_listed_salt_do_not_fire() {
        let mut meal = meal_of(&["popcorn"]);
        add_salt(&mut meal, "salted popcorn", &TABLE_SALT);
        assert_eq!(meal.notes, None);

        let mut meal = meal_of(&["fries", "sea salt"]);
        add_salt(&mut meal, "fries with sea salt", &TABLE_SALT);
        assert_eq!(meal.items.len(), 2);
        assert_eq!(meal.notes, None);
    }
}
