use regex::Regex;
use std::sync::LazyLock;

const NUMBER_WORDS: [&str; 12] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve",
];

const COUNT_TOKEN: &str =
    r"\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|an|a";

const MAX_MEDICATION_COUNT: u32 = 10;
const MAX_PORTION_COUNT: u32 = 12;
/// Words allowed between a spoon measure and the food it measures.
const MAX_GAP_WORDS: usize = 2;

static SPOON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?|one|two|three)\s*(tablespoons?|tbsps?|tsps?|teaspoons?)\b")
        .expect("spoon pattern compiles")
});

static TABLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b({COUNT_TOKEN})\s+(?:([a-z]+)\s+)?(?:{TABLET_WORDS})\b"
    ))
    .expect("tablet pattern compiles")
});

const TABLET_WORDS: &str = r"tablets?|pills?|capsules?|caplets?|softgels?|gelcaps?";

/// Words that may sit between a count and a tablet word without naming
/// another product.
const TABLET_QUALIFIERS: [&str; 5] = ["small", "large", "extra", "more", "white"];

/// Units that turn a leading number into a measure rather than a count.
const MEASURE_UNITS: [&str; 16] = [
    "oz", "ozs", "ounce", "ounces", "g", "gr", "gram", "grams", "lb", "lbs", "pound", "pounds",
    "kg", "ml", "cup", "cups",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoonUnit {
    Tablespoon,
    Teaspoon,
}

impl SpoonUnit {
    pub fn label(self) -> &'static str {
        match self {
            SpoonUnit::Tablespoon => "tbsp",
            SpoonUnit::Teaspoon => "tsp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpoonMeasure {
    pub amount: f64,
    pub unit: SpoonUnit,
}

impl SpoonMeasure {
    pub fn in_tablespoons(self) -> f64 {
        match self.unit {
            SpoonUnit::Tablespoon => self.amount,
            SpoonUnit::Teaspoon => self.amount / 3.0,
        }
    }

    pub fn describe(self) -> String {
        format!("{} {}", format_amount(self.amount), self.unit.label())
    }
}

/// `12.0` → `12`, `13.5` → `13.5`, `4.333` → `4.33`.
pub fn format_amount(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn round_grams(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Numeric, spelled one–twelve, or `a`/`an` (both 1).
pub fn parse_count(token: &str) -> Option<u32> {
    let token = token.trim().to_ascii_lowercase();
    if token == "a" || token == "an" {
        return Some(1);
    }
    if let Some(idx) = NUMBER_WORDS.iter().position(|word| *word == token) {
        return Some(idx as u32 + 1);
    }
    token.parse::<u32>().ok()
}

fn parse_amount(token: &str) -> Option<f64> {
    match token {
        "one" => Some(1.0),
        "two" => Some(2.0),
        "three" => Some(3.0),
        other => other.parse::<f64>().ok().filter(|v| *v > 0.0),
    }
}

fn word_pattern(term: &str) -> String {
    term.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Byte spans of `term` as a whole word (plural `s`/`es` allowed).
fn term_spans(text: &str, term: &str) -> Vec<(usize, usize)> {
    let Ok(re) = Regex::new(&format!(r"\b{}(?:e?s)?\b", word_pattern(term))) else {
        return Vec::new();
    };
    re.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

pub fn mentions(text: &str, term: &str) -> bool {
    !term_spans(&text.to_lowercase(), term).is_empty()
}

/// Whole-word occurrences of `term` that are not directly preceded by one of
/// `excluded` (so `butter` does not fire on `peanut butter`).
pub fn mentions_unqualified(text: &str, term: &str, excluded: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    term_spans(&lowered, term).into_iter().any(|(start, _)| {
        let previous = lowered[..start].split_whitespace().next_back();
        !previous.is_some_and(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            excluded.contains(&word)
        })
    })
}

fn gap_is_short(gap: &str) -> bool {
    if gap.contains(['.', ';', '!', '?']) {
        return false;
    }
    let words: Vec<&str> = gap
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .filter(|w| !matches!(*w, "of" | "about" | "around" | "roughly"))
        .collect();
    words.len() <= MAX_GAP_WORDS && !words.iter().any(|w| matches!(*w, "and" | "with" | "plus"))
}

/// Nearest `N tbsp|tablespoon(s)|tsp|teaspoon(s)` to `term`, where N is a
/// decimal or one/two/three. The measure must sit right before the term
/// (`1 tbsp of olive oil`) or right after it (`salt, 1 tsp`).
pub fn spoon_measure_near(text: &str, term: &str) -> Option<SpoonMeasure> {
    let lowered = text.to_lowercase();
    let spans = term_spans(&lowered, term);
    let mut best: Option<(usize, SpoonMeasure)> = None;

    for caps in SPOON_RE.captures_iter(&lowered) {
        let (Some(whole), Some(number), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(amount) = parse_amount(number.as_str()) else {
            continue;
        };
        let unit = if unit.as_str().starts_with("tsp") || unit.as_str().starts_with("tea") {
            SpoonUnit::Teaspoon
        } else {
            SpoonUnit::Tablespoon
        };

        for &(start, end) in &spans {
            let gap = if whole.end() <= start {
                &lowered[whole.end()..start]
            } else if end <= whole.start() {
                &lowered[end..whole.start()]
            } else {
                continue;
            };
            if !gap_is_short(gap) {
                continue;
            }
            let distance = gap.len();
            if best.is_none_or(|(current, _)| distance < current) {
                best = Some((distance, SpoonMeasure { amount, unit }));
            }
        }
    }
    best.map(|(_, measure)| measure)
}

/// Units count near a medication name, 1–10. Recognizes `N <syn>`,
/// `N x <syn>`, `<syn> N`, `<syn> xN`, and a count before a
/// tablet/pill/capsule word. `<syn> 200 mg` is a dose, not a count.
pub fn medication_count(text: &str, synonym: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    let syn = word_pattern(synonym);
    let in_range = |count: u32| (1..=MAX_MEDICATION_COUNT).contains(&count);

    let before = Regex::new(&format!(r"\b({COUNT_TOKEN})\s*(?:x\s*)?{syn}s?\b")).ok()?;
    if let Some(count) = before
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_count(m.as_str()))
        .filter(|c| in_range(*c))
    {
        return Some(count);
    }

    let after = Regex::new(&format!(
        r"\b{syn}s?\s*(x\s*)?(\d+|{words})\b\s*((?:mg|mcg|milligrams?|g|ml)\b)?",
        words = NUMBER_WORDS.join("|")
    ))
    .ok()?;
    for caps in after.captures_iter(&lowered) {
        if caps.get(3).is_some() {
            continue;
        }
        if let Some(count) = caps
            .get(2)
            .and_then(|m| parse_count(m.as_str()))
            .filter(|c| in_range(*c))
        {
            return Some(count);
        }
    }

    tablet_count_near(&lowered, synonym).filter(|c| in_range(*c))
}

/// `N tablets` within a short gap of `synonym`, where any word between the
/// count and the tablet word is the synonym itself or a plain qualifier.
fn tablet_count_near(lowered: &str, synonym: &str) -> Option<u32> {
    let spans = term_spans(lowered, synonym);
    let syn_words: Vec<&str> = synonym.split_whitespace().collect();
    for caps in TABLET_RE.captures_iter(lowered) {
        let (Some(whole), Some(count)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some(inner) = caps.get(2) {
            let word = inner.as_str();
            let names_synonym = syn_words
                .iter()
                .any(|syn| word == *syn || word.strip_suffix('s') == Some(*syn));
            if !names_synonym && !TABLET_QUALIFIERS.contains(&word) {
                continue;
            }
        }
        let near = spans.iter().any(|&(start, end)| {
            if whole.start() <= start && end <= whole.end() {
                return true;
            }
            let gap = if whole.end() <= start {
                &lowered[whole.end()..start]
            } else if end <= whole.start() {
                &lowered[end..whole.start()]
            } else {
                return false;
            };
            gap_is_short(gap)
        });
        if near && let Some(count) = parse_count(count.as_str()) {
            return Some(count);
        }
    }
    None
}

/// An explicit milligram dose stated next to the medication name
/// (`400 mg ibuprofen`, `advil 400mg`).
pub fn stated_dose_mg(text: &str, synonym: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    let syn = word_pattern(synonym);
    let re = Regex::new(&format!(
        r"\b(\d+(?:\.\d+)?)\s*(?:mg|milligrams?)\s+(?:of\s+)?{syn}\b|\b{syn}s?\s+(\d+(?:\.\d+)?)\s*(?:mg|milligrams?)\b"
    ))
    .ok()?;
    let caps = re.captures(&lowered)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|dose| *dose > 0.0)
}

/// How many of a countable food the note mentions. Recognizes `N <term>`,
/// `N x <term>`, `N <adjective> <term>`, `N slices|strips|pieces of <term>`,
/// `<term> N` and `<term> xN`; N is numeric, one–twelve, or `a`/`an`.
/// A weight or volume unit in the adjective slot (`8 oz chicken breast`) is
/// a measure, not a count.
pub fn portion_count(text: &str, term: &str) -> Option<u32> {
    let lowered = text.to_lowercase();
    let pattern = word_pattern(term);
    let in_range = |count: u32| (1..=MAX_PORTION_COUNT).contains(&count);

    let before = Regex::new(&format!(
        r"\b({COUNT_TOKEN})\s+(?:x\s*)?(?:(?:slices?|strips?|pieces?|rashers?) of\s+|([a-z-]+)\s+)?{pattern}(?:e?s)?\b"
    ))
    .ok()?;
    for caps in before.captures_iter(&lowered) {
        if caps
            .get(2)
            .is_some_and(|word| MEASURE_UNITS.contains(&word.as_str()))
        {
            continue;
        }
        if let Some(count) = caps
            .get(1)
            .and_then(|m| parse_count(m.as_str()))
            .filter(|c| in_range(*c))
        {
            return Some(count);
        }
    }

    let after = Regex::new(&format!(
        r"\b{pattern}(?:e?s)?\s*(?:x\s*)?(\d+|{words})\b",
        words = NUMBER_WORDS.join("|")
    ))
    .ok()?;
    after
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1).and_then(|m| parse_count(m.as_str())))
        .find(|c| in_range(*c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoon_measure_reads_numbers_and_words() {
        let measure =
            spoon_measure_near("salmon with 1 tbsp olive oil", "olive oil").expect("measure");
        assert_eq!(measure.amount, 1.0);
        assert_eq!(measure.unit, SpoonUnit::Tablespoon);

        let measure =
            spoon_measure_near("two teaspoons of butter on toast", "butter").expect("measure");
        assert_eq!(measure.unit, SpoonUnit::Teaspoon);
        assert_eq!(measure.describe(), "2 tsp");

        let measure =
            spoon_measure_near("1.5 tbsp extra virgin olive oil", "olive oil").expect("measure");
        assert_eq!(measure.amount, 1.5);
    }

    #[test]
    fn spoon_measure_prefers_the_nearest_term() {
        let text = "1 tbsp butter and 2 tsp olive oil";
        assert_eq!(spoon_measure_near(text, "butter").map(|m| m.amount), Some(1.0));
        assert_eq!(spoon_measure_near(text, "olive oil").map(|m| m.amount), Some(2.0));
        // Salt after "and" does not borrow the oil's measure.
        assert_eq!(spoon_measure_near("1 tbsp olive oil and salt", "salt"), None);
        assert_eq!(spoon_measure_near("eggs, salt, 1 tsp", "salt").map(|m| m.amount), Some(1.0));
    }

    #[test]
    fn spoon_measure_absent_without_explicit_amount() {
        assert_eq!(spoon_measure_near("fried in olive oil", "olive oil"), None);
        assert_eq!(spoon_measure_near("a tbsp of olive oil", "olive oil"), None);
    }

    #[test]
    fn medication_count_patterns() {
        assert_eq!(medication_count("took 2 advil", "advil"), Some(2));
        assert_eq!(medication_count("took two advils", "advil"), Some(2));
        assert_eq!(medication_count("3 x tylenol", "tylenol"), Some(3));
        assert_eq!(medication_count("ibuprofen 2 after lunch", "ibuprofen"), Some(2));
        assert_eq!(medication_count("aleve x2", "aleve"), Some(2));
        assert_eq!(medication_count("two pills of aleve", "aleve"), Some(2));
        assert_eq!(medication_count("took an advil", "advil"), Some(1));
    }

    #[test]
    fn medication_count_rejects_doses_and_out_of_range() {
        assert_eq!(medication_count("ibuprofen 200 mg", "ibuprofen"), None);
        assert_eq!(medication_count("ibuprofen 200mg", "ibuprofen"), None);
        assert_eq!(medication_count("took 40 advil", "advil"), None);
        assert_eq!(medication_count("took advil", "advil"), None);
    }

    #[test]
    fn tablet_count_stays_with_its_medication() {
        assert_eq!(medication_count("took advil, then 3 magnesium capsules", "advil"), None);
        assert_eq!(medication_count("advil, 2 tablets", "advil"), Some(2));
        assert_eq!(medication_count("2 small tablets of tylenol", "tylenol"), Some(2));
        assert_eq!(
            medication_count("2 tablets after a long day at work, then advil", "advil"),
            None
        );
    }

    #[test]
    fn stated_dose_is_read_in_either_order() {
        assert_eq!(stated_dose_mg("400 mg ibuprofen", "ibuprofen"), Some(400.0));
        assert_eq!(stated_dose_mg("advil 600mg", "advil"), Some(600.0));
        assert_eq!(stated_dose_mg("took 2 advil", "advil"), None);
    }

    #[test]
    fn portion_count_patterns() {
        assert_eq!(portion_count("2 eggs and toast", "egg"), Some(2));
        assert_eq!(portion_count("three scrambled eggs", "egg"), Some(3));
        assert_eq!(portion_count("4 strips of bacon", "bacon"), Some(4));
        assert_eq!(portion_count("a waffle with syrup", "waffle"), Some(1));
        assert_eq!(portion_count("eggs x3", "egg"), Some(3));
        assert_eq!(portion_count("chicken breast 2", "chicken breast"), Some(2));
        assert_eq!(portion_count("2 x chicken thighs", "chicken thigh"), Some(2));
        assert_eq!(portion_count("bacon and eggs", "egg"), None);
    }

    #[test]
    fn portion_count_ignores_weights_and_volumes() {
        assert_eq!(portion_count("had 8 oz chicken breast", "chicken breast"), None);
        assert_eq!(portion_count("200 g salmon fillet", "salmon fillet"), None);
        assert_eq!(portion_count("2 cups rice", "rice"), None);
        assert_eq!(portion_count("8 oz steak and 2 eggs", "egg"), Some(2));
    }

    #[test]
    fn unqualified_mentions_skip_nut_butters() {
        let excluded = ["peanut", "almond"];
        assert!(!mentions_unqualified("toast with peanut butter", "butter", &excluded));
        assert!(mentions_unqualified("peanut butter toast, eggs in butter", "butter", &excluded));
        assert!(!mentions_unqualified("buttermilk pancakes", "butter", &excluded));
    }

    #[test]
    fn formats_amounts_without_trailing_zeros() {
        assert_eq!(format_amount(13.5), "13.5");
        assert_eq!(format_amount(400.0), "400");
        assert_eq!(format_amount(4.5 / 3.0 * 3.0), "4.5");
        assert_eq!(round_grams(13.5 * 2.0 / 3.0), 9.0);
    }
}
