use crate::intake::action::{MealItem, append_note};

/// Lower-case, drop punctuation, collapse whitespace.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn item_key(item: &MealItem) -> String {
    let key = normalize_key(&item.usda_query);
    if key.is_empty() {
        normalize_key(&item.label)
    } else {
        key
    }
}

fn add_optional(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

/// Collapse items that describe the same food, keeping first-seen order.
pub fn merge_items(items: Vec<MealItem>) -> Vec<MealItem> {
    let mut merged: Vec<(String, MealItem)> = Vec::with_capacity(items.len());
    for item in items {
        let key = item_key(&item);
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, kept)) => {
                kept.grams_consumed = add_optional(kept.grams_consumed, item.grams_consumed);
                kept.servings = add_optional(kept.servings, item.servings);
                if let Some(notes) = item.notes.as_deref() {
                    for line in notes.lines() {
                        append_note(&mut kept.notes, line);
                    }
                }
            }
            None => merged.push((key, item)),
        }
    }
    merged.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, query: &str, grams: Option<f64>, notes: Option<&str>) -> MealItem {
        let mut item = MealItem::new(label, query);
        item.grams_consumed = grams;
        item.notes = notes.map(str::to_string);
        item
    }

    #[test]
    fn same_food_merges_and_sums_grams() {
        let merged = merge_items(vec![
            item("olive oil", "Olive Oil", Some(10.0), Some("drizzled")),
            item("salmon", "salmon, cooked", Some(120.0), None),
            item("oil", "olive  oil.", Some(5.0), Some("drizzled\nfrom the pan")),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].label, "olive oil");
        assert_eq!(merged[0].grams_consumed, Some(15.0));
        assert_eq!(merged[0].notes.as_deref(), Some("drizzled\nfrom the pan"));
    }

    #[test]
    fn one_sided_amounts_are_kept() {
        let mut with_servings = item("egg", "egg", None, None);
        with_servings.servings = Some(2.0);
        let merged = merge_items(vec![item("egg", "egg", Some(50.0), None), with_servings]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].grams_consumed, Some(50.0));
        assert_eq!(merged[0].servings, Some(2.0));
    }

    #[test]
    fn label_is_the_key_when_query_is_blank() {
        let merged = merge_items(vec![
            item("Toast", " ", None, None),
            item("toast!", "", None, None),
        ]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn normalize_key_strips_punctuation_and_spacing() {
        assert_eq!(normalize_key("  Egg, Whole;  COOKED "), "egg whole cooked");
    }
}
