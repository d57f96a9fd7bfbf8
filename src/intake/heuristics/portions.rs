use crate::intake::action::MealData;
use crate::intake::heuristics::item_mentions;
use crate::intake::heuristics::quantity::{format_amount, portion_count, round_grams};
use crate::intake::heuristics::tables::PortionFood;

const MAX_SERVINGS_AS_COUNT: f64 = 6.0;

/// Small whole `servings` values are usually a miscoded count ("2 eggs").
fn servings_as_count(servings: Option<f64>) -> Option<u32> {
    let servings = servings?;
    if servings.fract() == 0.0 && (1.0..=MAX_SERVINGS_AS_COUNT).contains(&servings) {
        Some(servings as u32)
    } else {
        None
    }
}

/// Turn counted foods into weights for items the model left without grams.
pub fn apply_portion_counts(meal: &mut MealData, text: &str, foods: &[PortionFood]) {
    for item in meal.items.iter_mut().filter(|item| item.grams_consumed.is_none()) {
        let Some((food, term)) = foods.iter().find_map(|food| {
            food.terms
                .iter()
                .find(|term| item_mentions(item, term))
                .map(|term| (food, *term))
        }) else {
            continue;
        };

        let Some(count) = portion_count(text, term).or_else(|| servings_as_count(item.servings))
        else {
            continue;
        };

        item.grams_consumed = Some(round_grams(f64::from(count) * food.grams_per_unit));
        item.servings = None;
        item.append_note(&format!(
            "assumed {count} × {} ≈ {} g each",
            food.name,
            format_amount(food.grams_per_unit)
        ));
    }
}
