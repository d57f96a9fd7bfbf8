//! Deterministic post-processing for validated plans. Every rule is plain
//! text matching against the user's note; nothing here calls a model.

pub mod fats;
pub mod medication;
pub mod merge;
pub mod portions;
pub mod quantity;
pub mod tables;

use crate::intake::action::{ActionKind, AssistantPlan, MAX_ACTIONS, MAX_MEAL_ITEMS, MealItem};
pub use tables::{DEFAULT_TABLES, HeuristicTables};

/// Whether the item's label or query names `term` as a whole word.
pub fn item_mentions(item: &MealItem, term: &str) -> bool {
    quantity::mentions(&item.label, term) || quantity::mentions(&item.usda_query, term)
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Bring a plan back inside the envelope limits.
pub fn clamp_and_cap(plan: &mut AssistantPlan) {
    plan.actions.truncate(MAX_ACTIONS);
    for action in &mut plan.actions {
        action.confidence = clamp_confidence(action.confidence);
        match &mut action.kind {
            ActionKind::LogMeal(meal) => meal.items.truncate(MAX_MEAL_ITEMS),
            ActionKind::EditMeal(edit) => {
                if let Some(items) = edit.items.as_mut() {
                    items.truncate(MAX_MEAL_ITEMS);
                }
            }
            _ => {}
        }
    }
    if let Some(decision) = plan.decision.as_mut() {
        decision.confidence = clamp_confidence(decision.confidence);
    }
}

/// Run every enrichment rule in order: cooking fat, salt, medication,
/// portion count, merge, then clamp and cap.
pub fn enrich(plan: &mut AssistantPlan, text: &str, today: Option<&str>, tables: &HeuristicTables) {
    if let Some(meal) = plan.first_meal_mut() {
        fats::add_cooking_fats(meal, text, tables.fats);
        fats::add_salt(meal, text, &tables.salt);
    }

    medication::apply_medications(&mut plan.actions, text, today, tables.medications);

    if let Some(meal) = plan.first_meal_mut() {
        portions::apply_portion_counts(meal, text, tables.portions);
        meal.items = merge::merge_items(std::mem::take(&mut meal.items));
    }

    clamp_and_cap(plan);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::action::{Action, MealData, SupplementData};

    fn meal_plan(items: Vec<MealItem>) -> AssistantPlan {
        AssistantPlan {
            message: "Logged.".to_string(),
            actions: vec![Action {
                kind: ActionKind::LogMeal(MealData {
                    date: None,
                    meal_type: None,
                    items,
                    notes: None,
                }),
                title: "Meal".to_string(),
                confidence: 0.9,
            }],
            decision: None,
        }
    }

    fn first_meal(plan: &AssistantPlan) -> &MealData {
        plan.actions
            .iter()
            .find_map(|action| match &action.kind {
                ActionKind::LogMeal(meal) => Some(meal),
                _ => None,
            })
            .expect("meal action")
    }

    #[test]
    fn full_breakfast_note_is_enriched_end_to_end() {
        let mut egg = MealItem::new("egg", "egg, whole, fried");
        egg.servings = Some(2.0);
        let mut plan = meal_plan(vec![egg, MealItem::new("toast", "bread, toasted")]);

        enrich(
            &mut plan,
            "2 eggs fried in 1 tbsp butter, toast, a pinch of salt, and took 2 advil",
            Some("2024-03-09"),
            &DEFAULT_TABLES,
        );

        let meal = first_meal(&plan);
        let labels: Vec<&str> = meal.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["egg", "toast", "butter"]);
        assert_eq!(meal.items[0].grams_consumed, Some(100.0));
        assert_eq!(meal.items[2].grams_consumed, Some(14.2));
        assert_eq!(meal.notes.as_deref(), Some(fats::SALT_NOTE));

        let ActionKind::LogSupplement(SupplementData {
            supplement, dosage, ..
        }) = &plan.actions[1].kind
        else {
            panic!("expected supplement action");
        };
        assert_eq!(supplement, "ibuprofen");
        assert_eq!(*dosage, Some(400.0));
    }

    #[test]
    fn duplicate_fat_items_merge() {
        let mut first = MealItem::new("olive oil", "olive oil");
        first.grams_consumed = Some(10.0);
        let mut second = MealItem::new("Olive oil", "Olive oil");
        second.grams_consumed = Some(5.0);
        let mut plan = meal_plan(vec![first, second]);
        enrich(&mut plan, "salad with olive oil", None, &DEFAULT_TABLES);
        let meal = first_meal(&plan);
        assert_eq!(meal.items.len(), 1);
        assert_eq!(meal.items[0].grams_consumed, Some(15.0));
    }

    #[test]
    fn plans_without_meals_only_get_medication_rules() {
        let mut plan = AssistantPlan {
            message: "Noted.".to_string(),
            actions: Vec::new(),
            decision: None,
        };
        enrich(&mut plan, "1 tbsp olive oil and 2 advil", None, &DEFAULT_TABLES);
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(plan.actions[0].kind.type_tag(), "log_supplement");
    }

    #[test]
    fn clamp_and_cap_enforces_envelope_limits() {
        let items = (0..15)
            .map(|idx| MealItem::new(format!("item {idx}"), format!("food {idx}")))
            .collect();
        let mut plan = meal_plan(items);
        plan.actions[0].confidence = 1.4;
        for _ in 0..13 {
            let copy = plan.actions[0].clone();
            plan.actions.push(copy);
        }
        clamp_and_cap(&mut plan);
        assert_eq!(plan.actions.len(), MAX_ACTIONS);
        assert_eq!(plan.actions[0].confidence, 1.0);
        assert_eq!(first_meal(&plan).items.len(), MAX_MEAL_ITEMS);
    }
}
