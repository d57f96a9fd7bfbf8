use crate::intake::action::{Action, ActionKind, SupplementData, append_note};
use crate::intake::heuristics::quantity::{
    format_amount, medication_count, mentions, stated_dose_mg,
};
use crate::intake::heuristics::tables::Medication;

pub const DERIVED_CONFIDENCE: f64 = 0.8;

const DEFAULT_UNITS: [&str; 5] = ["serving", "servings", "tablet", "pill", "capsule"];

struct DerivedDose {
    dose: f64,
    note: String,
}

fn derive_dose(text: &str, synonym: &str, medication: &Medication) -> DerivedDose {
    if let Some(dose) = stated_dose_mg(text, synonym) {
        return DerivedDose {
            dose,
            note: format!("{} {} as stated", format_amount(dose), medication.unit),
        };
    }
    let count = medication_count(text, synonym).unwrap_or(1);
    let dose = f64::from(count) * medication.dose_per_unit;
    DerivedDose {
        dose,
        note: format!(
            "assumed {count} × {} {} {} = {} {}",
            format_amount(medication.dose_per_unit),
            medication.unit,
            medication.form,
            format_amount(dose),
            medication.unit
        ),
    }
}

/// A supplement action the model filled with placeholder values only.
fn looks_default(data: &SupplementData) -> bool {
    match (data.dosage, data.unit.as_deref()) {
        (None, _) | (_, None) => true,
        (Some(dose), Some(unit)) => {
            dose == 1.0 && DEFAULT_UNITS.contains(&unit.trim().to_ascii_lowercase().as_str())
        }
    }
}

fn refers_to(data: &SupplementData, medication: &Medication) -> bool {
    mentions(&data.supplement, medication.name)
        || medication
            .synonyms
            .iter()
            .any(|syn| mentions(&data.supplement, syn))
}

fn title(medication: &Medication, dose: f64) -> String {
    let mut chars = medication.name.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{name} {} {}", format_amount(dose), medication.unit)
}

/// Add or complete a supplement action for every known over-the-counter
/// medication the note names.
pub fn apply_medications(
    actions: &mut Vec<Action>,
    text: &str,
    today: Option<&str>,
    medications: &[Medication],
) {
    for medication in medications {
        let Some(synonym) = medication.synonyms.iter().find(|syn| mentions(text, syn)) else {
            continue;
        };
        let derived = derive_dose(text, synonym, medication);

        let existing = actions.iter_mut().find_map(|action| match &mut action.kind {
            ActionKind::LogSupplement(data) if refers_to(data, medication) => {
                Some((data, &mut action.confidence, &mut action.title))
            }
            _ => None,
        });

        match existing {
            Some((data, confidence, action_title)) => {
                if !looks_default(data) {
                    continue;
                }
                data.dosage = Some(derived.dose);
                data.unit = Some(medication.unit.to_string());
                append_note(&mut data.notes, &derived.note);
                *confidence = confidence.max(DERIVED_CONFIDENCE);
                *action_title = title(medication, derived.dose);
            }
            None => actions.push(Action {
                kind: ActionKind::LogSupplement(SupplementData {
                    supplement: medication.name.to_string(),
                    dosage: Some(derived.dose),
                    unit: Some(medication.unit.to_string()),
                    date: today.map(str::to_string),
                    time: None,
                    notes: Some(derived.note),
                }),
                title: title(medication, derived.dose),
                confidence: DERIVED_CONFIDENCE,
            }),
        }
    }
}
