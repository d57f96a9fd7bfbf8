use serde_json::{Map, Number, Value};

/// Keys whose values must be numbers; a numeric-looking string there is
/// rewritten to a number.
pub const NUMERIC_KEYS: [&str; 8] = [
    "confidence",
    "severity",
    "gramsConsumed",
    "servings",
    "dosage",
    "hours",
    "quality",
    "quantity",
];

/// Enum-valued keys; their strings are passed through verbatim since
/// `"none"` is a legal `apply` value.
pub const ENUM_KEYS: [&str; 6] = [
    "type",
    "mealType",
    "entryType",
    "intent",
    "apply",
    "action_handling",
];

const NULL_WORDS: [&str; 3] = ["null", "none", "None"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Plain,
    Numeric,
    Enum,
}

impl Slot {
    fn for_key(key: &str) -> Self {
        if NUMERIC_KEYS.contains(&key) {
            Slot::Numeric
        } else if ENUM_KEYS.contains(&key) {
            Slot::Enum
        } else {
            Slot::Plain
        }
    }
}

fn parse_numeric(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .and_then(Number::from_f64)
}

fn coerce_string(raw: String, slot: Slot) -> Value {
    if slot == Slot::Enum {
        return Value::String(raw);
    }
    if NULL_WORDS.contains(&raw.trim()) {
        return Value::Null;
    }
    if slot == Slot::Numeric
        && let Some(number) = parse_numeric(&raw)
    {
        return Value::Number(number);
    }
    Value::String(raw)
}

fn coerce_in_slot(value: Value, slot: Slot) -> Value {
    match value {
        Value::String(raw) => coerce_string(raw, slot),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| coerce_in_slot(item, Slot::Plain))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                let slot = Slot::for_key(&key);
                out.insert(key, coerce_in_slot(inner, slot));
            }
            Value::Object(out)
        }
        other => other,
    }
}

/// Repair common near-miss model output: stringified nulls outside enum
/// fields and numbers sent as strings in known numeric fields. Everything
/// else passes through untouched.
pub fn coerce(value: Value) -> Value {
    coerce_in_slot(value, Slot::Plain)
}
