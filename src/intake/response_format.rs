use crate::intake::action::{EntryType, MAX_ACTIONS, MAX_MEAL_ITEMS, MealType, ResponseMode};
use serde_json::{Value, json};

const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";
const TIME_PATTERN: &str = r"^([01]\d|2[0-3]):[0-5]\d$";

fn text() -> Value {
    json!({"type": "string", "minLength": 1})
}

fn nullable_text() -> Value {
    json!({"type": ["string", "null"]})
}

fn nullable_date() -> Value {
    json!({"type": ["string", "null"], "pattern": DATE_PATTERN})
}

fn nullable_time() -> Value {
    json!({"type": ["string", "null"], "pattern": TIME_PATTERN})
}

fn nullable_positive() -> Value {
    json!({"type": ["number", "null"], "exclusiveMinimum": 0})
}

fn nullable_scale() -> Value {
    json!({"type": ["integer", "null"], "minimum": 1, "maximum": 10})
}

fn nullable_enum(values: &[&str]) -> Value {
    let mut options: Vec<Value> = values.iter().map(|v| json!(v)).collect();
    options.push(Value::Null);
    json!({"type": ["string", "null"], "enum": options})
}

/// Closed object where every listed property is required, matching the
/// strict structured-output convention that optional means nullable.
fn closed_object(properties: Vec<(&str, Value)>) -> Value {
    let required: Vec<&str> = properties.iter().map(|(key, _)| *key).collect();
    let props: serde_json::Map<String, Value> = properties
        .into_iter()
        .map(|(key, schema)| (key.to_string(), schema))
        .collect();
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": required,
        "properties": props,
    })
}

fn meal_item() -> Value {
    closed_object(vec![
        ("label", text()),
        ("usdaQuery", text()),
        ("gramsConsumed", nullable_positive()),
        ("servings", nullable_positive()),
        ("notes", nullable_text()),
    ])
}

fn meal_items(nullable: bool) -> Value {
    let kind = if nullable {
        json!(["array", "null"])
    } else {
        json!("array")
    };
    json!({
        "type": kind,
        "minItems": 1,
        "maxItems": MAX_MEAL_ITEMS,
        "items": meal_item(),
    })
}

fn variant(tag: &str, data: Value) -> Value {
    closed_object(vec![
        ("type", json!({"type": "string", "enum": [tag]})),
        ("title", text()),
        (
            "confidence",
            json!({"type": "number", "minimum": 0, "maximum": 1}),
        ),
        ("data", data),
    ])
}

fn action_variants() -> Vec<Value> {
    vec![
        variant(
            "log_meal",
            closed_object(vec![
                ("date", nullable_date()),
                ("mealType", nullable_enum(&MealType::ALL)),
                ("items", meal_items(false)),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "log_symptom",
            closed_object(vec![
                ("symptom", text()),
                ("severity", nullable_scale()),
                ("date", nullable_date()),
                ("time", nullable_time()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "log_supplement",
            closed_object(vec![
                ("supplement", text()),
                ("dosage", nullable_positive()),
                ("unit", nullable_text()),
                ("date", nullable_date()),
                ("time", nullable_time()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "log_sleep",
            closed_object(vec![
                ("date", nullable_date()),
                ("bedtime", nullable_time()),
                ("wakeTime", nullable_time()),
                (
                    "hours",
                    json!({"type": ["number", "null"], "exclusiveMinimum": 0, "maximum": 24}),
                ),
                ("quality", nullable_scale()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "add_shopping_item",
            closed_object(vec![
                ("item", text()),
                ("quantity", nullable_positive()),
                ("unit", nullable_text()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "edit_meal",
            closed_object(vec![
                ("id", text()),
                ("date", nullable_date()),
                ("mealType", nullable_enum(&MealType::ALL)),
                ("items", meal_items(true)),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "edit_symptom",
            closed_object(vec![
                ("id", text()),
                ("symptom", nullable_text()),
                ("severity", nullable_scale()),
                ("date", nullable_date()),
                ("time", nullable_time()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "edit_supplement",
            closed_object(vec![
                ("id", text()),
                ("supplement", nullable_text()),
                ("dosage", nullable_positive()),
                ("unit", nullable_text()),
                ("date", nullable_date()),
                ("time", nullable_time()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "edit_sleep",
            closed_object(vec![
                ("id", text()),
                ("date", nullable_date()),
                ("bedtime", nullable_time()),
                ("wakeTime", nullable_time()),
                (
                    "hours",
                    json!({"type": ["number", "null"], "exclusiveMinimum": 0, "maximum": 24}),
                ),
                ("quality", nullable_scale()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "edit_shopping_item",
            closed_object(vec![
                ("id", text()),
                ("item", nullable_text()),
                ("quantity", nullable_positive()),
                ("unit", nullable_text()),
                ("notes", nullable_text()),
            ]),
        ),
        variant(
            "delete_entry",
            closed_object(vec![
                (
                    "entryType",
                    json!({"type": "string", "enum": EntryType::ALL}),
                ),
                ("id", text()),
            ]),
        ),
    ]
}

fn decision() -> Value {
    closed_object(vec![
        (
            "intent",
            json!({"type": "string", "enum": ["log", "clarify", "chat"]}),
        ),
        (
            "apply",
            json!({"type": "string", "enum": ["auto", "confirm", "none"]}),
        ),
        (
            "confidence",
            json!({"type": "number", "minimum": 0, "maximum": 1}),
        ),
        (
            "action_handling",
            json!({"type": "string", "enum": ["keep", "replace", "clear"]}),
        ),
    ])
}

/// JSON Schema for the whole response envelope in the given mode.
pub fn envelope_schema(mode: ResponseMode) -> Value {
    let mut properties = vec![
        ("message", text()),
        (
            "actions",
            json!({
                "type": "array",
                "maxItems": MAX_ACTIONS,
                "items": {"anyOf": action_variants()},
            }),
        ),
    ];
    if mode == ResponseMode::Conversation {
        properties.push(("decision", decision()));
    }
    closed_object(properties)
}

pub fn schema_name(mode: ResponseMode) -> &'static str {
    match mode {
        ResponseMode::Plan => "health_intake_plan",
        ResponseMode::Conversation => "health_intake_conversation",
    }
}

/// The `text.format` block sent with every completion request.
pub fn response_format(mode: ResponseMode) -> Value {
    json!({
        "type": "json_schema",
        "name": schema_name(mode),
        "strict": true,
        "schema": envelope_schema(mode),
    })
}
