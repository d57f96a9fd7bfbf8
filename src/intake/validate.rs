use crate::intake::action::{
    Action, ActionHandling, ActionKind, ApplyMode, AssistantPlan, Decision, DeleteEntry,
    EntryType, Intent, MAX_ACTIONS, MAX_MEAL_ITEMS, MealData, MealEdit, MealItem, MealType,
    ResponseMode, ShoppingItemData, ShoppingItemEdit, SleepData, SleepEdit, SupplementData,
    SupplementEdit, SymptomData, SymptomEdit,
};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").expect("time pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

type Checked<T> = Result<T, ValidationError>;

pub fn is_valid_date(raw: &str) -> bool {
    DATE_RE.is_match(raw) && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

pub fn is_valid_time(raw: &str) -> bool {
    TIME_RE.is_match(raw)
}

/// A JSON object under validation. Keys outside `allowed` are rejected up
/// front; optional keys accept either absence or an explicit `null`.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn open(value: &'a Value, path: &str, allowed: &[&str]) -> Checked<Self> {
        let Some(map) = value.as_object() else {
            return Err(ValidationError::new(path, "expected an object"));
        };
        if let Some(unknown) = map.keys().find(|key| !allowed.contains(&key.as_str())) {
            return Err(ValidationError::new(
                path,
                format!("unknown key `{unknown}`"),
            ));
        }
        Ok(Self {
            map,
            path: path.to_string(),
        })
    }

    fn at(&self, key: &str) -> String {
        format!("{}/{key}", self.path)
    }

    fn required(&self, key: &str) -> Checked<&'a Value> {
        self.map
            .get(key)
            .ok_or_else(|| ValidationError::new(&self.at(key), "required key missing"))
    }

    fn optional(&self, key: &str) -> Option<&'a Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn string_value(&self, key: &str, value: &Value) -> Checked<String> {
        let Some(text) = value.as_str() else {
            return Err(ValidationError::new(&self.at(key), "expected a string"));
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(&self.at(key), "must not be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn req_string(&self, key: &str) -> Checked<String> {
        let value = self.required(key)?;
        self.string_value(key, value)
    }

    fn opt_string(&self, key: &str) -> Checked<Option<String>> {
        self.optional(key)
            .map(|value| self.string_value(key, value))
            .transpose()
    }

    /// Free-text fields such as notes may be blank; blank collapses to `None`.
    fn opt_text(&self, key: &str) -> Checked<Option<String>> {
        let Some(value) = self.optional(key) else {
            return Ok(None);
        };
        let Some(text) = value.as_str() else {
            return Err(ValidationError::new(&self.at(key), "expected a string"));
        };
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    fn opt_date(&self, key: &str) -> Checked<Option<String>> {
        let Some(raw) = self.opt_string(key)? else {
            return Ok(None);
        };
        if !is_valid_date(&raw) {
            return Err(ValidationError::new(
                &self.at(key),
                format!("`{raw}` is not a YYYY-MM-DD date"),
            ));
        }
        Ok(Some(raw))
    }

    fn opt_time(&self, key: &str) -> Checked<Option<String>> {
        let Some(raw) = self.opt_string(key)? else {
            return Ok(None);
        };
        if !is_valid_time(&raw) {
            return Err(ValidationError::new(
                &self.at(key),
                format!("`{raw}` is not an HH:MM time"),
            ));
        }
        Ok(Some(raw))
    }

    fn number_value(&self, key: &str, value: &Value) -> Checked<f64> {
        value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ValidationError::new(&self.at(key), "expected a number"))
    }

    fn unit_interval(&self, key: &str) -> Checked<f64> {
        let value = self.required(key)?;
        let number = self.number_value(key, value)?;
        if !(0.0..=1.0).contains(&number) {
            return Err(ValidationError::new(
                &self.at(key),
                format!("{number} is outside [0, 1]"),
            ));
        }
        Ok(number)
    }

    fn opt_positive(&self, key: &str) -> Checked<Option<f64>> {
        let Some(value) = self.optional(key) else {
            return Ok(None);
        };
        let number = self.number_value(key, value)?;
        if number <= 0.0 {
            return Err(ValidationError::new(&self.at(key), "must be greater than 0"));
        }
        Ok(Some(number))
    }

    fn opt_hours(&self, key: &str) -> Checked<Option<f64>> {
        let hours = self.opt_positive(key)?;
        if hours.is_some_and(|h| h > 24.0) {
            return Err(ValidationError::new(&self.at(key), "must be at most 24"));
        }
        Ok(hours)
    }

    fn opt_scale(&self, key: &str) -> Checked<Option<u8>> {
        let Some(value) = self.optional(key) else {
            return Ok(None);
        };
        let number = self.number_value(key, value)?;
        if number.fract() != 0.0 || !(1.0..=10.0).contains(&number) {
            return Err(ValidationError::new(
                &self.at(key),
                "must be an integer from 1 to 10",
            ));
        }
        Ok(Some(number as u8))
    }

    fn enum_value<T>(
        &self,
        key: &str,
        value: &Value,
        parse: fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Checked<T> {
        value.as_str().and_then(parse).ok_or_else(|| {
            ValidationError::new(
                &self.at(key),
                format!("expected one of {}", allowed.join("|")),
            )
        })
    }

    fn req_enum<T>(&self, key: &str, parse: fn(&str) -> Option<T>, allowed: &[&str]) -> Checked<T> {
        let value = self.required(key)?;
        self.enum_value(key, value, parse, allowed)
    }

    fn opt_enum<T>(
        &self,
        key: &str,
        parse: fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Checked<Option<T>> {
        self.optional(key)
            .map(|value| self.enum_value(key, value, parse, allowed))
            .transpose()
    }

    fn array<'v>(&self, key: &str, value: &'v Value) -> Checked<&'v Vec<Value>> {
        value
            .as_array()
            .ok_or_else(|| ValidationError::new(&self.at(key), "expected an array"))
    }
}

fn meal_items(fields: &Fields<'_>, key: &str, value: &Value) -> Checked<Vec<MealItem>> {
    let raw = fields.array(key, value)?;
    let path = fields.at(key);
    if raw.is_empty() {
        return Err(ValidationError::new(&path, "a meal needs at least one item"));
    }
    if raw.len() > MAX_MEAL_ITEMS {
        return Err(ValidationError::new(
            &path,
            format!("at most {MAX_MEAL_ITEMS} items allowed"),
        ));
    }
    raw.iter()
        .enumerate()
        .map(|(idx, item)| meal_item(item, &format!("{path}/{idx}")))
        .collect()
}

fn meal_item(value: &Value, path: &str) -> Checked<MealItem> {
    let f = Fields::open(
        value,
        path,
        &["label", "usdaQuery", "gramsConsumed", "servings", "notes"],
    )?;
    Ok(MealItem {
        label: f.req_string("label")?,
        usda_query: f.req_string("usdaQuery")?,
        grams_consumed: f.opt_positive("gramsConsumed")?,
        servings: f.opt_positive("servings")?,
        notes: f.opt_text("notes")?,
    })
}

fn meal_data(value: &Value, path: &str) -> Checked<MealData> {
    let f = Fields::open(value, path, &["date", "mealType", "items", "notes"])?;
    Ok(MealData {
        date: f.opt_date("date")?,
        meal_type: f.opt_enum("mealType", MealType::parse, &MealType::ALL)?,
        items: meal_items(&f, "items", f.required("items")?)?,
        notes: f.opt_text("notes")?,
    })
}

fn meal_edit(value: &Value, path: &str) -> Checked<MealEdit> {
    let f = Fields::open(value, path, &["id", "date", "mealType", "items", "notes"])?;
    let items = match f.optional("items") {
        Some(raw) => Some(meal_items(&f, "items", raw)?),
        None => None,
    };
    Ok(MealEdit {
        id: f.req_string("id")?,
        date: f.opt_date("date")?,
        meal_type: f.opt_enum("mealType", MealType::parse, &MealType::ALL)?,
        items,
        notes: f.opt_text("notes")?,
    })
}

fn symptom_data(value: &Value, path: &str) -> Checked<SymptomData> {
    let f = Fields::open(value, path, &["symptom", "severity", "date", "time", "notes"])?;
    Ok(SymptomData {
        symptom: f.req_string("symptom")?,
        severity: f.opt_scale("severity")?,
        date: f.opt_date("date")?,
        time: f.opt_time("time")?,
        notes: f.opt_text("notes")?,
    })
}

fn symptom_edit(value: &Value, path: &str) -> Checked<SymptomEdit> {
    let f = Fields::open(
        value,
        path,
        &["id", "symptom", "severity", "date", "time", "notes"],
    )?;
    Ok(SymptomEdit {
        id: f.req_string("id")?,
        symptom: f.opt_string("symptom")?,
        severity: f.opt_scale("severity")?,
        date: f.opt_date("date")?,
        time: f.opt_time("time")?,
        notes: f.opt_text("notes")?,
    })
}

fn supplement_data(value: &Value, path: &str) -> Checked<SupplementData> {
    let f = Fields::open(
        value,
        path,
        &["supplement", "dosage", "unit", "date", "time", "notes"],
    )?;
    Ok(SupplementData {
        supplement: f.req_string("supplement")?,
        dosage: f.opt_positive("dosage")?,
        unit: f.opt_string("unit")?,
        date: f.opt_date("date")?,
        time: f.opt_time("time")?,
        notes: f.opt_text("notes")?,
    })
}

fn supplement_edit(value: &Value, path: &str) -> Checked<SupplementEdit> {
    let f = Fields::open(
        value,
        path,
        &["id", "supplement", "dosage", "unit", "date", "time", "notes"],
    )?;
    Ok(SupplementEdit {
        id: f.req_string("id")?,
        supplement: f.opt_string("supplement")?,
        dosage: f.opt_positive("dosage")?,
        unit: f.opt_string("unit")?,
        date: f.opt_date("date")?,
        time: f.opt_time("time")?,
        notes: f.opt_text("notes")?,
    })
}

fn sleep_data(value: &Value, path: &str) -> Checked<SleepData> {
    let f = Fields::open(
        value,
        path,
        &["date", "bedtime", "wakeTime", "hours", "quality", "notes"],
    )?;
    Ok(SleepData {
        date: f.opt_date("date")?,
        bedtime: f.opt_time("bedtime")?,
        wake_time: f.opt_time("wakeTime")?,
        hours: f.opt_hours("hours")?,
        quality: f.opt_scale("quality")?,
        notes: f.opt_text("notes")?,
    })
}

fn sleep_edit(value: &Value, path: &str) -> Checked<SleepEdit> {
    let f = Fields::open(
        value,
        path,
        &["id", "date", "bedtime", "wakeTime", "hours", "quality", "notes"],
    )?;
    Ok(SleepEdit {
        id: f.req_string("id")?,
        date: f.opt_date("date")?,
        bedtime: f.opt_time("bedtime")?,
        wake_time: f.opt_time("wakeTime")?,
        hours: f.opt_hours("hours")?,
        quality: f.opt_scale("quality")?,
        notes: f.opt_text("notes")?,
    })
}

fn shopping_data(value: &Value, path: &str) -> Checked<ShoppingItemData> {
    let f = Fields::open(value, path, &["item", "quantity", "unit", "notes"])?;
    Ok(ShoppingItemData {
        item: f.req_string("item")?,
        quantity: f.opt_positive("quantity")?,
        unit: f.opt_string("unit")?,
        notes: f.opt_text("notes")?,
    })
}

fn shopping_edit(value: &Value, path: &str) -> Checked<ShoppingItemEdit> {
    let f = Fields::open(value, path, &["id", "item", "quantity", "unit", "notes"])?;
    Ok(ShoppingItemEdit {
        id: f.req_string("id")?,
        item: f.opt_string("item")?,
        quantity: f.opt_positive("quantity")?,
        unit: f.opt_string("unit")?,
        notes: f.opt_text("notes")?,
    })
}

fn delete_entry(value: &Value, path: &str) -> Checked<DeleteEntry> {
    let f = Fields::open(value, path, &["entryType", "id"])?;
    Ok(DeleteEntry {
        entry_type: f.req_enum("entryType", EntryType::parse, &EntryType::ALL)?,
        id: f.req_string("id")?,
    })
}

fn action_at(value: &Value, path: &str) -> Checked<Action> {
    let f = Fields::open(value, path, &["type", "title", "confidence", "data"])?;
    let tag = f.req_string("type")?;
    let title = f.req_string("title")?;
    let confidence = f.unit_interval("confidence")?;
    let data = f.required("data")?;
    let data_path = f.at("data");

    let kind = match tag.as_str() {
        "log_meal" => ActionKind::LogMeal(meal_data(data, &data_path)?),
        "log_symptom" => ActionKind::LogSymptom(symptom_data(data, &data_path)?),
        "log_supplement" => ActionKind::LogSupplement(supplement_data(data, &data_path)?),
        "log_sleep" => ActionKind::LogSleep(sleep_data(data, &data_path)?),
        "add_shopping_item" => ActionKind::AddShoppingItem(shopping_data(data, &data_path)?),
        "edit_meal" => ActionKind::EditMeal(meal_edit(data, &data_path)?),
        "edit_symptom" => ActionKind::EditSymptom(symptom_edit(data, &data_path)?),
        "edit_supplement" => ActionKind::EditSupplement(supplement_edit(data, &data_path)?),
        "edit_sleep" => ActionKind::EditSleep(sleep_edit(data, &data_path)?),
        "edit_shopping_item" => ActionKind::EditShoppingItem(shopping_edit(data, &data_path)?),
        "delete_entry" => ActionKind::DeleteEntry(delete_entry(data, &data_path)?),
        other => {
            return Err(ValidationError::new(
                &f.at("type"),
                format!("unknown action type `{other}`"),
            ));
        }
    };

    Ok(Action {
        kind,
        title,
        confidence,
    })
}

/// Validate one action value against the tagged-union contract.
pub fn validate_action(value: &Value) -> Result<Action, ValidationError> {
    action_at(value, "")
}

/// Validate a list of actions, enforcing the list cap.
pub fn validate_actions(value: &Value, path: &str) -> Result<Vec<Action>, ValidationError> {
    let Some(raw) = value.as_array() else {
        return Err(ValidationError::new(path, "expected an array"));
    };
    if raw.len() > MAX_ACTIONS {
        return Err(ValidationError::new(
            path,
            format!("at most {MAX_ACTIONS} actions allowed"),
        ));
    }
    raw.iter()
        .enumerate()
        .map(|(idx, action)| action_at(action, &format!("{path}/{idx}")))
        .collect()
}

fn decision(value: &Value, path: &str) -> Checked<Decision> {
    let f = Fields::open(
        value,
        path,
        &["intent", "apply", "confidence", "action_handling"],
    )?;
    Ok(Decision {
        intent: f.req_enum("intent", parse_intent, &["log", "clarify", "chat"])?,
        apply: f.req_enum("apply", parse_apply, &["auto", "confirm", "none"])?,
        confidence: f.unit_interval("confidence")?,
        action_handling: f.req_enum(
            "action_handling",
            parse_action_handling,
            &["keep", "replace", "clear"],
        )?,
    })
}

fn parse_intent(raw: &str) -> Option<Intent> {
    match raw {
        "log" => Some(Intent::Log),
        "clarify" => Some(Intent::Clarify),
        "chat" => Some(Intent::Chat),
        _ => None,
    }
}

fn parse_apply(raw: &str) -> Option<ApplyMode> {
    match raw {
        "auto" => Some(ApplyMode::Auto),
        "confirm" => Some(ApplyMode::Confirm),
        "none" => Some(ApplyMode::None),
        _ => None,
    }
}

fn parse_action_handling(raw: &str) -> Option<ActionHandling> {
    match raw {
        "keep" => Some(ActionHandling::Keep),
        "replace" => Some(ActionHandling::Replace),
        "clear" => Some(ActionHandling::Clear),
        _ => None,
    }
}

/// Validate a full response envelope. The conversation variant requires a
/// `decision`; the plan variant treats it as an unknown key.
pub fn validate_plan(value: &Value, mode: ResponseMode) -> Result<AssistantPlan, ValidationError> {
    let allowed: &[&str] = match mode {
        ResponseMode::Plan => &["message", "actions"],
        ResponseMode::Conversation => &["message", "actions", "decision"],
    };
    let f = Fields::open(value, "", allowed)?;
    let message = f.req_string("message")?;
    let actions = validate_actions(f.required("actions")?, &f.at("actions"))?;
    let decision = match mode {
        ResponseMode::Plan => None,
        ResponseMode::Conversation => Some(decision(f.required("decision")?, &f.at("decision"))?),
    };
    Ok(AssistantPlan {
        message,
        actions,
        decision,
    })
}
