use serde::{Deserialize, Serialize};

pub const MAX_ACTIONS: usize = 12;
pub const MAX_MEAL_ITEMS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Plan,
    Conversation,
}

impl ResponseMode {
    pub fn label(self) -> &'static str {
        match self {
            ResponseMode::Plan => "plan",
            ResponseMode::Conversation => "conversation",
        }
    }
}

/// One structured suggestion produced from a user's free-form note.
///
/// Serializes as `{"type": …, "data": {…}, "title": …, "confidence": …}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub title: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionKind {
    LogMeal(MealData),
    LogSymptom(SymptomData),
    LogSupplement(SupplementData),
    LogSleep(SleepData),
    AddShoppingItem(ShoppingItemData),
    EditMeal(MealEdit),
    EditSymptom(SymptomEdit),
    EditSupplement(SupplementEdit),
    EditSleep(SleepEdit),
    EditShoppingItem(ShoppingItemEdit),
    DeleteEntry(DeleteEntry),
}

impl ActionKind {
    pub fn type_tag(&self) -> &'static str {
        match self {
            ActionKind::LogMeal(_) => "log_meal",
            ActionKind::LogSymptom(_) => "log_symptom",
            ActionKind::LogSupplement(_) => "log_supplement",
            ActionKind::LogSleep(_) => "log_sleep",
            ActionKind::AddShoppingItem(_) => "add_shopping_item",
            ActionKind::EditMeal(_) => "edit_meal",
            ActionKind::EditSymptom(_) => "edit_symptom",
            ActionKind::EditSupplement(_) => "edit_supplement",
            ActionKind::EditSleep(_) => "edit_sleep",
            ActionKind::EditShoppingItem(_) => "edit_shopping_item",
            ActionKind::DeleteEntry(_) => "delete_entry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [&'static str; 4] = ["breakfast", "lunch", "dinner", "snack"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealItem {
    pub label: String,
    pub usda_query: String,
    pub grams_consumed: Option<f64>,
    pub servings: Option<f64>,
    pub notes: Option<String>,
}

impl MealItem {
    pub fn new(label: impl Into<String>, usda_query: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            usda_query: usda_query.into(),
            grams_consumed: None,
            servings: None,
            notes: None,
        }
    }

    pub fn append_note(&mut self, note: &str) {
        append_note(&mut self.notes, note);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealData {
    pub date: Option<String>,
    pub meal_type: Option<MealType>,
    pub items: Vec<MealItem>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomData {
    pub symptom: String,
    pub severity: Option<u8>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplementData {
    pub supplement: String,
    pub dosage: Option<f64>,
    pub unit: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepData {
    pub date: Option<String>,
    pub bedtime: Option<String>,
    pub wake_time: Option<String>,
    pub hours: Option<f64>,
    pub quality: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingItemData {
    pub item: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEdit {
    pub id: String,
    pub date: Option<String>,
    pub meal_type: Option<MealType>,
    pub items: Option<Vec<MealItem>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomEdit {
    pub id: String,
    pub symptom: Option<String>,
    pub severity: Option<u8>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplementEdit {
    pub id: String,
    pub supplement: Option<String>,
    pub dosage: Option<f64>,
    pub unit: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEdit {
    pub id: String,
    pub date: Option<String>,
    pub bedtime: Option<String>,
    pub wake_time: Option<String>,
    pub hours: Option<f64>,
    pub quality: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingItemEdit {
    pub id: String,
    pub item: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Meal,
    Symptom,
    Supplement,
    Sleep,
    ShoppingItem,
}

impl EntryType {
    pub const ALL: [&'static str; 5] = ["meal", "symptom", "supplement", "sleep", "shopping_item"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "meal" => Some(EntryType::Meal),
            "symptom" => Some(EntryType::Symptom),
            "supplement" => Some(EntryType::Supplement),
            "sleep" => Some(EntryType::Sleep),
            "shopping_item" => Some(EntryType::ShoppingItem),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntry {
    pub entry_type: EntryType,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Log,
    Clarify,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    Auto,
    Confirm,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionHandling {
    Keep,
    Replace,
    Clear,
}

/// How a conversation turn should be applied on the caller's side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub intent: Intent,
    pub apply: ApplyMode,
    pub confidence: f64,
    pub action_handling: ActionHandling,
}

impl Decision {
    pub fn chat() -> Self {
        Self {
            intent: Intent::Chat,
            apply: ApplyMode::None,
            confidence: 1.0,
            action_handling: ActionHandling::Keep,
        }
    }

    /// Combine previously pending suggestions with this turn's actions.
    pub fn merge(&self, pending: &[Action], incoming: &[Action]) -> Vec<Action> {
        match self.action_handling {
            ActionHandling::Keep => {
                let mut out = pending.to_vec();
                out.extend(incoming.iter().cloned());
                out.truncate(MAX_ACTIONS);
                out
            }
            ActionHandling::Replace => incoming.iter().take(MAX_ACTIONS).cloned().collect(),
            ActionHandling::Clear => Vec::new(),
        }
    }
}

/// The envelope handed back to the caller for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantPlan {
    pub message: String,
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl AssistantPlan {
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.actions.is_empty() {
            return None;
        }
        let total: f64 = self.actions.iter().map(|a| a.confidence).sum();
        Some(total / self.actions.len() as f64)
    }

    pub fn first_meal_mut(&mut self) -> Option<&mut MealData> {
        self.actions.iter_mut().find_map(|action| match &mut action.kind {
            ActionKind::LogMeal(meal) => Some(meal),
            _ => None,
        })
    }
}

pub fn append_note(slot: &mut Option<String>, note: &str) {
    let note = note.trim();
    if note.is_empty() {
        return;
    }
    match slot {
        Some(existing) if existing.lines().any(|line| line.trim() == note) => {}
        Some(existing) if !existing.trim().is_empty() => {
            existing.push('\n');
            existing.push_str(note);
        }
        _ => *slot = Some(note.to_string()),
    }
}
