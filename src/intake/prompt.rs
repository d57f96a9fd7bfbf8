use crate::intake::action::ResponseMode;
use crate::intake::request::IntakeRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    Standard,
    /// Last-resort restatement: shorter, more directive, no history and no
    /// pending actions.
    Recovery,
}

const PLAN_INSTRUCTIONS: &str = "You turn short health notes into structured actions for a personal health log. \
The note may be typed or transcribed speech and may mention meals, symptoms, supplements or medication, sleep, or groceries to buy.\n\
Rules:\n\
- Return JSON only, matching the provided schema exactly. Use null for any field you do not know.\n\
- log_meal: one action per meal. Each item needs a short label and a usdaQuery phrased as a USDA FoodData Central search (e.g. \"egg, whole, cooked\"). \
Fill gramsConsumed only when the user states a weight or it follows directly from a stated amount; otherwise use servings when a count or serving is stated.\n\
- log_symptom: severity is 1-10 only when the user rates it or clearly describes intensity.\n\
- log_supplement: also used for over-the-counter medication. dosage and unit describe the total amount taken.\n\
- log_sleep: times are 24h HH:MM; hours is total sleep.\n\
- add_shopping_item: only for things the user wants to buy.\n\
- edit_* and delete_entry: only when the user refers to an existing record id given in the context.\n\
- Dates are YYYY-MM-DD relative to the provided today; leave null when the user does not say.\n\
- confidence is your certainty (0-1) that the action is correct and complete.\n\
- Never invent foods, doses, or symptoms the user did not mention. At most 12 actions.\n\
- message is one short, friendly sentence summarizing what you extracted or asking for what is missing.";

const CONVERSATION_INSTRUCTIONS: &str = "\n\nAlso classify the turn in decision:\n\
- chat: nothing loggable (greetings, mic checks, questions about the app). apply=\"none\", action_handling=\"keep\", actions empty.\n\
- log: clearly loggable content. apply=\"auto\" when you are confident and every action is complete, otherwise apply=\"confirm\". action_handling=\"replace\".\n\
- clarify: partly loggable but a key fact is missing. Return the partial actions, ask exactly one targeted follow-up question in message, apply=\"confirm\", action_handling=\"replace\".\n\
- If the user cancels or rejects the pending suggestions, return empty actions with action_handling=\"clear\" and apply=\"none\".\n\
When pending suggestions are listed, return the full updated set (edit them rather than adding duplicates).";

const RECOVERY_INSTRUCTIONS: &str = "Extract health-log actions from the note below. \
Reply with a single JSON object that matches the schema and nothing else. \
Use only what the note states and null for anything unknown. \
If nothing can be logged, return an empty actions list and a message asking the user to rephrase.";

pub fn system_instructions(mode: ResponseMode, style: PromptStyle) -> String {
    let base = match style {
        PromptStyle::Standard => PLAN_INSTRUCTIONS,
        PromptStyle::Recovery => RECOVERY_INSTRUCTIONS,
    };
    match mode {
        ResponseMode::Plan => base.to_string(),
        ResponseMode::Conversation => format!("{base}{CONVERSATION_INSTRUCTIONS}"),
    }
}

fn push_clock_context(out: &mut String, request: &IntakeRequest) {
    if let Some(today) = request.today.as_deref() {
        out.push_str(&format!("Today: {today}\n"));
    }
    if let Some(now) = request.now_iso.as_deref() {
        out.push_str(&format!("Now: {now}\n"));
    }
}

/// Assemble the user-side input: note, clock context, the most recent
/// `history_limit` turns oldest-first, and any pending actions.
pub fn user_message(request: &IntakeRequest, style: PromptStyle, history_limit: usize) -> String {
    let mut out = String::new();

    if style == PromptStyle::Recovery {
        out.push_str(&format!("Note: {}\n", request.text.trim()));
        push_clock_context(&mut out, request);
        return out;
    }

    out.push_str(&format!("User note: {}\n", request.text.trim()));
    push_clock_context(&mut out, request);

    let skip = request.history.len().saturating_sub(history_limit);
    let recent = &request.history[skip..];
    if !recent.is_empty() {
        out.push_str("\nRecent conversation (oldest first):\n");
        for turn in recent {
            out.push_str(&format!("{}: {}\n", turn.role.label(), turn.text.trim()));
        }
    }

    if !request.existing_actions.is_empty() {
        let pending = serde_json::to_string_pretty(&request.existing_actions)
            .unwrap_or_else(|_| "[]".to_string());
        out.push_str(
            "\nPending suggestions not yet saved (update these instead of duplicating them):\n",
        );
        out.push_str(&pending);
        out.push('\n');
    }

    out
}
