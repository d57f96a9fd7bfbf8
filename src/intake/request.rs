use crate::error::IntakeError;
use crate::intake::action::{Action, MAX_ACTIONS};
use crate::intake::validate::is_valid_date;
use serde::{Deserialize, Serialize};

pub const MAX_HISTORY_TURNS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

/// One inbound turn: the note to extract from plus optional context.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeRequest {
    pub text: String,
    pub now_iso: Option<String>,
    pub today: Option<String>,
    pub history: Vec<HistoryTurn>,
    pub existing_actions: Vec<Action>,
}

impl IntakeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            now_iso: None,
            today: None,
            history: Vec::new(),
            existing_actions: Vec::new(),
        }
    }

    pub fn check(&self) -> Result<(), IntakeError> {
        if self.text.trim().is_empty() {
            return Err(IntakeError::InvalidRequest("text cannot be empty".to_string()));
        }
        if let Some(today) = self.today.as_deref()
            && !is_valid_date(today)
        {
            return Err(IntakeError::InvalidRequest(format!(
                "today `{today}` is not a YYYY-MM-DD date"
            )));
        }
        if let Some(now) = self.now_iso.as_deref()
            && chrono::DateTime::parse_from_rfc3339(now).is_err()
        {
            return Err(IntakeError::InvalidRequest(format!(
                "now `{now}` is not an RFC 3339 timestamp"
            )));
        }
        if self.history.len() > MAX_HISTORY_TURNS {
            return Err(IntakeError::InvalidRequest(format!(
                "history holds {} turns; at most {MAX_HISTORY_TURNS} allowed",
                self.history.len()
            )));
        }
        if self.existing_actions.len() > MAX_ACTIONS {
            return Err(IntakeError::InvalidRequest(format!(
                "{} existing actions; at most {MAX_ACTIONS} allowed",
                self.existing_actions.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_text() {
        assert!(IntakeRequest::new("   ").check().is_err());
        assert!(IntakeRequest::new("two eggs").check().is_ok());
    }

    #[test]
    fn rejects_malformed_context() {
        let mut request = IntakeRequest::new("coffee");
        request.today = Some("03/09/2024".to_string());
        assert!(request.check().is_err());

        let mut request = IntakeRequest::new("coffee");
        request.now_iso = Some("2024-03-09T08:15:00Z".to_string());
        request.today = Some("2024-03-09".to_string());
        assert!(request.check().is_ok());
    }

    #[test]
    fn rejects_oversized_history() {
        let mut request = IntakeRequest::new("coffee");
        request.history = (0..17)
            .map(|idx| HistoryTurn {
                role: if idx % 2 == 0 { Role::User } else { Role::Assistant },
                text: format!("turn {idx}"),
            })
            .collect();
        assert!(request.check().is_err());
    }

    #[test]
    fn history_turns_parse_from_json() {
        let raw = r#"[{"role":"user","text":"hi"},{"role":"assistant","text":"hello"}]"#;
        let turns: Vec<HistoryTurn> = serde_json::from_str(raw).expect("parse history");
        assert_eq!(turns[1].role, Role::Assistant);
    }
}
