pub mod check_trivial;
pub mod extract;
pub mod schema;
pub mod status;
pub mod validate;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            payload: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn set_payload(&mut self, payload: Value) {
        self.payload = Some(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::CommandReport;
    use serde_json::json;

    #[test]
    fn issue_flips_ok_and_payload_serializes_only_when_set() {
        let mut report = CommandReport::new("validate");
        report.detail("actions=1");
        let value = serde_json::to_value(&report).expect("serialize");
        assert!(value.get("payload").is_none());

        report.issue("actions/0/confidence: must be between 0 and 1");
        report.set_payload(json!({"message": "x"}));
        assert!(!report.ok);
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["payload"]["message"], "x");
    }
}
