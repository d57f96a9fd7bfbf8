use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("could not understand that, try again")]
    Unrecognized,
    #[error("no completion API key configured; set INTAKE_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
}

/// Codes carried on `INTAKE_WARN` lines so soft failures can be grepped by
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    W001Transport,
    W002Status,
    W003NoText,
    W004Parse,
    W005Schema,
    W006Journal,
    W007Escalation,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W001Transport => "W001_TRANSPORT",
            Self::W002Status => "W002_STATUS",
            Self::W003NoText => "W003_NO_TEXT",
            Self::W004Parse => "W004_PARSE",
            Self::W005Schema => "W005_SCHEMA",
            Self::W006Journal => "W006_JOURNAL",
            Self::W007Escalation => "W007_ESCALATION",
        }
    }
}
