use crate::error::WarnCode;
use crate::intake::action::{AssistantPlan, ResponseMode};
use crate::intake::coerce::coerce;
use crate::intake::prompt::{PromptStyle, system_instructions, user_message};
use crate::intake::request::IntakeRequest;
use crate::intake::response_format::response_format;
use crate::intake::response_text::{extract_response_text, strip_code_fence};
use crate::intake::validate::{ValidationError, validate_plan};
use crate::intake::warn::{self, WarnEvent};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("completion service returned status {0}")]
    Status(u16),
    #[error("response body was not JSON: {0}")]
    Body(String),
}

/// Sends one request body to the completion service and returns the raw
/// response JSON.
pub trait CompletionTransport {
    fn send(&self, body: &Value) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/responses", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }
}

impl CompletionTransport for HttpTransport {
    fn send(&self, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        response
            .json::<Value>()
            .map_err(|err| TransportError::Body(err.to_string()))
    }
}

/// Everything one completion call needs besides the model name.
#[derive(Debug, Clone, Copy)]
pub struct CompletionInput<'a> {
    pub request: &'a IntakeRequest,
    pub mode: ResponseMode,
    pub style: PromptStyle,
}

/// Produces a validated plan or `None`; never errors outward.
pub trait PlanSource {
    fn complete(&self, model: &str, input: &CompletionInput<'_>) -> Option<AssistantPlan>;
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub history_turns: usize,
    pub max_output_tokens: u32,
    pub temperature: Option<f64>,
}

pub struct CompletionClient<T> {
    transport: T,
    settings: CompletionSettings,
}

#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("model output is not JSON: {0}")]
    Json(String),
    #[error("model output does not match the schema: {0}")]
    Schema(ValidationError),
}

/// Strict pass first (plain JSON, exact schema); only if that fails, a
/// lenient pass that accepts JSON5 syntax and runs the coercer.
pub fn parse_plan(text: &str, mode: ResponseMode) -> Result<AssistantPlan, PlanParseError> {
    let body = strip_code_fence(text);
    let strict = serde_json::from_str::<Value>(body);
    if let Ok(value) = &strict
        && let Ok(plan) = validate_plan(value, mode)
    {
        return Ok(plan);
    }

    let lenient = match strict {
        Ok(value) => value,
        Err(_) => json5::from_str::<Value>(body)
            .map_err(|err| PlanParseError::Json(err.to_string()))?,
    };
    validate_plan(&coerce(lenient), mode).map_err(PlanParseError::Schema)
}

pub fn build_request_body(
    model: &str,
    input: &CompletionInput<'_>,
    settings: &CompletionSettings,
) -> Value {
    let mut body = json!({
        "model": model,
        "instructions": system_instructions(input.mode, input.style),
        "input": user_message(input.request, input.style, settings.history_turns),
        "text": {"format": response_format(input.mode)},
        "max_output_tokens": settings.max_output_tokens,
        "store": false,
    });
    if let Some(temperature) = settings.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

fn stage_label(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::Standard => "complete",
        PromptStyle::Recovery => "recovery",
    }
}

impl<T: CompletionTransport> CompletionClient<T> {
    pub fn new(transport: T, settings: CompletionSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }
}

impl<T: CompletionTransport> PlanSource for CompletionClient<T> {
    fn complete(&self, model: &str, input: &CompletionInput<'_>) -> Option<AssistantPlan> {
        let stage = stage_label(input.style);
        let body = build_request_body(model, input, &self.settings);

        let response = match self.transport.send(&body) {
            Ok(response) => response,
            Err(err) => {
                let code = match err {
                    TransportError::Status(_) => WarnCode::W002Status,
                    _ => WarnCode::W001Transport,
                };
                warn::emit(WarnEvent {
                    code,
                    stage,
                    model,
                    reason: "completion request failed",
                    err: &err.to_string(),
                });
                return None;
            }
        };

        let Some(text) = extract_response_text(&response) else {
            warn::emit(WarnEvent {
                code: WarnCode::W003NoText,
                stage,
                model,
                reason: "response carried no output text",
                err: response
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown"),
            });
            return None;
        };

        match parse_plan(&text, input.mode) {
            Ok(plan) => Some(plan),
            Err(err) => {
                let code = match err {
                    PlanParseError::Json(_) => WarnCode::W004Parse,
                    PlanParseError::Schema(_) => WarnCode::W005Schema,
                };
                warn::emit(WarnEvent {
                    code,
                    stage,
                    model,
                    reason: "model output rejected",
                    err: &err.to_string(),
                });
                None
            }
        }
    }
}
