use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::commands::CommandReport;
use crate::error::{IntakeError, WarnCode};
use crate::intake::action::{Action, ResponseMode};
use crate::intake::client::{CompletionClient, CompletionSettings, HttpTransport, PlanSource};
use crate::intake::config::{IntakeConfig, api_key, load_config};
use crate::intake::escalation::EscalationPolicy;
use crate::intake::heuristics::DEFAULT_TABLES;
use crate::intake::journal::{EventRecord, JsonlTurnStore, TurnRecord, record_best_effort};
use crate::intake::paths::resolve_paths;
use crate::intake::pipeline::{Extraction, ExtractionPipeline};
use crate::intake::request::{HistoryTurn, IntakeRequest};
use crate::intake::util::local_clock;
use crate::intake::validate::validate_actions;
use crate::intake::warn::{self, WarnEvent};

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub text: String,
    pub today: Option<String>,
    pub now: Option<String>,
    pub history: Option<PathBuf>,
    pub existing: Option<PathBuf>,
    pub mode: ResponseMode,
}

fn read_json(path: &Path) -> Result<Value> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_history(path: &Path) -> Result<Vec<HistoryTurn>> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("history in {} must be [{{role, text}}]", path.display()))
}

fn read_existing(path: &Path) -> Result<Vec<Action>> {
    let value = read_json(path)?;
    validate_actions(&value, "existing")
        .map_err(|err| anyhow::anyhow!("existing actions in {}: {err}", path.display()))
}

fn build_request(opts: &ExtractOptions, cfg: &IntakeConfig) -> Result<IntakeRequest> {
    let mut request = IntakeRequest::new(opts.text.clone());
    request.today = opts.today.clone();
    request.now_iso = opts.now.clone();
    if request.today.is_none() || request.now_iso.is_none() {
        let clock = local_clock(&cfg.clock.timezone)?;
        request.today.get_or_insert(clock.today);
        request.now_iso.get_or_insert(clock.now_iso);
    }
    if let Some(path) = opts.history.as_deref() {
        request.history = read_history(path)?;
    }
    if let Some(path) = opts.existing.as_deref() {
        request.existing_actions = read_existing(path)?;
    }
    Ok(request)
}

fn policy(cfg: &IntakeConfig) -> EscalationPolicy {
    EscalationPolicy {
        cheap_model: cfg.models.cheap.clone(),
        strong_model: cfg.models.strong.clone(),
        confidence_threshold: cfg.escalation.confidence_threshold,
        recovery_enabled: cfg.escalation.recovery_enabled,
    }
}

fn completion_client(cfg: &IntakeConfig) -> Result<Option<CompletionClient<HttpTransport>>> {
    let Some(key) = api_key() else {
        return Ok(None);
    };
    let transport =
        HttpTransport::new(&cfg.completion.base_url, &key, cfg.completion.timeout_secs)?;
    Ok(Some(CompletionClient::new(
        transport,
        CompletionSettings {
            history_turns: cfg.completion.history_turns,
            max_output_tokens: cfg.completion.max_output_tokens,
            temperature: cfg.completion.temperature,
        },
    )))
}

fn journal(turn: TurnRecord, events: Vec<EventRecord>) {
    match resolve_paths() {
        Ok(paths) => {
            record_best_effort(&JsonlTurnStore::new(&paths), &turn, &events);
        }
        Err(err) => warn::emit(WarnEvent {
            code: WarnCode::W006Journal,
            stage: "journal_paths",
            model: "na",
            reason: "journal paths unresolved",
            err: &format!("{err:#}"),
        }),
    }
}

fn journal_records(
    turn_id: &str,
    request: &IntakeRequest,
    mode: ResponseMode,
    result: &Result<Extraction, IntakeError>,
) -> Result<(TurnRecord, Vec<EventRecord>)> {
    let mut events = Vec::new();
    let turn = match result {
        Ok(extraction) => {
            let source = extraction.source.label();
            let mut turn = TurnRecord::new(turn_id, mode.label(), &request.text, source)?
                .with_message(&extraction.plan.message);
            turn.tier = extraction.source.tier();
            turn.attempts = extraction.attempts.clone();
            turn.action_count = extraction.plan.actions.len();
            for attempt in &extraction.attempts {
                events.push(
                    EventRecord::new("tier_attempt", turn_id)?
                        .with("tier", attempt.tier.label())
                        .with("model", attempt.model.clone())
                        .with("succeeded", attempt.succeeded.to_string()),
                );
            }
            if let Some(reason) = extraction.upgrade {
                events.push(
                    EventRecord::new("escalated", turn_id)?.with("reason", reason.describe()),
                );
            }
            turn
        }
        Err(err) => {
            events.push(
                EventRecord::new("extraction_failed", turn_id)?.with("error", err.to_string()),
            );
            TurnRecord::new(turn_id, mode.label(), &request.text, "failed")?
                .with_message(&err.to_string())
        }
    };
    Ok((turn, events))
}

pub fn run(opts: &ExtractOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let mut report = CommandReport::new("extract");
    let request = build_request(opts, &cfg)?;
    let turn_id = Uuid::new_v4().to_string();
    report.detail(format!("turn_id={turn_id}"));
    report.detail(format!("mode={}", opts.mode.label()));

    let client = completion_client(&cfg)?;
    let mut pipeline = ExtractionPipeline::new(policy(&cfg), opts.mode);
    if let Some(client) = client.as_ref() {
        pipeline = pipeline.with_source(client as &dyn PlanSource);
    }
    if cfg.heuristics.enabled {
        pipeline = pipeline.with_heuristics(&DEFAULT_TABLES);
    }

    let result = pipeline.run(&request);

    match journal_records(&turn_id, &request, opts.mode, &result) {
        Ok((turn, events)) => journal(turn, events),
        Err(err) => warn::emit(WarnEvent {
            code: WarnCode::W006Journal,
            stage: "journal_record",
            model: "na",
            reason: "journal record not built",
            err: &format!("{err:#}"),
        }),
    }

    match result {
        Ok(extraction) => {
            report.detail(format!("source={}", extraction.source.label()));
            if let Some(tier) = extraction.source.tier() {
                report.detail(format!("tier={}", tier.label()));
            }
            for attempt in &extraction.attempts {
                report.detail(format!(
                    "attempt tier={} model={} succeeded={}",
                    attempt.tier.label(),
                    attempt.model,
                    attempt.succeeded
                ));
            }
            report.detail(format!("actions={}", extraction.plan.actions.len()));
            report.detail(format!("message={}", extraction.plan.message));
            if let Some(decision) = extraction.plan.decision {
                let pending = decision.merge(&request.existing_actions, &extraction.plan.actions);
                report.detail(format!("pending_after={}", pending.len()));
            }
            report.set_payload(serde_json::to_value(&extraction.plan)?);
        }
        Err(err) => report.issue(err.to_string()),
    }

    Ok(report)
}
