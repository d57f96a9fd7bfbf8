use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::commands::CommandReport;
use crate::intake::action::ResponseMode;
use crate::intake::validate::{validate_action, validate_plan};

pub fn run(file: &Path, mode: ResponseMode, single_action: bool) -> Result<CommandReport> {
    let mut report = CommandReport::new("validate");
    report.detail(format!("file={}", file.display()));

    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            report.issue(format!("not valid JSON: {err}"));
            return Ok(report);
        }
    };

    if single_action {
        match validate_action(&value) {
            Ok(action) => {
                report.detail(format!("valid {} action", action.kind.type_tag()));
                report.set_payload(serde_json::to_value(&action)?);
            }
            Err(err) => report.issue(err.to_string()),
        }
        return Ok(report);
    }

    report.detail(format!("mode={}", mode.label()));
    match validate_plan(&value, mode) {
        Ok(plan) => {
            report.detail(format!("actions={}", plan.actions.len()));
            for action in &plan.actions {
                report.detail(format!("action={} title={}", action.kind.type_tag(), action.title));
            }
            report.set_payload(serde_json::to_value(&plan)?);
        }
        Err(err) => report.issue(err.to_string()),
    }
    Ok(report)
}
