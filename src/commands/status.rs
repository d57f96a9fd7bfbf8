use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::intake::config::{api_key, load_config};
use crate::intake::paths::resolve_paths;

include!(concat!(env!("OUT_DIR"), "/intake_env_allowlist.rs"));

/// Recognized `INTAKE_*` variables currently present in the environment.
pub fn env_keys_set() -> Vec<&'static str> {
    GENERATED_INTAKE_ENV_ALLOWLIST
        .iter()
        .copied()
        .filter(|key| env::var_os(key).is_some())
        .collect()
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("build={}", env!("BUILD_UUID")));
    report.detail(format!("intake_home={}", paths.intake_home.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    match paths.config_path.as_deref() {
        Some(path) => report.detail(format!(
            "config_path={} exists={}",
            path.display(),
            path.exists()
        )),
        None => report.detail("config_path=unresolved"),
    }

    match load_config() {
        Ok(cfg) => {
            report.detail(format!("cheap_model={}", cfg.models.cheap));
            report.detail(format!("strong_model={}", cfg.models.strong));
            report.detail(format!(
                "confidence_threshold={}",
                cfg.escalation.confidence_threshold
            ));
            report.detail(format!("recovery_enabled={}", cfg.escalation.recovery_enabled));
            report.detail(format!("base_url={}", cfg.completion.base_url));
            report.detail(format!("timeout_secs={}", cfg.completion.timeout_secs));
            report.detail(format!("history_turns={}", cfg.completion.history_turns));
            report.detail(format!("heuristics_enabled={}", cfg.heuristics.enabled));
            report.detail(format!("timezone={}", cfg.clock.timezone));
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }

    report.detail(format!("api_key_present={}", api_key().is_some()));
    report.detail(format!(
        "recognized_env_keys={}",
        GENERATED_INTAKE_ENV_ALLOWLIST.len()
    ));
    for key in env_keys_set() {
        report.detail(format!("env_set={key}"));
    }

    Ok(report)
}
