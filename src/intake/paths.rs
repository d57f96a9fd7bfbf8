use crate::intake::config::resolve_config_path;
use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct IntakePaths {
    pub intake_home: PathBuf,
    pub logs_dir: PathBuf,
    pub turns_log: PathBuf,
    pub events_log: PathBuf,
    pub config_path: Option<PathBuf>,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<IntakePaths> {
    let intake_home = match env::var("INTAKE_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".intake"),
    };
    let logs_dir = env_or_default_path("INTAKE_LOGS_DIR", intake_home.join("logs"));
    let turns_log = logs_dir.join("turns.jsonl");
    let events_log = logs_dir.join("events.jsonl");

    Ok(IntakePaths {
        intake_home,
        logs_dir,
        turns_log,
        events_log,
        config_path: resolve_config_path(),
    })
}
