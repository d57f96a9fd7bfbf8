use crate::intake::request::MAX_HISTORY_TURNS;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const API_KEY_VARS: [&str; 2] = ["INTAKE_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub cheap: String,
    pub strong: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            cheap: "gpt-4.1-mini".to_string(),
            strong: "gpt-4.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub confidence_threshold: f64,
    pub recovery_enabled: bool,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.65,
            recovery_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub history_turns: usize,
    pub max_output_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            timeout_secs: 30,
            history_turns: 8,
            max_output_tokens: 1200,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub enabled: bool,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub timezone: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntakeConfig {
    pub models: ModelsConfig,
    pub escalation: EscalationConfig,
    pub completion: CompletionConfig,
    pub heuristics: HeuristicsConfig,
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialIntakeConfig {
    models: Option<ModelsConfig>,
    escalation: Option<EscalationConfig>,
    completion: Option<CompletionConfig>,
    heuristics: Option<HeuristicsConfig>,
    clock: Option<ClockConfig>,
}

fn env_or_f64(var: &str, fallback: f64) -> f64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<f64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_optional_f64(var: &str, fallback: Option<f64>) -> Option<f64> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<f64>().ok().or(fallback),
        _ => fallback,
    }
}

fn validate(cfg: &IntakeConfig) -> Result<()> {
    let threshold = cfg.escalation.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(anyhow!(
            "invalid confidence threshold {threshold}: require 0 <= threshold <= 1"
        ));
    }
    if cfg.models.cheap.trim().is_empty() || cfg.models.strong.trim().is_empty() {
        return Err(anyhow!("invalid models: cheap and strong names cannot be empty"));
    }
    if cfg.completion.timeout_secs == 0 {
        return Err(anyhow!("invalid completion timeout: must be >= 1 second"));
    }
    if cfg.completion.history_turns > MAX_HISTORY_TURNS {
        return Err(anyhow!(
            "invalid history turns {}: at most {MAX_HISTORY_TURNS}",
            cfg.completion.history_turns
        ));
    }
    if cfg.completion.max_output_tokens == 0 {
        return Err(anyhow!("invalid max output tokens: must be >= 1"));
    }
    if let Some(temperature) = cfg.completion.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(anyhow!("invalid temperature {temperature}: require 0 <= t <= 2"));
    }
    let base = cfg.completion.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(anyhow!("invalid base url `{base}`: must start with http:// or https://"));
    }
    if cfg.clock.timezone.parse::<chrono_tz::Tz>().is_err() {
        return Err(anyhow!("invalid timezone `{}`", cfg.clock.timezone));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("INTAKE_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".intake").join("intake.toml"))
}

fn merge_file_config(base: &mut IntakeConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialIntakeConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse intake config {}: {err}", path.display()))?;
    if let Some(models) = parsed.models {
        base.models = models;
    }
    if let Some(escalation) = parsed.escalation {
        base.escalation = escalation;
    }
    if let Some(completion) = parsed.completion {
        base.completion = completion;
    }
    if let Some(heuristics) = parsed.heuristics {
        base.heuristics = heuristics;
    }
    if let Some(clock) = parsed.clock {
        base.clock = clock;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut IntakeConfig) {
    cfg.models.cheap = env_or_string("INTAKE_CHEAP_MODEL", &cfg.models.cheap);
    cfg.models.strong = env_or_string("INTAKE_STRONG_MODEL", &cfg.models.strong);
    cfg.escalation.confidence_threshold = env_or_f64(
        "INTAKE_CONFIDENCE_THRESHOLD",
        cfg.escalation.confidence_threshold,
    );
    cfg.escalation.recovery_enabled =
        env_or_bool("INTAKE_RECOVERY", cfg.escalation.recovery_enabled);
    cfg.completion.base_url = env_or_string("INTAKE_BASE_URL", &cfg.completion.base_url);
    cfg.completion.timeout_secs =
        env_or_u64("INTAKE_TIMEOUT_SECS", cfg.completion.timeout_secs);
    cfg.completion.history_turns =
        env_or_u64("INTAKE_HISTORY_TURNS", cfg.completion.history_turns as u64) as usize;
    cfg.completion.max_output_tokens = u32::try_from(env_or_u64(
        "INTAKE_MAX_OUTPUT_TOKENS",
        u64::from(cfg.completion.max_output_tokens),
    ))
    .unwrap_or(cfg.completion.max_output_tokens);
    cfg.completion.temperature =
        env_optional_f64("INTAKE_TEMPERATURE", cfg.completion.temperature);
    cfg.heuristics.enabled = env_or_bool("INTAKE_HEURISTICS", cfg.heuristics.enabled);
    cfg.clock.timezone = env_or_string("INTAKE_TIMEZONE", &cfg.clock.timezone);
}

pub fn load_config() -> Result<IntakeConfig> {
    let mut cfg = IntakeConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

/// First non-empty key among `INTAKE_API_KEY` and `OPENAI_API_KEY`.
pub fn api_key() -> Option<String> {
    API_KEY_VARS.iter().find_map(|var| match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    })
}
