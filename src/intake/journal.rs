use crate::error::WarnCode;
use crate::intake::escalation::{Tier, TierAttempt};
use crate::intake::paths::IntakePaths;
use crate::intake::util::{now_epoch_secs, sha256_hex, truncate_with_ellipsis};
use crate::intake::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MESSAGE_PREVIEW_CHARS: usize = 200;

/// One processed turn. The raw note is never stored, only its digest.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn_id: String,
    pub at_epoch_secs: u64,
    pub mode: String,
    pub text_sha256: String,
    pub source: String,
    pub tier: Option<Tier>,
    pub attempts: Vec<TierAttempt>,
    pub action_count: usize,
    pub message: String,
}

impl TurnRecord {
    pub fn new(turn_id: &str, mode: &str, text: &str, source: &str) -> Result<Self> {
        Ok(Self {
            turn_id: turn_id.to_string(),
            at_epoch_secs: now_epoch_secs()?,
            mode: mode.to_string(),
            text_sha256: sha256_hex(text),
            source: source.to_string(),
            tier: None,
            attempts: Vec::new(),
            action_count: 0,
            message: String::new(),
        })
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = truncate_with_ellipsis(message, MESSAGE_PREVIEW_CHARS);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub name: String,
    pub turn_id: String,
    pub at_epoch_secs: u64,
    pub detail: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new(name: &str, turn_id: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            turn_id: turn_id.to_string(),
            at_epoch_secs: now_epoch_secs()?,
            detail: BTreeMap::new(),
        })
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.detail.insert(key.to_string(), value.into());
        self
    }
}

/// Where turn and analytics records go. Writes may fail; callers decide
/// what a failure means.
pub trait TurnStore {
    fn record_turn(&self, record: &TurnRecord) -> Result<()>;
    fn record_event(&self, event: &EventRecord) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonlTurnStore {
    turns_path: PathBuf,
    events_path: PathBuf,
}

impl JsonlTurnStore {
    pub fn new(paths: &IntakePaths) -> Self {
        Self {
            turns_path: paths.turns_log.clone(),
            events_path: paths.events_log.clone(),
        }
    }
}

fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let line = format!("{}\n", serde_json::to_string(value)?);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("failed to lock {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}

impl TurnStore for JsonlTurnStore {
    fn record_turn(&self, record: &TurnRecord) -> Result<()> {
        append_line(&self.turns_path, record)
    }

    fn record_event(&self, event: &EventRecord) -> Result<()> {
        append_line(&self.events_path, event)
    }
}

fn warn_journal(stage: &str, err: &anyhow::Error) {
    warn::emit(WarnEvent {
        code: WarnCode::W006Journal,
        stage,
        model: "na",
        reason: "journal write failed",
        err: &format!("{err:#}"),
    });
}

/// Write a turn and its events, turning every failure into a warning.
/// Returns how many records were written.
pub fn record_best_effort(
    store: &dyn TurnStore,
    turn: &TurnRecord,
    events: &[EventRecord],
) -> usize {
    let mut written = 0;
    match store.record_turn(turn) {
        Ok(()) => written += 1,
        Err(err) => warn_journal("journal_turn", &err),
    }
    for event in events {
        match store.record_event(event) {
            Ok(()) => written += 1,
            Err(err) => warn_journal("journal_event", &err),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> JsonlTurnStore {
        JsonlTurnStore {
            turns_path: dir.join("logs/turns.jsonl"),
            events_path: dir.join("logs/events.jsonl"),
        }
    }

    #[test]
    fn appends_one_json_line_per_record() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        let turn = TurnRecord::new("turn-1", "plan", "two eggs", "model")
            .expect("record")
            .with_message("Logged breakfast.");
        let event = EventRecord::new("tier_attempt", "turn-1")
            .expect("event")
            .with("tier", "cheap");

        assert_eq!(record_best_effort(&store, &turn, &[event.clone()]), 2);
        assert_eq!(record_best_effort(&store, &turn, &[event]), 2);

        let turns = fs::read_to_string(tmp.path().join("logs/turns.jsonl")).expect("turns");
        let lines: Vec<&str> = turns.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(parsed["turn_id"], "turn-1");
        assert_eq!(parsed["text_sha256"], sha256_hex("two eggs"));
        assert!(!turns.contains("two eggs"));

        let events = fs::read_to_string(tmp.path().join("logs/events.jsonl")).expect("events");
        assert!(events.contains("\"tier\":\"cheap\""));
    }

    #[test]
    fn unwritable_store_is_swallowed() {
        let tmp = tempdir().expect("tempdir");
        let blocker = tmp.path().join("logs");
        fs::write(&blocker, "not a directory").expect("write blocker");
        let store = store_in(tmp.path());
        let turn = TurnRecord::new("turn-2", "plan", "coffee", "model").expect("record");
        assert_eq!(record_best_effort(&store, &turn, &[]), 0);
    }
}
