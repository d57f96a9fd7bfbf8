use anyhow::{Result, anyhow};
use chrono::Utc;
use chrono_tz::Tz;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current Unix epoch in seconds.
pub fn now_epoch_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Truncate `input` to at most `max_chars` Unicode characters, stripping
/// control characters and appending `…` when truncated.
pub fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    let clean: String = input.chars().filter(|c| !c.is_control()).collect();
    if clean.chars().count() > max_chars {
        let mut s: String = clean.chars().take(max_chars).collect();
        s.push('…');
        s
    } else {
        clean
    }
}

pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Local calendar date and RFC 3339 timestamp in the configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalClock {
    pub today: String,
    pub now_iso: String,
}

pub fn local_clock(timezone: &str) -> Result<LocalClock> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| anyhow!("unknown timezone `{timezone}`"))?;
    let now = Utc::now().with_timezone(&tz);
    Ok(LocalClock {
        today: now.format("%Y-%m-%d").to_string(),
        now_iso: now.to_rfc3339(),
    })
}
