use anyhow::Result;

use crate::commands::CommandReport;
use crate::intake::short_circuit::{MAX_TRIVIAL_CHARS, normalize, trivial_match};

pub fn run(text: &str) -> Result<CommandReport> {
    let mut report = CommandReport::new("check-trivial");
    let normalized = normalize(text);
    report.detail(format!("normalized={normalized}"));
    report.detail(format!(
        "normalized_chars={} max={MAX_TRIVIAL_CHARS}",
        normalized.chars().count()
    ));
    match trivial_match(text) {
        Some(pattern) => {
            report.detail("trivial=true");
            report.detail(format!("pattern={pattern}"));
        }
        None => report.detail("trivial=false"),
    }
    Ok(report)
}
