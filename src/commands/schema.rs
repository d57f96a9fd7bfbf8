use anyhow::Result;

use crate::commands::CommandReport;
use crate::intake::action::ResponseMode;
use crate::intake::response_format::{response_format, schema_name};

pub fn run(mode: ResponseMode) -> Result<CommandReport> {
    let mut report = CommandReport::new("schema");
    report.detail(format!("mode={}", mode.label()));
    report.detail(format!("name={}", schema_name(mode)));
    report.set_payload(response_format(mode));
    Ok(report)
}
