use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::intake::action::ResponseMode;

#[derive(Debug, Parser)]
#[command(
    name = "intake",
    version,
    about = "Turn free-form health notes into structured log actions"
)]
struct Cli {
    /// Print the full report as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Plan,
    Conversation,
}

impl From<ModeArg> for ResponseMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Plan => ResponseMode::Plan,
            ModeArg::Conversation => ResponseMode::Conversation,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract actions from one note.
    Extract {
        #[arg(long)]
        text: String,
        /// Calendar date for relative references (YYYY-MM-DD).
        #[arg(long)]
        today: Option<String>,
        /// Current time as an RFC 3339 timestamp.
        #[arg(long)]
        now: Option<String>,
        /// JSON file with recent turns: [{"role": "user", "text": "..."}].
        #[arg(long)]
        history: Option<PathBuf>,
        /// JSON file with pending actions not yet saved.
        #[arg(long)]
        existing: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "plan")]
        mode: ModeArg,
    },
    /// Report whether a note would skip the model as a mic check.
    CheckTrivial {
        #[arg(long)]
        text: String,
    },
    /// Validate an envelope (or a single action) stored as JSON.
    Validate {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum, default_value = "plan")]
        mode: ModeArg,
        #[arg(long)]
        action: bool,
    },
    /// Print the structured-output schema sent with every request.
    Schema {
        #[arg(long, value_enum, default_value = "plan")]
        mode: ModeArg,
    },
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("{}: {state}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    if let Some(payload) = &report.payload {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match cli.command {
        Command::Extract {
            text,
            today,
            now,
            history,
            existing,
            mode,
        } => commands::extract::run(&commands::extract::ExtractOptions {
            text,
            today,
            now,
            history,
            existing,
            mode: mode.into(),
        })?,
        Command::CheckTrivial { text } => commands::check_trivial::run(&text)?,
        Command::Validate { file, mode, action } => {
            commands::validate::run(&file, mode.into(), action)?
        }
        Command::Schema { mode } => commands::schema::run(mode.into())?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        bail!("{} failed: {}", report.command, report.issues.join("; "));
    }
    Ok(())
}
