use crate::error::WarnCode;
use std::env;

#[derive(Debug, Clone)]
pub struct WarnEvent<'a> {
    pub code: WarnCode,
    pub stage: &'a str,
    pub model: &'a str,
    pub reason: &'a str,
    pub err: &'a str,
}

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_ascii_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if ch.is_ascii_graphic() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

fn render(level: &str, event: &WarnEvent<'_>) -> String {
    format!(
        "{level} code={} stage={} model={} reason={} err={}",
        event.code.as_str(),
        sanitize_value(event.stage),
        sanitize_value(event.model),
        sanitize_value(event.reason),
        sanitize_value(event.err),
    )
}

pub fn emit(event: WarnEvent<'_>) {
    eprintln!("{}", render("INTAKE_WARN", &event));
}

fn verbose_enabled() -> bool {
    matches!(
        env::var("INTAKE_VERBOSE").ok().as_deref().map(str::trim),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Progress lines (tier choices, heuristic hits); printed only when
/// `INTAKE_VERBOSE` is set.
pub fn info(stage: &str, message: &str) {
    if verbose_enabled() {
        eprintln!(
            "INTAKE_INFO stage={} msg={}",
            sanitize_value(stage),
            sanitize_value(message)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{WarnEvent, render, sanitize_value};
    use crate::error::WarnCode;

    #[test]
    fn sanitize_value_rewrites_whitespace() {
        assert_eq!(sanitize_value("a b\tc"), "a_b_c");
    }

    #[test]
    fn sanitize_value_falls_back_for_empty() {
        assert_eq!(sanitize_value("   "), "na");
    }

    #[test]
    fn render_emits_single_key_value_line() {
        let line = render(
            "INTAKE_WARN",
            &WarnEvent {
                code: WarnCode::W002Status,
                stage: "complete",
                model: "gpt-4.1-mini",
                reason: "non-success status",
                err: "429 Too Many Requests",
            },
        );
        assert_eq!(
            line,
            "INTAKE_WARN code=W002_STATUS stage=complete model=gpt-4.1-mini reason=non-success_status err=429_Too_Many_Requests"
        );
    }
}
