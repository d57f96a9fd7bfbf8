use crate::intake::action::{AssistantPlan, Decision, ResponseMode};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_TRIVIAL_CHARS: usize = 220;
pub const CANNED_MESSAGE: &str = "I can hear you. Tell me what you'd like to log.";

const LEAD: &str = r"^(?:(?:hi|hello|hey|ok|okay|um|uh|so)\s+)*";
const TAIL: &str = r"(?:\s+(?:one|two|three|\d+|please|now|ok|okay|test|testing|hello|again))*$";

static TRIVIAL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("testing", r"test(?:ing)?(?:\s+test(?:ing)?)*"),
        ("mic_check", r"mic(?:rophone)? check"),
        ("can_you_hear_me", r"can you hear me"),
        ("do_you_hear_me", r"do you hear me"),
        ("is_this_on", r"is (?:this|it) (?:thing )?(?:on|working)"),
    ]
    .into_iter()
    .map(|(name, core)| {
        let re = Regex::new(&format!("{LEAD}{core}{TAIL}")).expect("trivial pattern compiles");
        (name, re)
    })
    .collect()
});

/// Lower-case, punctuation to spaces, whitespace collapsed.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name of the pattern that marks `text` as a mic check, if any.
pub fn trivial_match(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    if normalized.is_empty() || normalized.chars().count() > MAX_TRIVIAL_CHARS {
        return None;
    }
    TRIVIAL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&normalized))
        .map(|(name, _)| *name)
}

pub fn is_trivial(text: &str) -> bool {
    trivial_match(text).is_some()
}

pub fn canned_plan(mode: ResponseMode) -> AssistantPlan {
    AssistantPlan {
        message: CANNED_MESSAGE.to_string(),
        actions: Vec::new(),
        decision: match mode {
            ResponseMode::Plan => None,
            ResponseMode::Conversation => Some(Decision::chat()),
        },
    }
}
