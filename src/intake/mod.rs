pub mod action;
pub mod client;
pub mod coerce;
pub mod config;
pub mod escalation;
pub mod heuristics;
pub mod journal;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod response_format;
pub mod response_text;
pub mod short_circuit;
pub mod util;
pub mod validate;
pub mod warn;
