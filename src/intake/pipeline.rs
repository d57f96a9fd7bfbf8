use crate::error::IntakeError;
use crate::intake::action::{AssistantPlan, ResponseMode};
use crate::intake::client::PlanSource;
use crate::intake::escalation::{EscalationPolicy, Tier, TierAttempt, UpgradeReason};
use crate::intake::heuristics::{self, HeuristicTables};
use crate::intake::request::IntakeRequest;
use crate::intake::short_circuit;
use crate::intake::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    ShortCircuit,
    Model(Tier),
}

impl ExtractionSource {
    pub fn label(self) -> &'static str {
        match self {
            ExtractionSource::ShortCircuit => "short_circuit",
            ExtractionSource::Model(_) => "model",
        }
    }

    pub fn tier(self) -> Option<Tier> {
        match self {
            ExtractionSource::ShortCircuit => None,
            ExtractionSource::Model(tier) => Some(tier),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub plan: AssistantPlan,
    pub source: ExtractionSource,
    pub upgrade: Option<UpgradeReason>,
    pub attempts: Vec<TierAttempt>,
}

/// Request check → short circuit → tiered completion → enrichment.
pub struct ExtractionPipeline<'a> {
    policy: EscalationPolicy,
    mode: ResponseMode,
    source: Option<&'a dyn PlanSource>,
    tables: Option<&'a HeuristicTables>,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(policy: EscalationPolicy, mode: ResponseMode) -> Self {
        Self {
            policy,
            mode,
            source: None,
            tables: None,
        }
    }

    /// Without a source, only short-circuited turns can be answered.
    pub fn with_source(mut self, source: &'a dyn PlanSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_heuristics(mut self, tables: &'a HeuristicTables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn run(&self, request: &IntakeRequest) -> Result<Extraction, IntakeError> {
        request.check()?;

        if let Some(pattern) = short_circuit::trivial_match(&request.text) {
            warn::info("short_circuit", &format!("matched {pattern}"));
            return Ok(Extraction {
                plan: short_circuit::canned_plan(self.mode),
                source: ExtractionSource::ShortCircuit,
                upgrade: None,
                attempts: Vec::new(),
            });
        }

        let source = self.source.ok_or(IntakeError::MissingApiKey)?;
        let outcome = self.policy.run(source, request, self.mode);
        let (Some(mut plan), Some(tier)) = (outcome.plan, outcome.tier) else {
            return Err(IntakeError::Unrecognized);
        };

        match self.tables {
            Some(tables) => heuristics::enrich(
                &mut plan,
                &request.text,
                request.today.as_deref(),
                tables,
            ),
            None => heuristics::clamp_and_cap(&mut plan),
        }

        Ok(Extraction {
            plan,
            source: ExtractionSource::Model(tier),
            upgrade: outcome.upgrade,
            attempts: outcome.attempts,
        })
    }
}
