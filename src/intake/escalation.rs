use crate::error::WarnCode;
use crate::intake::action::{ActionKind, AssistantPlan, ResponseMode};
use crate::intake::client::{CompletionInput, PlanSource};
use crate::intake::prompt::PromptStyle;
use crate::intake::request::IntakeRequest;
use crate::intake::warn::{self, WarnEvent};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Cheap,
    Strong,
    Recovery,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Cheap => "cheap",
            Tier::Strong => "strong",
            Tier::Recovery => "recovery",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAttempt {
    pub tier: Tier,
    pub model: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeReason {
    NoActions,
    LowConfidence(f64),
    EmptyMeal,
}

impl UpgradeReason {
    pub fn describe(self) -> String {
        match self {
            UpgradeReason::NoActions => "no actions extracted".to_string(),
            UpgradeReason::LowConfidence(mean) => format!("mean confidence {mean:.2}"),
            UpgradeReason::EmptyMeal => "meal action without items".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    pub cheap_model: String,
    pub strong_model: String,
    pub confidence_threshold: f64,
    pub recovery_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct EscalationOutcome {
    pub plan: Option<AssistantPlan>,
    pub tier: Option<Tier>,
    pub upgrade: Option<UpgradeReason>,
    pub attempts: Vec<TierAttempt>,
}

/// Why a cheap-tier plan should be retried on the strong tier, if at all.
pub fn upgrade_reason(plan: &AssistantPlan, threshold: f64) -> Option<UpgradeReason> {
    let mean = plan.mean_confidence()?;
    if plan.actions.iter().any(|action| match &action.kind {
        ActionKind::LogMeal(meal) => meal.items.is_empty(),
        _ => false,
    }) {
        return Some(UpgradeReason::EmptyMeal);
    }
    if mean < threshold {
        return Some(UpgradeReason::LowConfidence(mean));
    }
    None
}

fn needs_upgrade(plan: &AssistantPlan, threshold: f64) -> Option<UpgradeReason> {
    if plan.actions.is_empty() {
        return Some(UpgradeReason::NoActions);
    }
    upgrade_reason(plan, threshold)
}

impl EscalationPolicy {
    fn attempt(
        &self,
        source: &dyn PlanSource,
        tier: Tier,
        input: &CompletionInput<'_>,
        attempts: &mut Vec<TierAttempt>,
    ) -> Option<AssistantPlan> {
        let model = match tier {
            Tier::Cheap => &self.cheap_model,
            Tier::Strong | Tier::Recovery => &self.strong_model,
        };
        warn::info("escalation", &format!("calling {} tier model={model}", tier.label()));
        let plan = source.complete(model, input);
        attempts.push(TierAttempt {
            tier,
            model: model.clone(),
            succeeded: plan.is_some(),
        });
        plan
    }

    /// Drive one turn through cheap → strong → recovery. Calls are strictly
    /// sequential and each tier runs at most once.
    pub fn run(
        &self,
        source: &dyn PlanSource,
        request: &IntakeRequest,
        mode: ResponseMode,
    ) -> EscalationOutcome {
        let standard = CompletionInput {
            request,
            mode,
            style: PromptStyle::Standard,
        };
        let mut attempts = Vec::new();
        let mut upgrade = None;

        let mut result = match self.attempt(source, Tier::Cheap, &standard, &mut attempts) {
            None => self
                .attempt(source, Tier::Strong, &standard, &mut attempts)
                .map(|plan| (plan, Tier::Strong)),
            Some(cheap) => match needs_upgrade(&cheap, self.confidence_threshold) {
                None => Some((cheap, Tier::Cheap)),
                Some(reason) => {
                    upgrade = Some(reason);
                    warn::info("escalation", &format!("upgrading: {}", reason.describe()));
                    match self.attempt(source, Tier::Strong, &standard, &mut attempts) {
                        Some(strong) => Some((strong, Tier::Strong)),
                        None => Some((cheap, Tier::Cheap)),
                    }
                }
            },
        };

        if result.is_none() && self.recovery_enabled {
            let recovery = CompletionInput {
                request,
                mode,
                style: PromptStyle::Recovery,
            };
            result = self
                .attempt(source, Tier::Recovery, &recovery, &mut attempts)
                .map(|plan| (plan, Tier::Recovery));
        }

        if result.is_none() {
            warn::emit(WarnEvent {
                code: WarnCode::W007Escalation,
                stage: "escalation",
                model: &self.strong_model,
                reason: "every tier failed",
                err: &format!("attempts={}", attempts.len()),
            });
        }

        let (plan, tier) = match result {
            Some((plan, tier)) => (Some(plan), Some(tier)),
            None => (None, None),
        };
        EscalationOutcome {
            plan,
            tier,
            upgrade,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::action::{Action, MealData, SymptomData};
    use std::cell::RefCell;

    /// Replays scripted results per tier and records every call.
    struct ScriptedSource {
        cheap: Option<AssistantPlan>,
        strong: Option<AssistantPlan>,
        recovery: Option<AssistantPlan>,
        calls: RefCell<Vec<(String, PromptStyle)>>,
    }

    impl ScriptedSource {
        fn new(
            cheap: Option<AssistantPlan>,
            strong: Option<AssistantPlan>,
            recovery: Option<AssistantPlan>,
        ) -> Self {
            Self {
                cheap,
                strong,
                recovery,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn models_called(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    impl PlanSource for ScriptedSource {
        fn complete(&self, model: &str, input: &CompletionInput<'_>) -> Option<AssistantPlan> {
            self.calls
                .borrow_mut()
                .push((model.to_string(), input.style));
            match (model, input.style) {
                ("cheap-model", _) => self.cheap.clone(),
                ("strong-model", PromptStyle::Standard) => self.strong.clone(),
                ("strong-model", PromptStyle::Recovery) => self.recovery.clone(),
                _ => None,
            }
        }
    }

    fn policy() -> EscalationPolicy {
        EscalationPolicy {
            cheap_model: "cheap-model".to_string(),
            strong_model: "strong-model".to_string(),
            confidence_threshold: 0.65,
            recovery_enabled: true,
        }
    }

    fn symptom_plan(message: &str, confidences: &[f64]) -> AssistantPlan {
        AssistantPlan {
            message: message.to_string(),
            actions: confidences
                .iter()
                .map(|c| Action {
                    kind: ActionKind::LogSymptom(SymptomData {
                        symptom: "headache".to_string(),
                        severity: None,
                        date: None,
                        time: None,
                        notes: None,
                    }),
                    title: "Headache".to_string(),
                    confidence: *c,
                })
                .collect(),
            decision: None,
        }
    }

    fn run(source: &ScriptedSource, policy: &EscalationPolicy) -> EscalationOutcome {
        let request = IntakeRequest::new("headache since noon");
        policy.run(source, &request, ResponseMode::Plan)
    }

    #[test]
    fn confident_cheap_result_skips_strong_tier() {
        let source = ScriptedSource::new(
            Some(symptom_plan("cheap", &[0.65, 0.9])),
            Some(symptom_plan("strong", &[0.99])),
            None,
        );
        let outcome = run(&source, &policy());
        assert_eq!(outcome.tier, Some(Tier::Cheap));
        assert_eq!(source.models_called(), vec!["cheap-model"]);
        assert!(outcome.upgrade.is_none());
    }

    #[test]
    fn empty_cheap_result_escalates_regardless_of_confidence() {
        let source = ScriptedSource::new(
            Some(symptom_plan("cheap", &[])),
            Some(symptom_plan("strong", &[0.4])),
            None,
        );
        let outcome = run(&source, &policy());
        assert_eq!(source.models_called(), vec!["cheap-model", "strong-model"]);
        assert_eq!(outcome.upgrade, Some(UpgradeReason::NoActions));
        assert_eq!(outcome.plan.map(|p| p.message), Some("strong".to_string()));
    }

    #[test]
    fn low_mean_confidence_is_replaced_by_strong_result() {
        let source = ScriptedSource::new(
            Some(symptom_plan("cheap", &[0.9, 0.3])),
            Some(symptom_plan("strong", &[0.8])),
            None,
        );
        let outcome = run(&source, &policy());
        assert_eq!(outcome.tier, Some(Tier::Strong));
        assert!(matches!(
            outcome.upgrade,
            Some(UpgradeReason::LowConfidence(m)) if (m - 0.6).abs() < 1e-9
        ));
    }

    #[test]
    fn meal_without_items_triggers_upgrade() {
        let mut plan = symptom_plan("cheap", &[0.95]);
        plan.actions.push(Action {
            kind: ActionKind::LogMeal(MealData {
                date: None,
                meal_type: None,
                items: Vec::new(),
                notes: None,
            }),
            title: "Meal".to_string(),
            confidence: 0.95,
        });
        assert_eq!(upgrade_reason(&plan, 0.65), Some(UpgradeReason::EmptyMeal));
    }

    #[test]
    fn strong_failure_keeps_cheap_result() {
        let source = ScriptedSource::new(Some(symptom_plan("cheap", &[0.2])), None, None);
        let outcome = run(&source, &policy());
        assert_eq!(outcome.tier, Some(Tier::Cheap));
        assert_eq!(outcome.plan.map(|p| p.message), Some("cheap".to_string()));
        assert_eq!(outcome.attempts.len(), 2);
        assert!(!outcome.attempts[1].succeeded);
    }

    #[test]
    fn cheap_failure_goes_straight_to_strong() {
        let source = ScriptedSource::new(None, Some(symptom_plan("strong", &[0.1])), None);
        let outcome = run(&source, &policy());
        // A weak strong-tier result is still final: there is no tier above it.
        assert_eq!(outcome.tier, Some(Tier::Strong));
        assert_eq!(source.models_called(), vec!["cheap-model", "strong-model"]);
    }

    #[test]
    fn recovery_prompt_runs_once_after_both_tiers_fail() {
        let source = ScriptedSource::new(None, None, Some(symptom_plan("recovered", &[0.7])));
        let outcome = run(&source, &policy());
        assert_eq!(outcome.tier, Some(Tier::Recovery));
        let calls = source.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].1, PromptStyle::Recovery);
    }

    #[test]
    fn every_tier_failing_yields_no_plan() {
        let source = ScriptedSource::new(None, None, None);
        let outcome = run(&source, &policy());
        assert!(outcome.plan.is_none());
        assert!(outcome.tier.is_none());
        assert_eq!(outcome.attempts.len(), 3);
    }

    #[test]
    fn recovery_is_skipped_when_disabled() {
        let source = ScriptedSource::new(None, None, Some(symptom_plan("recovered", &[0.7])));
        let mut policy = policy();
        policy.recovery_enabled = false;
        let outcome = run(&source, &policy);
        assert!(outcome.plan.is_none());
        assert_eq!(outcome.attempts.len(), 2);
    }
}
