mod policy;

use serde::Serialize;

use super::domain::{ApprovalRules, EvaluationInput, EvaluationResult};

/// Evaluate a candidate against the rules without consulting the core service.
///
/// Mirrors the response shape of the remote evaluator so callers can substitute it when
/// the core service is unreachable. Total over its input: scores are taken as given.
pub fn evaluate_locally(rules: &ApprovalRules, input: &EvaluationInput) -> EvaluationResult {
    policy::decide(
        rules,
        input.behavioral_score,
        &input.business_type,
        &input.region,
    )
}

/// Which evaluator produced a rule-test decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    Remote,
    Local,
}

/// Rule-test decision together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTestOutcome {
    pub evaluation: EvaluationResult,
    pub source: EvaluationSource,
}
