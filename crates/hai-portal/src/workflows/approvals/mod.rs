//! Approval rules for inbound trading-connection requests.
//!
//! Rules are read from and written to the core service partition by partition. Rule tests
//! go to the core evaluator first and fall back to [`evaluate_locally`] when it cannot be
//! reached, so the portal always answers with the same result shape.

pub mod core_client;
pub mod defaults;
pub mod domain;
pub(crate) mod evaluation;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use core_client::{CoreClient, CoreClientError};
pub use defaults::default_rules;
pub use domain::{
    ApprovalOutcome, ApprovalRules, BulkCriteria, ContactRoute, Criterion, DefaultPosture,
    EvaluationInput, EvaluationResult, ParticipantId, PerRequestRules, RulesPartition,
};
pub use evaluation::{evaluate_locally, EvaluationSource, RuleTestOutcome};
pub use repository::{RemoteEvaluator, RulesStore, UpstreamError};
pub use router::approval_router;
pub use service::{ApprovalRulesService, ApprovalServiceError, RulesSnapshot, RulesSource};
pub use validation::RuleViolation;
