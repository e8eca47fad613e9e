use async_trait::async_trait;

use super::domain::{
    ApprovalRules, BulkCriteria, ContactRoute, EvaluationInput, EvaluationResult,
    PerRequestRules,
};
use crate::session::Session;

/// Persistence boundary for a participant's approval rules.
///
/// Reads return the whole document; writes replace exactly one partition.
#[async_trait]
pub trait RulesStore: Send + Sync {
    async fn load(&self, session: &Session) -> Result<ApprovalRules, UpstreamError>;
    async fn save_bulk_criteria(
        &self,
        session: &Session,
        bulk: &BulkCriteria,
    ) -> Result<(), UpstreamError>;
    async fn save_per_request(
        &self,
        session: &Session,
        rules: &PerRequestRules,
    ) -> Result<(), UpstreamError>;
    async fn save_contact_route(
        &self,
        session: &Session,
        contact: &ContactRoute,
    ) -> Result<(), UpstreamError>;
}

/// Authoritative evaluator owned by the core service.
#[async_trait]
pub trait RemoteEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        session: &Session,
        input: &EvaluationInput,
    ) -> Result<EvaluationResult, UpstreamError>;
}

/// Failure talking to the core service (or its in-process stand-in).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("core service unavailable: {0}")]
    Unavailable(String),
    #[error("core service rejected the request with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("core service returned an invalid response: {0}")]
    InvalidResponse(String),
}
