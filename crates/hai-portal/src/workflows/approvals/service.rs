use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::defaults::default_rules;
use super::domain::{
    ApprovalRules, BulkCriteria, ContactRoute, EvaluationInput, PerRequestRules, RulesPartition,
};
use super::evaluation::{evaluate_locally, EvaluationSource, RuleTestOutcome};
use super::repository::{RemoteEvaluator, RulesStore, UpstreamError};
use super::validation::{
    validate_bulk_criteria, validate_contact_route, validate_evaluation_input,
    validate_per_request, RuleViolation,
};
use crate::session::{has_permission, PortalAction, Session};

/// Where a served rules document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesSource {
    Core,
    Defaults,
}

/// Rules document as handed to the portal UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesSnapshot {
    pub rules: ApprovalRules,
    pub source: RulesSource,
    pub fetched_at: DateTime<Utc>,
}

/// Service composing rule persistence, the core evaluator, and the local fallback.
pub struct ApprovalRulesService<S, E> {
    store: Arc<S>,
    remote: Arc<E>,
    defaults: ApprovalRules,
}

impl<S, E> ApprovalRulesService<S, E>
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    pub fn new(store: Arc<S>, remote: Arc<E>) -> Self {
        Self {
            store,
            remote,
            defaults: default_rules(),
        }
    }

    /// Load the caller's rules, serving the defaults when the store cannot answer.
    pub async fn rules(&self, session: &Session) -> Result<RulesSnapshot, ApprovalServiceError> {
        authorize(session, PortalAction::ViewRules)?;
        Ok(self.current_rules(session).await)
    }

    pub async fn update_bulk_criteria(
        &self,
        session: &Session,
        bulk: BulkCriteria,
    ) -> Result<BulkCriteria, ApprovalServiceError> {
        authorize(session, PortalAction::EditRules)?;
        validate_bulk_criteria(&bulk)?;
        self.store.save_bulk_criteria(session, &bulk).await?;
        log_saved(session, RulesPartition::BulkCriteria);
        Ok(bulk)
    }

    pub async fn update_per_request(
        &self,
        session: &Session,
        rules: PerRequestRules,
    ) -> Result<PerRequestRules, ApprovalServiceError> {
        authorize(session, PortalAction::EditRules)?;
        validate_per_request(&rules)?;
        self.store.save_per_request(session, &rules).await?;
        log_saved(session, RulesPartition::PerRequest);
        Ok(rules)
    }

    pub async fn update_contact_route(
        &self,
        session: &Session,
        contact: ContactRoute,
    ) -> Result<ContactRoute, ApprovalServiceError> {
        authorize(session, PortalAction::EditRules)?;
        validate_contact_route(&contact)?;
        self.store.save_contact_route(session, &contact).await?;
        log_saved(session, RulesPartition::ContactRoute);
        Ok(contact)
    }

    /// Evaluate a candidate with the core service, falling back to the local evaluator.
    pub async fn test_rules(
        &self,
        session: &Session,
        input: EvaluationInput,
    ) -> Result<RuleTestOutcome, ApprovalServiceError> {
        authorize(session, PortalAction::TestRules)?;
        validate_evaluation_input(&input)?;

        let outcome = match self.remote.evaluate(session, &input).await {
            Ok(evaluation) => RuleTestOutcome {
                evaluation,
                source: EvaluationSource::Remote,
            },
            Err(err) => {
                warn!(
                    participant = %session.participant_id,
                    error = %err,
                    "remote rule evaluation failed; evaluating locally"
                );
                let snapshot = self.current_rules(session).await;
                RuleTestOutcome {
                    evaluation: evaluate_locally(&snapshot.rules, &input),
                    source: EvaluationSource::Local,
                }
            }
        };

        info!(
            participant = %session.participant_id,
            result = ?outcome.evaluation.result,
            source = ?outcome.source,
            "rule test evaluated"
        );
        Ok(outcome)
    }

    async fn current_rules(&self, session: &Session) -> RulesSnapshot {
        let (rules, source) = self
            .store
            .load(session)
            .await
            .map(|rules| (rules, RulesSource::Core))
            .unwrap_or_else(|err| {
                warn!(
                    participant = %session.participant_id,
                    error = %err,
                    "rules store unavailable; serving defaults"
                );
                (self.defaults.clone(), RulesSource::Defaults)
            });

        RulesSnapshot {
            rules,
            source,
            fetched_at: Utc::now(),
        }
    }
}

pub(crate) fn authorize(
    session: &Session,
    action: PortalAction,
) -> Result<(), ApprovalServiceError> {
    let required = action.required_role();
    if has_permission(session, required) {
        Ok(())
    } else {
        Err(ApprovalServiceError::Forbidden { action })
    }
}

fn log_saved(session: &Session, partition: RulesPartition) {
    info!(
        participant = %session.participant_id,
        partition = partition.segment(),
        "approval rules partition saved"
    );
}

/// Error raised by the approval rules service.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalServiceError {
    #[error("session role does not permit {action:?}")]
    Forbidden { action: PortalAction },
    #[error(transparent)]
    Invalid(#[from] RuleViolation),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
