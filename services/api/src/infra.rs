use async_trait::async_trait;
use hai_portal::session::Session;
use hai_portal::workflows::approvals::{
    default_rules, ApprovalRules, BulkCriteria, ContactRoute, EvaluationInput, EvaluationResult,
    ParticipantId, PerRequestRules, RemoteEvaluator, RulesStore, UpstreamError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Per-participant rules kept in process memory when no core service is configured.
#[derive(Clone)]
pub(crate) struct InMemoryRulesStore {
    seed: ApprovalRules,
    documents: Arc<Mutex<HashMap<ParticipantId, ApprovalRules>>>,
}

impl Default for InMemoryRulesStore {
    fn default() -> Self {
        Self::seeded(default_rules())
    }
}

impl InMemoryRulesStore {
    pub(crate) fn seeded(seed: ApprovalRules) -> Self {
        Self {
            seed,
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ParticipantId, ApprovalRules>>, UpstreamError> {
        self.documents
            .lock()
            .map_err(|_| UpstreamError::Unavailable("rules store mutex poisoned".to_string()))
    }

    fn update(
        &self,
        session: &Session,
        apply: impl FnOnce(&mut ApprovalRules),
    ) -> Result<(), UpstreamError> {
        let mut guard = self.lock()?;
        let document = guard
            .entry(session.participant_id.clone())
            .or_insert_with(|| self.seed.clone());
        apply(document);
        Ok(())
    }
}

#[async_trait]
impl RulesStore for InMemoryRulesStore {
    async fn load(&self, session: &Session) -> Result<ApprovalRules, UpstreamError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&session.participant_id)
            .cloned()
            .unwrap_or_else(|| self.seed.clone()))
    }

    async fn save_bulk_criteria(
        &self,
        session: &Session,
        bulk: &BulkCriteria,
    ) -> Result<(), UpstreamError> {
        self.update(session, |rules| rules.bulk = bulk.clone())
    }

    async fn save_per_request(
        &self,
        session: &Session,
        per_request: &PerRequestRules,
    ) -> Result<(), UpstreamError> {
        self.update(session, |rules| rules.per_request = per_request.clone())
    }

    async fn save_contact_route(
        &self,
        session: &Session,
        contact: &ContactRoute,
    ) -> Result<(), UpstreamError> {
        self.update(session, |rules| rules.contact = contact.clone())
    }
}

/// Evaluator used when running without a core service; every call takes the local path.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineEvaluator;

#[async_trait]
impl RemoteEvaluator for OfflineEvaluator {
    async fn evaluate(
        &self,
        _session: &Session,
        _input: &EvaluationInput,
    ) -> Result<EvaluationResult, UpstreamError> {
        Err(UpstreamError::Unavailable(
            "no core service configured".to_string(),
        ))
    }
}
