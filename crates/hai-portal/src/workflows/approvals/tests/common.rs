use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::session::{Role, Session};
use crate::workflows::approvals::domain::{
    ApprovalOutcome, ApprovalRules, BulkCriteria, ContactRoute, DefaultPosture, EvaluationInput,
    EvaluationResult, ParticipantId, PerRequestRules, RulesPartition,
};
use crate::workflows::approvals::repository::{RemoteEvaluator, RulesStore, UpstreamError};
use crate::workflows::approvals::{approval_router, ApprovalRulesService};

pub(super) fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Rules matching the worked example used across the portal docs.
pub(super) fn example_rules() -> ApprovalRules {
    ApprovalRules {
        bulk: BulkCriteria {
            publicly_traded: true,
            duns_verified: true,
            min_score: 80,
            min_years_on_network: 3,
            min_active_trading_pairs: 5,
            allowlist_ids: BTreeSet::new(),
        },
        per_request: PerRequestRules {
            min_score: 70,
            allowed_business_types: names(&["Corporation", "LLC"]),
            allowed_regions: names(&["Midwest"]),
            blocklist_ids: BTreeSet::new(),
            default_posture: DefaultPosture::AutoApproveWithRules,
        },
        contact: ContactRoute {
            email: "network-ops@acme.example".to_string(),
            phone: "+1 (515) 555-0100".to_string(),
        },
    }
}

pub(super) fn rules_with_posture(posture: DefaultPosture) -> ApprovalRules {
    let mut rules = example_rules();
    rules.per_request.default_posture = posture;
    rules
}

pub(super) fn input(score: i32, business_type: &str, region: &str) -> EvaluationInput {
    EvaluationInput {
        behavioral_score: score,
        business_type: business_type.to_string(),
        region: region.to_string(),
    }
}

pub(super) fn session(role: Role) -> Session {
    Session::new(ParticipantId("acme-001".to_string()), role).with_access_token("token-abc")
}

pub(super) fn remote_reject() -> EvaluationResult {
    EvaluationResult {
        result: ApprovalOutcome::Reject,
        reason: "Requester is on the blocklist.".to_string(),
        matched_criterion: Some("per_request.blocklist_ids".to_string()),
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) rules: Mutex<Option<ApprovalRules>>,
    pub(super) writes: Mutex<Vec<RulesPartition>>,
}

impl MemoryStore {
    pub(super) fn with_rules(rules: ApprovalRules) -> Self {
        Self {
            rules: Mutex::new(Some(rules)),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn writes(&self) -> Vec<RulesPartition> {
        self.writes.lock().expect("writes mutex poisoned").clone()
    }

    pub(super) fn current(&self) -> Option<ApprovalRules> {
        self.rules.lock().expect("rules mutex poisoned").clone()
    }

    fn apply(&self, partition: RulesPartition, update: impl FnOnce(&mut ApprovalRules)) {
        let mut guard = self.rules.lock().expect("rules mutex poisoned");
        if let Some(rules) = guard.as_mut() {
            update(rules);
        }
        self.writes
            .lock()
            .expect("writes mutex poisoned")
            .push(partition);
    }
}

#[async_trait]
impl RulesStore for MemoryStore {
    async fn load(&self, _session: &Session) -> Result<ApprovalRules, UpstreamError> {
        self.current()
            .ok_or_else(|| UpstreamError::Unavailable("no rules seeded".to_string()))
    }

    async fn save_bulk_criteria(
        &self,
        _session: &Session,
        bulk: &BulkCriteria,
    ) -> Result<(), UpstreamError> {
        self.apply(RulesPartition::BulkCriteria, |rules| rules.bulk = bulk.clone());
        Ok(())
    }

    async fn save_per_request(
        &self,
        _session: &Session,
        per_request: &PerRequestRules,
    ) -> Result<(), UpstreamError> {
        self.apply(RulesPartition::PerRequest, |rules| {
            rules.per_request = per_request.clone()
        });
        Ok(())
    }

    async fn save_contact_route(
        &self,
        _session: &Session,
        contact: &ContactRoute,
    ) -> Result<(), UpstreamError> {
        self.apply(RulesPartition::ContactRoute, |rules| {
            rules.contact = contact.clone()
        });
        Ok(())
    }
}

pub(super) struct OfflineStore;

#[async_trait]
impl RulesStore for OfflineStore {
    async fn load(&self, _session: &Session) -> Result<ApprovalRules, UpstreamError> {
        Err(UpstreamError::Unavailable("connection refused".to_string()))
    }

    async fn save_bulk_criteria(
        &self,
        _session: &Session,
        _bulk: &BulkCriteria,
    ) -> Result<(), UpstreamError> {
        Err(UpstreamError::Unavailable("connection refused".to_string()))
    }

    async fn save_per_request(
        &self,
        _session: &Session,
        _rules: &PerRequestRules,
    ) -> Result<(), UpstreamError> {
        Err(UpstreamError::Unavailable("connection refused".to_string()))
    }

    async fn save_contact_route(
        &self,
        _session: &Session,
        _contact: &ContactRoute,
    ) -> Result<(), UpstreamError> {
        Err(UpstreamError::Rejected {
            status: 409,
            detail: "contact route locked".to_string(),
        })
    }
}

/// Remote evaluator that answers with a fixed result, or fails when given none.
#[derive(Default)]
pub(super) struct ScriptedEvaluator {
    response: Option<EvaluationResult>,
    calls: AtomicUsize,
}

impl ScriptedEvaluator {
    pub(super) fn answering(result: EvaluationResult) -> Self {
        Self {
            response: Some(result),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing() -> Self {
        Self::default()
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteEvaluator for ScriptedEvaluator {
    async fn evaluate(
        &self,
        _session: &Session,
        _input: &EvaluationInput,
    ) -> Result<EvaluationResult, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or(UpstreamError::Rejected {
            status: 502,
            detail: "bad gateway".to_string(),
        })
    }
}

pub(super) fn build_service(
    store: MemoryStore,
    remote: ScriptedEvaluator,
) -> (
    ApprovalRulesService<MemoryStore, ScriptedEvaluator>,
    Arc<MemoryStore>,
    Arc<ScriptedEvaluator>,
) {
    let store = Arc::new(store);
    let remote = Arc::new(remote);
    let service = ApprovalRulesService::new(store.clone(), remote.clone());
    (service, store, remote)
}

pub(super) fn router_with_service(
    service: ApprovalRulesService<MemoryStore, ScriptedEvaluator>,
) -> axum::Router {
    approval_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
