//! HTTP adapter for the haiCore rules endpoints.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    ApprovalRules, BulkCriteria, ContactRoute, DefaultPosture, EvaluationInput,
    EvaluationResult, ParticipantId, PerRequestRules, RulesPartition,
};
use super::repository::{RemoteEvaluator, RulesStore, UpstreamError};
use crate::config::CoreConfig;
use crate::session::Session;

const PARTICIPANT_HEADER: &str = "x-participant-id";
const API_KEY_HEADER: &str = "x-api-key";
const MAX_ERROR_DETAIL: usize = 512;

#[derive(Clone)]
pub struct CoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for CoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CoreClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Returns `None` when the portal is configured without a core service.
    pub fn from_config(config: &CoreConfig) -> Result<Option<Self>, CoreClientError> {
        config
            .base_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.api_key.clone(), config.timeout))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        session: &Session,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, participant = %session.participant_id, "calling core service");

        let mut builder = self
            .http
            .request(method, url)
            .header(PARTICIPANT_HEADER, session.participant_id.0.as_str());
        if let Some(token) = session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key.as_str());
        }
        builder
    }

    async fn put_partition<T: Serialize + Sync>(
        &self,
        session: &Session,
        partition: RulesPartition,
        body: &T,
    ) -> Result<(), UpstreamError> {
        let path = format!("/rules/{}", partition.segment());
        let response = self
            .request(reqwest::Method::PUT, &path, session)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RulesStore for CoreClient {
    async fn load(&self, session: &Session) -> Result<ApprovalRules, UpstreamError> {
        let response = self
            .request(reqwest::Method::GET, "/rules", session)
            .send()
            .await
            .map_err(transport_error)?;
        let document: CoreRulesDocument = decode(response).await?;
        Ok(document.into())
    }

    async fn save_bulk_criteria(
        &self,
        session: &Session,
        bulk: &BulkCriteria,
    ) -> Result<(), UpstreamError> {
        self.put_partition(session, RulesPartition::BulkCriteria, bulk)
            .await
    }

    async fn save_per_request(
        &self,
        session: &Session,
        rules: &PerRequestRules,
    ) -> Result<(), UpstreamError> {
        self.put_partition(session, RulesPartition::PerRequest, rules)
            .await
    }

    async fn save_contact_route(
        &self,
        session: &Session,
        contact: &ContactRoute,
    ) -> Result<(), UpstreamError> {
        self.put_partition(session, RulesPartition::ContactRoute, contact)
            .await
    }
}

#[async_trait]
impl RemoteEvaluator for CoreClient {
    async fn evaluate(
        &self,
        session: &Session,
        input: &EvaluationInput,
    ) -> Result<EvaluationResult, UpstreamError> {
        let response = self
            .request(reqwest::Method::POST, "/rules/test", session)
            .json(input)
            .send()
            .await
            .map_err(transport_error)?;
        let evaluation: EvaluationResult = decode(response).await?;

        if evaluation.reason.trim().is_empty() {
            return Err(UpstreamError::InvalidResponse(
                "evaluation result is missing a reason".to_string(),
            ));
        }
        Ok(evaluation)
    }
}

// Read-side mirror of `ApprovalRules`. Unknown keys from the core are ignored here; portal
// request bodies keep the strict schema.
#[derive(Deserialize)]
struct CoreRulesDocument {
    bulk_criteria: CoreBulkCriteria,
    per_request: CorePerRequest,
    contact_route: CoreContactRoute,
}

#[derive(Deserialize)]
struct CoreBulkCriteria {
    publicly_traded: bool,
    duns_verified: bool,
    min_score: u8,
    min_years_on_network: u32,
    min_active_trading_pairs: u32,
    allowlist_ids: BTreeSet<ParticipantId>,
}

#[derive(Deserialize)]
struct CorePerRequest {
    min_score: u8,
    allowed_business_types: BTreeSet<String>,
    allowed_regions: BTreeSet<String>,
    blocklist_ids: BTreeSet<ParticipantId>,
    default_posture: DefaultPosture,
}

#[derive(Deserialize)]
struct CoreContactRoute {
    email: String,
    phone: String,
}

impl From<CoreRulesDocument> for ApprovalRules {
    fn from(document: CoreRulesDocument) -> Self {
        let CoreRulesDocument {
            bulk_criteria,
            per_request,
            contact_route,
        } = document;

        Self {
            bulk: BulkCriteria {
                publicly_traded: bulk_criteria.publicly_traded,
                duns_verified: bulk_criteria.duns_verified,
                min_score: bulk_criteria.min_score,
                min_years_on_network: bulk_criteria.min_years_on_network,
                min_active_trading_pairs: bulk_criteria.min_active_trading_pairs,
                allowlist_ids: bulk_criteria.allowlist_ids,
            },
            per_request: PerRequestRules {
                min_score: per_request.min_score,
                allowed_business_types: per_request.allowed_business_types,
                allowed_regions: per_request.allowed_regions,
                blocklist_ids: per_request.blocklist_ids,
                default_posture: per_request.default_posture,
            },
            contact: ContactRoute {
                email: contact_route.email,
                phone: contact_route.phone,
            },
        }
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Unavailable(err.to_string())
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut detail = response.text().await.unwrap_or_default();
    if detail.len() > MAX_ERROR_DETAIL {
        let mut cut = MAX_ERROR_DETAIL;
        while !detail.is_char_boundary(cut) {
            cut -= 1;
        }
        detail.truncate(cut);
    }
    Err(UpstreamError::Rejected {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, UpstreamError> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| UpstreamError::InvalidResponse(err.to_string()))
}

/// Raised when the HTTP client itself cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum CoreClientError {
    #[error("failed to build core service client: {0}")]
    Build(#[from] reqwest::Error),
}
