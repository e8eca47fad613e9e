use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::domain::{BulkCriteria, ContactRoute, EvaluationInput, PerRequestRules};
use super::repository::{RemoteEvaluator, RulesStore};
use super::service::{authorize, ApprovalRulesService, ApprovalServiceError};
use crate::session::{PortalAction, Session, SessionError, SessionView};

/// Router builder exposing the portal's session and approval-rule endpoints.
pub fn approval_router<S, E>(service: Arc<ApprovalRulesService<S, E>>) -> Router
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    Router::new()
        .route("/api/v1/session", get(session_handler))
        .route("/api/v1/approval-rules", get(rules_handler::<S, E>))
        .route(
            "/api/v1/approval-rules/bulk_criteria",
            put(bulk_criteria_handler::<S, E>),
        )
        .route(
            "/api/v1/approval-rules/per_request",
            put(per_request_handler::<S, E>),
        )
        .route(
            "/api/v1/approval-rules/contact_route",
            put(contact_route_handler::<S, E>),
        )
        .route("/api/v1/approval-rules/test", post(test_handler::<S, E>))
        .with_state(service)
}

pub(crate) async fn session_handler(headers: HeaderMap) -> Response {
    match Session::from_headers(&headers) {
        Ok(session) => (StatusCode::OK, Json(SessionView::from(&session))).into_response(),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn rules_handler<S, E>(
    State(service): State<Arc<ApprovalRulesService<S, E>>>,
    headers: HeaderMap,
) -> Response
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    let session = match Session::from_headers(&headers) {
        Ok(session) => session,
        Err(error) => return unauthorized(error),
    };

    match service.rules(&session).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn bulk_criteria_handler<S, E>(
    State(service): State<Arc<ApprovalRulesService<S, E>>>,
    headers: HeaderMap,
    body: Result<Json<BulkCriteria>, JsonRejection>,
) -> Response
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    let session = match gate(&headers, PortalAction::EditRules) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let bulk = match payload(body) {
        Ok(bulk) => bulk,
        Err(response) => return response,
    };

    match service.update_bulk_criteria(&session, bulk).await {
        Ok(saved) => (StatusCode::OK, Json(json!({ "bulk_criteria": saved }))).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn per_request_handler<S, E>(
    State(service): State<Arc<ApprovalRulesService<S, E>>>,
    headers: HeaderMap,
    body: Result<Json<PerRequestRules>, JsonRejection>,
) -> Response
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    let session = match gate(&headers, PortalAction::EditRules) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let rules = match payload(body) {
        Ok(rules) => rules,
        Err(response) => return response,
    };

    match service.update_per_request(&session, rules).await {
        Ok(saved) => (StatusCode::OK, Json(json!({ "per_request": saved }))).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn contact_route_handler<S, E>(
    State(service): State<Arc<ApprovalRulesService<S, E>>>,
    headers: HeaderMap,
    body: Result<Json<ContactRoute>, JsonRejection>,
) -> Response
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    let session = match gate(&headers, PortalAction::EditRules) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let contact = match payload(body) {
        Ok(contact) => contact,
        Err(response) => return response,
    };

    match service.update_contact_route(&session, contact).await {
        Ok(saved) => (StatusCode::OK, Json(json!({ "contact_route": saved }))).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn test_handler<S, E>(
    State(service): State<Arc<ApprovalRulesService<S, E>>>,
    headers: HeaderMap,
    body: Result<Json<EvaluationInput>, JsonRejection>,
) -> Response
where
    S: RulesStore + 'static,
    E: RemoteEvaluator + 'static,
{
    let session = match gate(&headers, PortalAction::TestRules) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let input = match payload(body) {
        Ok(input) => input,
        Err(response) => return response,
    };

    // The response shape is identical for remote and local decisions.
    match service.test_rules(&session, input).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.evaluation)).into_response(),
        Err(error) => service_error(error),
    }
}

/// Resolves the caller and checks the role before any request body is inspected.
fn gate(headers: &HeaderMap, action: PortalAction) -> Result<Session, Response> {
    let session = Session::from_headers(headers).map_err(unauthorized)?;
    authorize(&session, action).map_err(service_error)?;
    Ok(session)
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        let payload = json!({
            "error": rejection.body_text(),
        });
        (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
    })
}

fn unauthorized(error: SessionError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

fn service_error(error: ApprovalServiceError) -> Response {
    let status = match &error {
        ApprovalServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ApprovalServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApprovalServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
