use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::domain::{Decision, RequestId, RequestKind, RequestSubmission};
use super::repository::{RepositoryError, RequestRepository};
use super::service::{RequestDeskService, RequestServiceError};

type Desk<R> = State<Arc<RequestDeskService<R>>>;

/// Router exposing public submission and admin listing/decision endpoints.
pub fn request_router<R>(service: Arc<RequestDeskService<R>>) -> Router
where
    R: RequestRepository + 'static,
{
    Router::new()
        .route("/api/requests/university", post(submit_university::<R>))
        .route("/api/requests/individual", post(submit_individual::<R>))
        .route(
            "/api/admin/university-requests",
            get(list_university::<R>),
        )
        .route(
            "/api/admin/individual-requests",
            get(list_individual::<R>),
        )
        .route(
            "/api/admin/approve-university",
            post(approve_university::<R>),
        )
        .route("/api/admin/reject-university", post(reject_university::<R>))
        .route(
            "/api/admin/approve-individual",
            post(approve_individual::<R>),
        )
        .route("/api/admin/reject-individual", post(reject_individual::<R>))
        .with_state(service)
}

/// Body accepted by the approve/reject endpoints.
///
/// `id` stays raw JSON; anything other than a non-blank string reads as a missing id.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub id: Option<Value>,
}

impl DecisionRequest {
    pub fn request_id(&self) -> Option<RequestId> {
        match &self.id {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(RequestId(id.clone())),
            _ => None,
        }
    }
}

async fn submit_university<R>(
    State(service): Desk<R>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    submit_handler(&service, RequestKind::University, payload)
}

async fn submit_individual<R>(
    State(service): Desk<R>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    submit_handler(&service, RequestKind::Individual, payload)
}

async fn list_university<R>(State(service): Desk<R>) -> Response
where
    R: RequestRepository + 'static,
{
    list_handler(&service, RequestKind::University)
}

async fn list_individual<R>(State(service): Desk<R>) -> Response
where
    R: RequestRepository + 'static,
{
    list_handler(&service, RequestKind::Individual)
}

async fn approve_university<R>(
    State(service): Desk<R>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    decision_handler(&service, RequestKind::University, Decision::Approve, payload)
}

async fn reject_university<R>(
    State(service): Desk<R>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    decision_handler(&service, RequestKind::University, Decision::Reject, payload)
}

async fn approve_individual<R>(
    State(service): Desk<R>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    decision_handler(&service, RequestKind::Individual, Decision::Approve, payload)
}

async fn reject_individual<R>(
    State(service): Desk<R>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    decision_handler(&service, RequestKind::Individual, Decision::Reject, payload)
}

pub(crate) fn submit_handler<R>(
    service: &RequestDeskService<R>,
    kind: RequestKind,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let submission = match RequestSubmission::from_json(kind, body) {
        Ok(submission) => submission,
        Err(err) => {
            let err = RequestServiceError::InvalidSubmission(err.to_string());
            return service_failure(err, &format!("Failed to create {} request", kind.slug()));
        }
    };

    match service.submit(submission) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "id": record.id,
                "message": format!("{} request created successfully", kind.label()),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => service_failure(err, &format!("Failed to create {} request", kind.slug())),
    }
}

pub(crate) fn list_handler<R>(service: &RequestDeskService<R>, kind: RequestKind) -> Response
where
    R: RequestRepository + 'static,
{
    match service.list(kind) {
        Ok(requests) => {
            let payload = json!({
                "success": true,
                "requests": requests,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => service_failure(err, &format!("Failed to fetch {} requests", kind.slug())),
    }
}

pub(crate) fn decision_handler<R>(
    service: &RequestDeskService<R>,
    kind: RequestKind,
    decision: Decision,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: RequestRepository + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let Some(id) = request.request_id() else {
        return service_failure(RequestServiceError::MissingId, "");
    };

    let context = format!("Failed to {} {} request", decision.verb(), kind.slug());
    match service.decide(kind, &id, decision) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "status": record.status,
                "message": format!(
                    "{} request {} successfully",
                    kind.label(),
                    decision.past_tense()
                ),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => service_failure(err, &context),
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "error": error.into(),
    });
    (status, Json(payload)).into_response()
}

fn service_failure(err: RequestServiceError, context: &str) -> Response {
    match err {
        RequestServiceError::MissingId | RequestServiceError::InvalidSubmission(_) => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        RequestServiceError::Repository(RepositoryError::NotFound) => {
            failure(StatusCode::NOT_FOUND, err.to_string())
        }
        RequestServiceError::Repository(RepositoryError::Unavailable(ref details)) => {
            error!(error = %err, "{context}");
            let payload = json!({
                "success": false,
                "error": context,
                "details": details,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
