use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::ContactSubmission;
use super::service::{ContactError, ContactService};

/// Router exposing the contact relay and the standalone proof check.
pub fn contact_router(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/verify-recaptcha", post(verify_proof))
        .with_state(service)
}

/// Body accepted by the standalone verification endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default, alias = "recaptchaToken")]
    pub token: Option<String>,
}

async fn submit_contact(
    State(service): State<Arc<ContactService>>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.submit(submission).await {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "message": "Message sent successfully",
                "notificationsSent": receipt.notifications_sent,
                "score": receipt.score,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => contact_failure(err),
    }
}

async fn verify_proof(
    State(service): State<Arc<ContactService>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let verdict = match service.verify_token(request.token.as_deref()).await {
        Ok(verdict) => verdict,
        Err(err) => return contact_failure(err),
    };

    match service.policy().risk.assess(&verdict) {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "score": verdict.score,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(code) => contact_failure(ContactError::Rejected(code)),
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "error": error.into(),
    });
    (status, Json(payload)).into_response()
}

fn contact_failure(err: ContactError) -> Response {
    match err {
        ContactError::MissingField(_) | ContactError::MissingToken => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        ContactError::Verification(ref inner) => {
            error!(error = %inner, "bot verification failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, inner.code())
        }
        // A refused proof is an ordinary outcome for the browser, not a transport failure.
        ContactError::Rejected(code) => failure(StatusCode::OK, code),
        ContactError::Delivery { ref failures } => {
            error!(?failures, "contact notifications failed");
            let payload = json!({
                "success": false,
                "error": err.to_string(),
                "details": failures.join("; "),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
