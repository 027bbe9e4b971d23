use crate::infra::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use inaproperty::workflows::console::{
    render_html, AdminConsole, ServiceConsoleBackend, DECIDE_PATH,
};
use inaproperty::workflows::contact::{contact_router, ContactService};
use inaproperty::workflows::requests::{
    request_router, Decision, RequestDeskService, RequestId, RequestKind, RequestRepository,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminQuery {
    #[serde(default)]
    pub(crate) tab: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionForm {
    pub(crate) kind: String,
    pub(crate) id: String,
    pub(crate) decision: String,
}

/// Full application surface: JSON API, admin page, and operational endpoints.
pub(crate) fn app_router<R>(
    requests: Arc<RequestDeskService<R>>,
    contact: Arc<ContactService>,
) -> Router
where
    R: RequestRepository + 'static,
{
    let admin = Router::new()
        .route("/admin", get(admin_page::<R>))
        .route(DECIDE_PATH, post(admin_decide::<R>))
        .with_state(requests.clone());

    request_router(requests)
        .merge(contact_router(contact))
        .merge(admin)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn admin_page<R>(
    State(service): State<Arc<RequestDeskService<R>>>,
    Query(query): Query<AdminQuery>,
) -> Html<String>
where
    R: RequestRepository + 'static,
{
    let mut console = AdminConsole::new(ServiceConsoleBackend::new(service));
    if let Some(kind) = query.tab.as_deref().and_then(RequestKind::from_slug) {
        console.select_tab(kind);
    }
    console.refresh().await;
    Html(render_html(&console.view()))
}

async fn admin_decide<R>(
    State(service): State<Arc<RequestDeskService<R>>>,
    Form(form): Form<DecisionForm>,
) -> Response
where
    R: RequestRepository + 'static,
{
    let Some(kind) = RequestKind::from_slug(&form.kind) else {
        return (StatusCode::BAD_REQUEST, "unknown request kind").into_response();
    };
    let decision = match form.decision.as_str() {
        "approve" => Decision::Approve,
        "reject" => Decision::Reject,
        _ => return (StatusCode::BAD_REQUEST, "unknown decision").into_response(),
    };

    let mut console = AdminConsole::new(ServiceConsoleBackend::new(service));
    console.decide(kind, &RequestId(form.id), decision).await;

    Redirect::to(&format!("/admin?tab={}", kind.slug())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryRequestRepository, OutboxNotifier, StaticVerifier};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use inaproperty::workflows::contact::{BotVerdict, ContactPolicy, RiskPolicy};
    use inaproperty::workflows::requests::{IndividualSubmission, RequestSubmission};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        requests: Arc<RequestDeskService<InMemoryRequestRepository>>,
        readiness: Arc<AtomicBool>,
    }

    fn harness() -> Harness {
        let requests = Arc::new(RequestDeskService::new(Arc::new(
            InMemoryRequestRepository::default(),
        )));
        let contact = Arc::new(ContactService::new(
            Arc::new(StaticVerifier(BotVerdict::passed(Some(0.9)))),
            Arc::new(OutboxNotifier::default()),
            ContactPolicy {
                operator_email: "info@inaproperty.co.uk".to_string(),
                risk: RiskPolicy {
                    max_risk_score: 0.5,
                },
            },
        ));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let readiness = Arc::new(AtomicBool::new(false));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(handle),
        };
        let router = app_router(requests.clone(), contact).layer(Extension(state));
        Harness {
            router,
            requests,
            readiness,
        }
    }

    fn submit_jane(requests: &RequestDeskService<InMemoryRequestRepository>) -> RequestId {
        requests
            .submit(RequestSubmission::Individual(IndividualSubmission::new(
                "Jane",
                "Smith",
                "jane@example.com",
                Some("south_zone".to_string()),
            )))
            .expect("submitted")
            .id
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        harness.readiness.store(true, Ordering::Release);
        let response = harness
            .router
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = harness()
            .router
            .oneshot(get_request("/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn admin_page_lists_selected_tab() {
        let harness = harness();
        submit_jane(&harness.requests);

        let response = harness
            .router
            .oneshot(get_request("/admin?tab=individual"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Individual Requests (1)"));
        assert!(html.contains("Jane Smith"));
        assert!(html.contains("Zone: south_zone"));
        assert!(html.contains("value=\"approve\""));
    }

    #[tokio::test]
    async fn admin_decision_form_redirects_back_to_tab() {
        let harness = harness();
        let id = submit_jane(&harness.requests);

        let request = Request::builder()
            .method("POST")
            .uri(DECIDE_PATH)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "kind=individual&id={}&decision=approve",
                id
            )))
            .expect("request");
        let response = harness.router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/admin?tab=individual"
        );
        let record = harness
            .requests
            .get(RequestKind::Individual, &id)
            .expect("record");
        assert_eq!(record.status.label(), "approved");
    }

    #[tokio::test]
    async fn admin_decision_form_rejects_unknown_kind() {
        let request = Request::builder()
            .method("POST")
            .uri(DECIDE_PATH)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("kind=company&id=abc&decision=approve"))
            .expect("request");
        let response = harness().router.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
