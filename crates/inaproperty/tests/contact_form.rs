//! Integration scenarios for the public contact form.
//!
//! The reCAPTCHA and EmailJS adapters are pointed at a local stand-in provider so the full
//! HTTP path (form-encoded verification, JSON e-mail sends) is exercised end to end.

mod common {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use reqwest::Client;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use inaproperty::config::EmailJsConfig;
    use inaproperty::workflows::contact::{
        contact_router, ContactPolicy, ContactService, EmailJsNotifier, RecaptchaVerifier,
        RiskPolicy,
    };

    #[derive(Clone)]
    pub(super) struct Provider {
        pub(super) score: f64,
        pub(super) failing_template: Option<&'static str>,
        pub(super) sent: Arc<Mutex<Vec<Value>>>,
    }

    impl Provider {
        pub(super) fn scoring(score: f64) -> Self {
            Self {
                score,
                failing_template: None,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(super) fn sent(&self) -> Vec<Value> {
            self.sent.lock().expect("provider mutex poisoned").clone()
        }
    }

    #[derive(Deserialize)]
    struct SiteVerifyForm {
        secret: String,
        response: String,
    }

    async fn siteverify(
        State(provider): State<Provider>,
        Form(form): Form<SiteVerifyForm>,
    ) -> Json<Value> {
        if form.secret != "test-secret" || form.response.is_empty() {
            return Json(json!({ "success": false, "error-codes": ["invalid-input-secret"] }));
        }
        Json(json!({ "success": true, "score": provider.score, "action": "contact" }))
    }

    async fn email_send(
        State(provider): State<Provider>,
        Json(payload): Json<Value>,
    ) -> (StatusCode, String) {
        provider
            .sent
            .lock()
            .expect("provider mutex poisoned")
            .push(payload.clone());
        if provider.failing_template == payload["template_id"].as_str() {
            return (StatusCode::BAD_REQUEST, "The template ID is invalid".to_string());
        }
        (StatusCode::OK, "OK".to_string())
    }

    /// Serve the stand-in provider and return its base URL.
    pub(super) async fn spawn_provider(provider: Provider) -> String {
        let app = Router::new()
            .route("/recaptcha/api/siteverify", post(siteverify))
            .route("/api/v1.0/email/send", post(email_send))
            .with_state(provider);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("provider server");
        });
        format!("http://{addr}")
    }

    pub(super) fn contact_app(base_url: &str) -> Router {
        let client = Client::new();
        let verifier = RecaptchaVerifier::with_endpoint(
            client.clone(),
            "test-secret",
            format!("{base_url}/recaptcha/api/siteverify"),
        );
        let notifier = EmailJsNotifier::with_endpoint(
            client,
            EmailJsConfig {
                service_id: "service_test".to_string(),
                operator_template_id: "template_operator".to_string(),
                acknowledgement_template_id: "template_ack".to_string(),
                public_key: "public_test".to_string(),
                private_key: None,
            },
            format!("{base_url}/api/v1.0/email/send"),
        );
        let policy = ContactPolicy {
            operator_email: "info@inaproperty.co.uk".to_string(),
            risk: RiskPolicy {
                max_risk_score: 0.5,
            },
        };
        contact_router(Arc::new(ContactService::new(
            Arc::new(verifier),
            Arc::new(notifier),
            policy,
        )))
    }
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{contact_app, spawn_provider, Provider};

fn contact_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn visitor_message() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0000",
        "subject": "Viewing",
        "message": "Is the flat on Queen Street still available?",
        "token": "browser-proof",
    })
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn trusted_visitor_triggers_operator_and_acknowledgement_emails() {
    let provider = Provider::scoring(0.9);
    let base_url = spawn_provider(provider.clone()).await;

    let response = contact_app(&base_url)
        .oneshot(contact_request(visitor_message()))
        .await
        .expect("response");
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let sent = provider.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["template_id"], json!("template_operator"));
    assert_eq!(
        sent[0]["template_params"]["to_email"],
        json!("info@inaproperty.co.uk")
    );
    assert_eq!(sent[1]["template_id"], json!("template_ack"));
    assert_eq!(
        sent[1]["template_params"]["to_email"],
        json!("ada@example.com")
    );
    assert_eq!(sent[1]["user_id"], json!("public_test"));
}

#[tokio::test]
async fn low_score_visitor_is_refused_without_emails() {
    let provider = Provider::scoring(0.3);
    let base_url = spawn_provider(provider.clone()).await;

    let response = contact_app(&base_url)
        .oneshot(contact_request(visitor_message()))
        .await
        .expect("response");
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("risk-threshold-exceeded"));
    assert!(provider.sent().is_empty());
}

#[tokio::test]
async fn rejected_operator_email_fails_submission_after_both_attempts() {
    let mut provider = Provider::scoring(0.9);
    provider.failing_template = Some("template_operator");
    let base_url = spawn_provider(provider.clone()).await;

    let response = contact_app(&base_url)
        .oneshot(contact_request(visitor_message()))
        .await
        .expect("response");
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["details"]
        .as_str()
        .expect("details")
        .contains("The template ID is invalid"));
    assert_eq!(provider.sent().len(), 2);
}

#[tokio::test]
async fn missing_message_is_rejected_before_verification() {
    let provider = Provider::scoring(0.9);
    let base_url = spawn_provider(provider.clone()).await;

    let mut message = visitor_message();
    message["message"] = json!("");
    let response = contact_app(&base_url)
        .oneshot(contact_request(message))
        .await
        .expect("response");
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("message is required"));
    assert!(provider.sent().is_empty());
}
