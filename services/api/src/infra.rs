use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inaproperty::config::AppConfig;
use inaproperty::error::AppError;
use inaproperty::workflows::contact::{
    BotVerdict, BotVerificationGateway, ContactPolicy, ContactService, EmailJsNotifier,
    Notification, NotificationError, NotificationGateway, RecaptchaVerifier, RiskPolicy,
    UnconfiguredVerifier, VerificationError,
};
use inaproperty::workflows::requests::{
    sort_newest_first, Decision, RepositoryError, RequestDraft, RequestId, RequestKind,
    RequestRecord, RequestRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type Collections = HashMap<RequestKind, Vec<RequestRecord>>;

/// Process-local document store. Each kind is its own collection; ids are random UUIDs.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestRepository {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryRequestRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.collections
            .lock()
            .map_err(|_| RepositoryError::Unavailable("request store lock poisoned".to_string()))
    }
}

impl RequestRepository for InMemoryRequestRepository {
    fn insert(&self, draft: RequestDraft) -> Result<RequestRecord, RepositoryError> {
        let kind = draft.kind();
        let record = draft.into_record(RequestId(Uuid::new_v4().simple().to_string()));
        self.lock()?.entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<Option<RequestRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&kind)
            .and_then(|records| records.iter().find(|record| &record.id == id))
            .cloned())
    }

    fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, RepositoryError> {
        let mut records = self.lock()?.get(&kind).cloned().unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn record_decision(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
        at: DateTime<Utc>,
    ) -> Result<RequestRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|record| &record.id == id))
            .ok_or(RepositoryError::NotFound)?;
        record.apply_decision(decision, at);
        Ok(record.clone())
    }
}

/// Notifier used when EmailJS is not configured. Sends are logged and kept for inspection.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl OutboxNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationGateway for OutboxNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        info!(
            template = notification.template.label(),
            to = %notification.to,
            "email provider not configured; notification kept in outbox"
        );
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

/// Verifier returning a fixed verdict, used by the offline demo.
#[derive(Debug, Clone)]
pub(crate) struct StaticVerifier(pub(crate) BotVerdict);

#[async_trait]
impl BotVerificationGateway for StaticVerifier {
    async fn verify(&self, _token: &str) -> Result<BotVerdict, VerificationError> {
        Ok(self.0.clone())
    }
}

pub(crate) fn http_client() -> Result<Client, AppError> {
    let client = Client::builder()
        .user_agent(concat!("inaproperty/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub(crate) fn contact_policy(config: &AppConfig) -> ContactPolicy {
    ContactPolicy {
        operator_email: config.contact.operator_email.clone(),
        risk: RiskPolicy {
            max_risk_score: config.recaptcha.max_risk_score,
        },
    }
}

/// Wire the contact service to the configured providers, falling back to the unconfigured
/// verifier and the outbox notifier.
pub(crate) fn build_contact_service(config: &AppConfig, client: Client) -> ContactService {
    let verifier: Arc<dyn BotVerificationGateway> = match &config.recaptcha.secret_key {
        Some(secret) => Arc::new(RecaptchaVerifier::new(client.clone(), secret.clone())),
        None => {
            warn!("RECAPTCHA_SECRET_KEY not set; contact submissions will be refused");
            Arc::new(UnconfiguredVerifier)
        }
    };

    let notifier: Arc<dyn NotificationGateway> = match &config.emailjs {
        Some(emailjs) => Arc::new(EmailJsNotifier::new(client, emailjs.clone())),
        None => {
            warn!("EmailJS not configured; contact notifications go to the log outbox");
            Arc::new(OutboxNotifier::default())
        }
    };

    ContactService::new(verifier, notifier, contact_policy(config))
}

pub(crate) fn parse_kind(raw: &str) -> Result<RequestKind, String> {
    RequestKind::from_slug(raw).ok_or_else(|| {
        format!("unknown request kind '{raw}' (expected university or individual)")
    })
}
