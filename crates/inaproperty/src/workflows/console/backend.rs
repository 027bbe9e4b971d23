use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::workflows::requests::{
    Decision, RequestDeskService, RequestId, RequestKind, RequestRecord, RequestRepository,
    RequestServiceError,
};

/// Listing and decision calls the admin console relies on.
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    async fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ConsoleError>;
    async fn decide(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<(), ConsoleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Service(#[from] RequestServiceError),
    #[error("request desk unreachable: {0}")]
    Transport(String),
    #[error("request desk returned {status}: {error}")]
    Rejected { status: u16, error: String },
}

/// Backend calling the request desk service in the same process.
pub struct ServiceConsoleBackend<R> {
    service: Arc<RequestDeskService<R>>,
}

impl<R> ServiceConsoleBackend<R>
where
    R: RequestRepository + 'static,
{
    pub fn new(service: Arc<RequestDeskService<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R> ConsoleBackend for ServiceConsoleBackend<R>
where
    R: RequestRepository + 'static,
{
    async fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ConsoleError> {
        Ok(self.service.list(kind)?)
    }

    async fn decide(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<(), ConsoleError> {
        self.service.decide(kind, id, decision)?;
        Ok(())
    }
}

/// Backend speaking to a running server through its JSON API.
#[derive(Debug, Clone)]
pub struct HttpConsoleBackend {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    #[serde(default)]
    requests: Vec<RequestRecord>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpConsoleBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn list_url(&self, kind: RequestKind) -> String {
        format!("{}/api/admin/{}-requests", self.base_url, kind.slug())
    }

    pub fn decision_url(&self, kind: RequestKind, decision: Decision) -> String {
        format!(
            "{}/api/admin/{}-{}",
            self.base_url,
            decision.verb(),
            kind.slug()
        )
    }

    async fn read_envelope(response: reqwest::Response) -> Result<ApiEnvelope, ConsoleError> {
        let status = response.status();
        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|err| ConsoleError::Transport(err.to_string()))?;
        if !status.is_success() || !envelope.success {
            return Err(ConsoleError::Rejected {
                status: status.as_u16(),
                error: envelope
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl ConsoleBackend for HttpConsoleBackend {
    async fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ConsoleError> {
        let response = self
            .client
            .get(self.list_url(kind))
            .send()
            .await
            .map_err(|err| ConsoleError::Transport(err.to_string()))?;
        Ok(Self::read_envelope(response).await?.requests)
    }

    async fn decide(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<(), ConsoleError> {
        let response = self
            .client
            .post(self.decision_url(kind, decision))
            .json(&json!({ "id": id }))
            .send()
            .await
            .map_err(|err| ConsoleError::Transport(err.to_string()))?;
        Self::read_envelope(response).await?;
        Ok(())
    }
}
