use async_trait::async_trait;

use super::domain::{BotVerdict, Notification};

/// Human/automation detection provider.
#[async_trait]
pub trait BotVerificationGateway: Send + Sync {
    async fn verify(&self, token: &str) -> Result<BotVerdict, VerificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("bot verification is not configured")]
    Misconfigured,
    #[error("bot verification unavailable: {0}")]
    Transport(String),
}

impl VerificationError {
    /// Stable code returned to browsers.
    pub const fn code(&self) -> &'static str {
        match self {
            VerificationError::Misconfigured => "server-misconfigured",
            VerificationError::Transport(_) => "server-error",
        }
    }
}

/// Outbound templated message provider (e-mail in production).
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification rejected by provider ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Verifier used when no provider secret is configured; every call reports misconfiguration.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredVerifier;

#[async_trait]
impl BotVerificationGateway for UnconfiguredVerifier {
    async fn verify(&self, _token: &str) -> Result<BotVerdict, VerificationError> {
        Err(VerificationError::Misconfigured)
    }
}
