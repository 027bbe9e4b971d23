use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    BotVerdict, ContactReceipt, ContactSubmission, Notification, NotificationTemplate, RiskPolicy,
};
use super::gateway::{BotVerificationGateway, NotificationGateway, VerificationError};

/// Settings for the contact relay.
#[derive(Debug, Clone)]
pub struct ContactPolicy {
    pub operator_email: String,
    pub risk: RiskPolicy,
}

/// Verifies contact-form proofs and relays accepted messages to the operator and visitor.
pub struct ContactService {
    verifier: Arc<dyn BotVerificationGateway>,
    notifier: Arc<dyn NotificationGateway>,
    policy: ContactPolicy,
}

impl ContactService {
    pub fn new(
        verifier: Arc<dyn BotVerificationGateway>,
        notifier: Arc<dyn NotificationGateway>,
        policy: ContactPolicy,
    ) -> Self {
        Self {
            verifier,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &ContactPolicy {
        &self.policy
    }

    /// Check a proof token with the provider without applying the risk policy.
    pub async fn verify_token(&self, token: Option<&str>) -> Result<BotVerdict, ContactError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ContactError::MissingToken)?;
        let verdict = self.verifier.verify(token).await?;
        Ok(verdict)
    }

    /// Verify the proof then send the operator alert and the visitor acknowledgement.
    ///
    /// Both sends are attempted in order; the submission only succeeds when both do.
    pub async fn submit(
        &self,
        submission: ContactSubmission,
    ) -> Result<ContactReceipt, ContactError> {
        if let Some(field) = submission.first_missing_field() {
            return Err(ContactError::MissingField(field));
        }

        let verdict = self.verify_token(submission.proof_token()).await?;
        if let Err(code) = self.policy.risk.assess(&verdict) {
            info!(
                %code,
                risk = ?verdict.risk_score(),
                "contact submission refused by bot verification"
            );
            return Err(ContactError::Rejected(code));
        }

        let visitor_email = submission.email.trim().to_string();
        let outbound = [
            Notification {
                template: NotificationTemplate::OperatorAlert,
                to: self.policy.operator_email.clone(),
                params: submission.template_params(&self.policy.operator_email),
            },
            Notification {
                template: NotificationTemplate::VisitorAcknowledgement,
                to: visitor_email.clone(),
                params: submission.template_params(&visitor_email),
            },
        ];

        let mut failures = Vec::new();
        for notification in &outbound {
            if let Err(err) = self.notifier.send(notification).await {
                warn!(
                    template = notification.template.label(),
                    error = %err,
                    "contact notification failed"
                );
                failures.push(format!("{}: {err}", notification.template.label()));
            }
        }

        if !failures.is_empty() {
            return Err(ContactError::Delivery { failures });
        }

        info!(score = ?verdict.score, "contact submission relayed");
        Ok(ContactReceipt {
            notifications_sent: outbound.len(),
            score: verdict.score,
        })
    }
}

/// Error raised by the contact relay.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("missing-token")]
    MissingToken,
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to send email")]
    Delivery { failures: Vec<String> },
}
