use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{Notification, NotificationTemplate};
use super::gateway::{NotificationError, NotificationGateway};
use crate::config::EmailJsConfig;

pub const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS REST client. Templates map onto the configured EmailJS template ids.
pub struct EmailJsNotifier {
    client: Client,
    config: EmailJsConfig,
    endpoint: String,
}

impl EmailJsNotifier {
    pub fn new(client: Client, config: EmailJsConfig) -> Self {
        Self::with_endpoint(client, config, EMAILJS_SEND_URL)
    }

    pub fn with_endpoint(
        client: Client,
        config: EmailJsConfig,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            endpoint: endpoint.into(),
        }
    }

    fn template_id(&self, template: NotificationTemplate) -> &str {
        match template {
            NotificationTemplate::OperatorAlert => &self.config.operator_template_id,
            NotificationTemplate::VisitorAcknowledgement => {
                &self.config.acknowledgement_template_id
            }
        }
    }

    fn payload<'a>(&'a self, notification: &'a Notification) -> EmailJsPayload<'a> {
        EmailJsPayload {
            service_id: &self.config.service_id,
            template_id: self.template_id(notification.template),
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: &notification.params,
        }
    }
}

impl std::fmt::Debug for EmailJsNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsNotifier")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct EmailJsPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a BTreeMap<String, String>,
}

#[async_trait]
impl NotificationGateway for EmailJsNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(notification))
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            debug!(
                template = notification.template.label(),
                "EmailJS accepted notification"
            );
            return Ok(());
        }

        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to send email".to_string());
        warn!(
            template = notification.template.label(),
            status = status.as_u16(),
            %detail,
            "EmailJS rejected notification"
        );
        Err(NotificationError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}
