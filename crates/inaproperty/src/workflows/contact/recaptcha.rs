use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::domain::BotVerdict;
use super::gateway::{BotVerificationGateway, VerificationError};

pub const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Google reCAPTCHA `siteverify` client. Works for both v2 checkbox and v3 score tokens.
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, secret: impl Into<String>) -> Self {
        Self::with_endpoint(client, secret, SITEVERIFY_URL)
    }

    pub fn with_endpoint(
        client: Client,
        secret: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            secret: secret.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl std::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl From<SiteVerifyResponse> for BotVerdict {
    fn from(response: SiteVerifyResponse) -> Self {
        BotVerdict {
            success: response.success,
            score: response.score,
            error_codes: response.error_codes,
        }
    }
}

#[async_trait]
impl BotVerificationGateway for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<BotVerdict, VerificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                warn!(error = %err, "reCAPTCHA request failed");
                VerificationError::Transport(err.to_string())
            })?;

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|err| VerificationError::Transport(err.to_string()))?;

        debug!(
            success = body.success,
            score = ?body.score,
            action = ?body.action,
            "reCAPTCHA verdict received"
        );
        Ok(body.into())
    }
}
