use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Visitor message posted from the public contact form.
///
/// Required text fields default to empty so the service can report which one is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Bot-verification proof obtained by the browser challenge.
    #[serde(default, alias = "recaptchaToken")]
    pub token: Option<String>,
}

impl ContactSubmission {
    /// Name of the first required field that is blank, if any.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("message", self.message.as_str()),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    pub fn proof_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Template parameters shared by both outbound messages.
    pub fn template_params(&self, to_email: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("user_name".to_string(), self.name.trim().to_string());
        params.insert("user_email".to_string(), self.email.trim().to_string());
        params.insert(
            "user_phone".to_string(),
            self.phone.clone().unwrap_or_default(),
        );
        params.insert(
            "subject".to_string(),
            self.subject.clone().unwrap_or_default(),
        );
        params.insert("message".to_string(), self.message.clone());
        params.insert("to_email".to_string(), to_email.to_string());
        params
    }
}

/// Result reported by the bot-verification provider for a proof token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotVerdict {
    pub success: bool,
    /// Provider's human-likelihood score (1.0 = very likely human). Absent for checkbox
    /// challenges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub error_codes: Vec<String>,
}

impl BotVerdict {
    pub fn passed(score: Option<f64>) -> Self {
        Self {
            success: true,
            score,
            error_codes: Vec::new(),
        }
    }

    pub fn failed(error_codes: Vec<String>) -> Self {
        Self {
            success: false,
            score: None,
            error_codes,
        }
    }

    /// Complement of the provider score, rounded so a configured limit compares exactly.
    pub fn risk_score(&self) -> Option<f64> {
        self.score.map(|score| round_risk((1.0 - score).clamp(0.0, 1.0)))
    }

    pub fn failure_code(&self) -> String {
        self.error_codes
            .first()
            .cloned()
            .unwrap_or_else(|| "verification-failed".to_string())
    }
}

/// Threshold applied to verdicts before any message is sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    /// Highest risk score still admitted. A risk exactly at the limit passes.
    pub max_risk_score: f64,
}

pub const RISK_THRESHOLD_EXCEEDED: &str = "risk-threshold-exceeded";

const RISK_PRECISION: f64 = 1e9;

fn round_risk(value: f64) -> f64 {
    (value * RISK_PRECISION).round() / RISK_PRECISION
}

impl RiskPolicy {
    /// Returns the rejection code when the verdict should not be admitted.
    pub fn assess(&self, verdict: &BotVerdict) -> Result<(), String> {
        if !verdict.success {
            return Err(verdict.failure_code());
        }
        match verdict.risk_score() {
            Some(risk) if risk > round_risk(self.max_risk_score) => {
                Err(RISK_THRESHOLD_EXCEEDED.to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Message templates the notification gateway knows how to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    OperatorAlert,
    VisitorAcknowledgement,
}

impl NotificationTemplate {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationTemplate::OperatorAlert => "operator_alert",
            NotificationTemplate::VisitorAcknowledgement => "visitor_acknowledgement",
        }
    }
}

/// Templated message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: NotificationTemplate,
    pub to: String,
    pub params: BTreeMap<String, String>,
}

/// Summary of a successful contact submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactReceipt {
    pub notifications_sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RiskPolicy {
        RiskPolicy {
            max_risk_score: 0.5,
        }
    }

    #[test]
    fn risk_exactly_at_threshold_is_admitted() {
        let verdict = BotVerdict::passed(Some(0.5));
        assert_eq!(verdict.risk_score(), Some(0.5));
        assert!(policy().assess(&verdict).is_ok());
    }

    #[test]
    fn risk_above_threshold_is_rejected() {
        let verdict = BotVerdict::passed(Some(0.25));
        assert_eq!(
            policy().assess(&verdict),
            Err(RISK_THRESHOLD_EXCEEDED.to_string())
        );
    }

    #[test]
    fn complement_of_configured_limit_is_admitted() {
        let policy = RiskPolicy {
            max_risk_score: 0.3,
        };
        let verdict = BotVerdict::passed(Some(0.7));
        assert_eq!(verdict.risk_score(), Some(0.3));
        assert!(policy.assess(&verdict).is_ok());

        let policy = RiskPolicy {
            max_risk_score: 0.1,
        };
        assert!(policy.assess(&BotVerdict::passed(Some(0.9))).is_ok());
        assert_eq!(
            policy.assess(&BotVerdict::passed(Some(0.89))),
            Err(RISK_THRESHOLD_EXCEEDED.to_string())
        );
    }

    #[test]
    fn score_just_below_complement_is_rejected() {
        let policy = RiskPolicy {
            max_risk_score: 0.3,
        };
        assert_eq!(
            policy.assess(&BotVerdict::passed(Some(0.69))),
            Err(RISK_THRESHOLD_EXCEEDED.to_string())
        );
    }

    #[test]
    fn verdict_without_score_relies_on_success_flag() {
        assert!(policy().assess(&BotVerdict::passed(None)).is_ok());
        assert_eq!(
            policy().assess(&BotVerdict::failed(vec!["timeout-or-duplicate".to_string()])),
            Err("timeout-or-duplicate".to_string())
        );
        assert_eq!(
            policy().assess(&BotVerdict::failed(Vec::new())),
            Err("verification-failed".to_string())
        );
    }

    #[test]
    fn first_missing_field_follows_form_order() {
        let submission = ContactSubmission {
            name: "Ada".to_string(),
            email: "   ".to_string(),
            message: String::new(),
            ..ContactSubmission::default()
        };
        assert_eq!(submission.first_missing_field(), Some("email"));
    }

    #[test]
    fn template_params_fill_optional_fields_with_blanks() {
        let submission = ContactSubmission {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
            ..ContactSubmission::default()
        };
        let params = submission.template_params("info@inaproperty.co.uk");
        assert_eq!(params["user_phone"], "");
        assert_eq!(params["to_email"], "info@inaproperty.co.uk");
    }
}
