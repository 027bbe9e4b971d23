use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_OPERATOR_EMAIL: &str = "info@inaproperty.co.uk";
pub const DEFAULT_MAX_RISK_SCORE: f64 = 0.5;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub contact: ContactConfig,
    pub recaptcha: RecaptchaConfig,
    pub emailjs: Option<EmailJsConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let operator_email = optional_var("CONTACT_OPERATOR_EMAIL")
            .unwrap_or_else(|| DEFAULT_OPERATOR_EMAIL.to_string());

        let max_risk_score = match optional_var("RECAPTCHA_MAX_RISK") {
            Some(raw) => parse_risk_score(&raw)?,
            None => DEFAULT_MAX_RISK_SCORE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            contact: ContactConfig { operator_email },
            recaptcha: RecaptchaConfig {
                secret_key: optional_var("RECAPTCHA_SECRET_KEY"),
                max_risk_score,
            },
            emailjs: EmailJsConfig::from_env()?,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_risk_score(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidRiskThreshold(raw.to_string()))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidRiskThreshold(raw.to_string()))
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where operator-facing contact notifications go.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub operator_email: String,
}

/// Bot verification settings. A missing secret leaves verification unconfigured.
#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    pub secret_key: Option<String>,
    pub max_risk_score: f64,
}

/// EmailJS credentials and template identifiers.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub operator_template_id: String,
    pub acknowledgement_template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
}

impl EmailJsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let required = [
            ("EMAILJS_SERVICE_ID", optional_var("EMAILJS_SERVICE_ID")),
            (
                "EMAILJS_TEMPLATE_ID_ADMIN",
                optional_var("EMAILJS_TEMPLATE_ID_ADMIN"),
            ),
            (
                "EMAILJS_CONFIRM_TEMPLATE_ID",
                optional_var("EMAILJS_CONFIRM_TEMPLATE_ID"),
            ),
            ("EMAILJS_PUBLIC_KEY", optional_var("EMAILJS_PUBLIC_KEY")),
        ];

        if required.iter().all(|(_, value)| value.is_none()) {
            return Ok(None);
        }

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::IncompleteEmailJs { missing });
        }

        let [service_id, operator_template_id, acknowledgement_template_id, public_key] =
            required.map(|(_, value)| value.unwrap_or_default());

        Ok(Some(Self {
            service_id,
            operator_template_id,
            acknowledgement_template_id,
            public_key,
            private_key: optional_var("EMAILJS_PRIVATE_KEY"),
        }))
    }
}

impl fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("service_id", &self.service_id)
            .field("operator_template_id", &self.operator_template_id)
            .field(
                "acknowledgement_template_id",
                &self.acknowledgement_template_id,
            )
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRiskThreshold(String),
    IncompleteEmailJs { missing: Vec<&'static str> },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRiskThreshold(value) => write!(
                f,
                "RECAPTCHA_MAX_RISK must be a number between 0.0 and 1.0 (got '{value}')"
            ),
            ConfigError::IncompleteEmailJs { missing } => write!(
                f,
                "EmailJS is partially configured; missing {}",
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRiskThreshold(_)
            | ConfigError::IncompleteEmailJs { .. } => None,
        }
    }
}
