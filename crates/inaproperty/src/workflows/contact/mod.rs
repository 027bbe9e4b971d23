//! Public contact form: bot verification, risk policy, and the two outbound e-mails.

pub mod domain;
pub mod emailjs;
pub mod gateway;
pub mod recaptcha;
pub mod router;
pub mod service;

pub use domain::{
    BotVerdict, ContactReceipt, ContactSubmission, Notification, NotificationTemplate,
    RiskPolicy, RISK_THRESHOLD_EXCEEDED,
};
pub use emailjs::EmailJsNotifier;
pub use gateway::{
    BotVerificationGateway, NotificationError, NotificationGateway, UnconfiguredVerifier,
    VerificationError,
};
pub use recaptcha::RecaptchaVerifier;
pub use router::{contact_router, VerifyRequest};
pub use service::{ContactError, ContactPolicy, ContactService};
