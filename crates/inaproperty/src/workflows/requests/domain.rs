use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the persistence gateway when a request is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two kinds of account request. Each kind lives in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    University,
    Individual,
}

impl RequestKind {
    pub const ALL: [RequestKind; 2] = [RequestKind::University, RequestKind::Individual];

    pub const fn collection(self) -> &'static str {
        match self {
            RequestKind::University => "universityRequests",
            RequestKind::Individual => "individualRequests",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            RequestKind::University => "university",
            RequestKind::Individual => "individual",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequestKind::University => "University",
            RequestKind::Individual => "Individual",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "university" => Some(RequestKind::University),
            "individual" => Some(RequestKind::Individual),
            _ => None,
        }
    }
}

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Outcome an admin applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn target_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }

    pub const fn verb(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    pub const fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

/// Submitted fields for a university account request.
///
/// `status` and `createdAt` are managed by the server; clients that echo them back have the
/// values dropped. Any other unknown field is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UniversitySubmission {
    pub university_name: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, rename = "status")]
    _status: Option<IgnoredAny>,
    #[serde(default, rename = "createdAt")]
    _created_at: Option<IgnoredAny>,
}

impl UniversitySubmission {
    pub fn new(
        university_name: impl Into<String>,
        contact_name: impl Into<String>,
        contact_email: impl Into<String>,
        zone: Option<String>,
    ) -> Self {
        Self {
            university_name: university_name.into(),
            contact_name: contact_name.into(),
            contact_email: contact_email.into(),
            zone,
            _status: None,
            _created_at: None,
        }
    }
}

/// Submitted fields for an individual account request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndividualSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, rename = "status")]
    _status: Option<IgnoredAny>,
    #[serde(default, rename = "createdAt")]
    _created_at: Option<IgnoredAny>,
}

impl IndividualSubmission {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        zone: Option<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            zone,
            _status: None,
            _created_at: None,
        }
    }
}

/// A typed submission; the variant is chosen by the endpoint, never by the body.
#[derive(Debug, Clone)]
pub enum RequestSubmission {
    University(UniversitySubmission),
    Individual(IndividualSubmission),
}

impl RequestSubmission {
    /// Parse an untyped JSON body into the variant selected by `kind`.
    pub fn from_json(
        kind: RequestKind,
        body: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        match kind {
            RequestKind::University => serde_json::from_value(body).map(Self::University),
            RequestKind::Individual => serde_json::from_value(body).map(Self::Individual),
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            RequestSubmission::University(_) => RequestKind::University,
            RequestSubmission::Individual(_) => RequestKind::Individual,
        }
    }

    /// Split into the stored detail fields and the zone tag.
    pub fn into_parts(self) -> (RequestDetails, Option<String>) {
        match self {
            RequestSubmission::University(submission) => (
                RequestDetails::University(UniversityDetails {
                    university_name: submission.university_name,
                    contact_name: submission.contact_name,
                    contact_email: submission.contact_email,
                }),
                submission.zone,
            ),
            RequestSubmission::Individual(submission) => (
                RequestDetails::Individual(IndividualDetails {
                    first_name: submission.first_name,
                    last_name: submission.last_name,
                    email: submission.email,
                }),
                submission.zone,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityDetails {
    pub university_name: String,
    pub contact_name: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Variant-specific fields, flattened into the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestDetails {
    University(UniversityDetails),
    Individual(IndividualDetails),
}

impl RequestDetails {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestDetails::University(_) => RequestKind::University,
            RequestDetails::Individual(_) => RequestKind::Individual,
        }
    }

    /// Primary heading shown for the request in the console.
    pub fn display_name(&self) -> String {
        match self {
            RequestDetails::University(details) => details.university_name.clone(),
            RequestDetails::Individual(details) => {
                format!("{} {}", details.first_name, details.last_name)
            }
        }
    }

    pub fn contact_email(&self) -> &str {
        match self {
            RequestDetails::University(details) => &details.contact_email,
            RequestDetails::Individual(details) => &details.email,
        }
    }
}

/// A request before the persistence gateway assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub details: RequestDetails,
    pub zone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RequestDraft {
    pub fn kind(&self) -> RequestKind {
        self.details.kind()
    }

    pub fn into_record(self, id: RequestId) -> RequestRecord {
        RequestRecord {
            id,
            status: RequestStatus::Pending,
            created_at: self.created_at,
            decided_at: None,
            approved_at: None,
            rejected_at: None,
            zone: self.zone,
            details: self.details,
        }
    }
}

/// Stored request document as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RequestId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(flatten)]
    pub details: RequestDetails,
}

impl RequestRecord {
    pub fn kind(&self) -> RequestKind {
        self.details.kind()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Apply a decision as a field update. Any current status is overwritten.
    pub fn apply_decision(&mut self, decision: Decision, at: DateTime<Utc>) {
        self.status = decision.target_status();
        self.decided_at = Some(at);
        match decision {
            Decision::Approve => self.approved_at = Some(at),
            Decision::Reject => self.rejected_at = Some(at),
        }
    }
}
