use chrono::{DateTime, Utc};

use super::domain::{Decision, RequestDraft, RequestId, RequestKind, RequestRecord};

/// Document store seam. Each [`RequestKind`] maps to its own collection.
///
/// Implementations assign ids on insert and must return listings ordered by
/// `created_at`, newest first.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, draft: RequestDraft) -> Result<RequestRecord, RepositoryError>;
    fn fetch(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<Option<RequestRecord>, RepositoryError>;
    fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, RepositoryError>;
    /// Single-document field update writing the decision status and stamps.
    fn record_decision(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
        at: DateTime<Utc>,
    ) -> Result<RequestRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("request not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Orders records newest first, the listing contract every repository honors.
pub fn sort_newest_first(records: &mut [RequestRecord]) {
    records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
}

/// Source of submission and decision timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
