use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    Decision, RequestDraft, RequestId, RequestKind, RequestRecord, RequestSubmission,
};
use super::repository::{Clock, RepositoryError, RequestRepository, SystemClock};

/// Service covering submission, listing, and admin decisions for account requests.
pub struct RequestDeskService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RequestDeskService<R>
where
    R: RequestRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Persist a new pending request, returning the stored record with its assigned id.
    pub fn submit(
        &self,
        submission: RequestSubmission,
    ) -> Result<RequestRecord, RequestServiceError> {
        let kind = submission.kind();
        let (details, zone) = submission.into_parts();
        let draft = RequestDraft {
            details,
            zone,
            created_at: self.clock.now(),
        };

        let record = self.repository.insert(draft).map_err(|err| {
            warn!(collection = kind.collection(), error = %err, "request insert failed");
            err
        })?;

        info!(
            collection = kind.collection(),
            id = %record.id,
            "request submitted"
        );
        Ok(record)
    }

    /// All requests of a kind, newest first. Status filtering is left to callers.
    pub fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, RequestServiceError> {
        let records = self.repository.list(kind)?;
        debug!(
            collection = kind.collection(),
            count = records.len(),
            "requests listed"
        );
        Ok(records)
    }

    /// Apply a decision unconditionally. A request already decided is overwritten.
    pub fn decide(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<RequestRecord, RequestServiceError> {
        if id.0.trim().is_empty() {
            return Err(RequestServiceError::MissingId);
        }

        let record = self
            .repository
            .record_decision(kind, id, decision, self.clock.now())?;

        info!(
            collection = kind.collection(),
            %id,
            status = record.status.label(),
            "request {}",
            decision.past_tense()
        );
        Ok(record)
    }

    pub fn approve(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<RequestRecord, RequestServiceError> {
        self.decide(kind, id, Decision::Approve)
    }

    pub fn reject(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<RequestRecord, RequestServiceError> {
        self.decide(kind, id, Decision::Reject)
    }

    pub fn get(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<RequestRecord, RequestServiceError> {
        let record = self
            .repository
            .fetch(kind, id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the request desk service.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error("Request ID is required")]
    MissingId,
    #[error("invalid request body: {0}")]
    InvalidSubmission(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
