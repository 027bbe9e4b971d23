//! Account request lifecycle: public submission, admin listing, and approve/reject decisions.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Decision, IndividualDetails, IndividualSubmission, RequestDetails, RequestDraft, RequestId,
    RequestKind, RequestRecord, RequestStatus, RequestSubmission, UniversityDetails,
    UniversitySubmission,
};
pub use repository::{sort_newest_first, Clock, RepositoryError, RequestRepository, SystemClock};
pub use router::{request_router, DecisionRequest};
pub use service::{RequestDeskService, RequestServiceError};
