use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::requests::domain::{
    Decision, IndividualSubmission, RequestDraft, RequestId, RequestKind, RequestRecord,
    RequestSubmission, UniversitySubmission,
};
use crate::workflows::requests::repository::{
    sort_newest_first, Clock, RepositoryError, RequestRepository,
};
use crate::workflows::requests::{request_router, RequestDeskService};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn jane_smith() -> RequestSubmission {
    RequestSubmission::Individual(IndividualSubmission::new(
        "Jane",
        "Smith",
        "jane@example.com",
        Some("south_zone".to_string()),
    ))
}

pub(super) fn test_university(name: &str) -> RequestSubmission {
    RequestSubmission::University(UniversitySubmission::new(
        name,
        "John Doe",
        "test@university.edu",
        Some("north_zone".to_string()),
    ))
}

/// Clock that hands out scripted offsets from [`base_time`], then keeps stepping forward.
pub(super) struct ScriptedClock {
    offsets: Mutex<Vec<i64>>,
    calls: AtomicUsize,
}

impl ScriptedClock {
    pub(super) fn stepping() -> Self {
        Self::with_offsets(Vec::new())
    }

    /// Minute offsets returned in order on successive `now()` calls.
    pub(super) fn with_offsets(offsets: Vec<i64>) -> Self {
        let mut offsets = offsets;
        offsets.reverse();
        Self {
            offsets: Mutex::new(offsets),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<Utc> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) as i64;
        let scripted = self.offsets.lock().expect("clock mutex poisoned").pop();
        let minutes = scripted.unwrap_or(1_000 + call);
        base_time() + Duration::minutes(minutes)
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    documents: Mutex<HashMap<RequestKind, Vec<RequestRecord>>>,
    sequence: AtomicUsize,
    pub(super) writes: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl RequestRepository for MemoryRepository {
    fn insert(&self, draft: RequestDraft) -> Result<RequestRecord, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let kind = draft.kind();
        let record = draft.into_record(RequestId(format!("req-{id:04}")));
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.documents
            .lock()
            .expect("repository mutex poisoned")
            .entry(kind)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        kind: RequestKind,
        id: &RequestId,
    ) -> Result<Option<RequestRecord>, RepositoryError> {
        let guard = self.documents.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(&kind)
            .and_then(|records| records.iter().find(|record| &record.id == id))
            .cloned())
    }

    fn list(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, RepositoryError> {
        let guard = self.documents.lock().expect("repository mutex poisoned");
        let mut records = guard.get(&kind).cloned().unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn record_decision(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
        at: DateTime<Utc>,
    ) -> Result<RequestRecord, RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|record| &record.id == id))
            .ok_or(RepositoryError::NotFound)?;
        record.apply_decision(decision, at);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(record.clone())
    }
}

pub(super) struct UnavailableRepository;

impl RequestRepository for UnavailableRepository {
    fn insert(&self, _draft: RequestDraft) -> Result<RequestRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _kind: RequestKind,
        _id: &RequestId,
    ) -> Result<Option<RequestRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _kind: RequestKind) -> Result<Vec<RequestRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_decision(
        &self,
        _kind: RequestKind,
        _id: &RequestId,
        _decision: Decision,
        _at: DateTime<Utc>,
    ) -> Result<RequestRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (RequestDeskService<MemoryRepository>, Arc<MemoryRepository>) {
    build_service_with_clock(ScriptedClock::stepping())
}

pub(super) fn build_service_with_clock(
    clock: ScriptedClock,
) -> (RequestDeskService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RequestDeskService::with_clock(repository.clone(), Arc::new(clock));
    (service, repository)
}

pub(super) fn router_with_service(service: RequestDeskService<MemoryRepository>) -> axum::Router {
    request_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(uri: &str, body: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}
