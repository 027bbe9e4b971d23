use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::backend::ConsoleBackend;
use crate::workflows::requests::{Decision, RequestId, RequestKind, RequestRecord, RequestStatus};

/// Admin view over both request collections.
///
/// Holds no authoritative state: every refresh replaces both listings wholesale, and every
/// decision is followed by a refresh.
pub struct AdminConsole<B> {
    backend: B,
    active: RequestKind,
    university: Vec<RequestRecord>,
    individual: Vec<RequestRecord>,
}

impl<B> AdminConsole<B>
where
    B: ConsoleBackend,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: RequestKind::University,
            university: Vec::new(),
            individual: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn active_tab(&self) -> RequestKind {
        self.active
    }

    pub fn select_tab(&mut self, kind: RequestKind) {
        self.active = kind;
    }

    pub fn requests(&self, kind: RequestKind) -> &[RequestRecord] {
        match kind {
            RequestKind::University => &self.university,
            RequestKind::Individual => &self.individual,
        }
    }

    /// Re-fetch both listings. A failed listing is shown as empty.
    pub async fn refresh(&mut self) {
        for kind in RequestKind::ALL {
            let records = match self.backend.list(kind).await {
                Ok(records) => records,
                Err(err) => {
                    warn!(collection = kind.collection(), error = %err, "listing failed");
                    Vec::new()
                }
            };
            debug!(collection = kind.collection(), count = records.len(), "console refreshed");
            match kind {
                RequestKind::University => self.university = records,
                RequestKind::Individual => self.individual = records,
            }
        }
    }

    /// Send a decision then refresh. Failures are logged and otherwise ignored; the return
    /// value only reports whether the backend accepted the call.
    pub async fn decide(
        &mut self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> bool {
        let applied = match self.backend.decide(kind, id, decision).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    collection = kind.collection(),
                    %id,
                    decision = decision.verb(),
                    error = %err,
                    "decision failed"
                );
                false
            }
        };
        self.refresh().await;
        applied
    }

    /// Snapshot of the active tab ready for rendering.
    pub fn view(&self) -> ConsoleView {
        let tabs = RequestKind::ALL
            .into_iter()
            .map(|kind| TabSummary {
                kind,
                label: format!("{} Requests ({})", kind.label(), self.requests(kind).len()),
                active: kind == self.active,
            })
            .collect();

        let rows: Vec<ConsoleRow> = self
            .requests(self.active)
            .iter()
            .map(ConsoleRow::from_record)
            .collect();

        let empty_message = rows.is_empty().then(|| empty_message(self.active));

        ConsoleView {
            active: self.active,
            tabs,
            rows,
            empty_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleView {
    pub active: RequestKind,
    pub tabs: Vec<TabSummary>,
    pub rows: Vec<ConsoleRow>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub kind: RequestKind,
    pub label: String,
    pub active: bool,
}

/// One request as displayed in a tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleRow {
    pub kind: RequestKind,
    pub id: RequestId,
    pub title: String,
    pub contact: String,
    pub status: RequestStatus,
    pub submitted: DateTime<Utc>,
    pub zone: Option<String>,
    /// Decisions offered for the row; empty unless the request is pending.
    pub actions: Vec<Decision>,
}

impl ConsoleRow {
    fn from_record(record: &RequestRecord) -> Self {
        let actions = if record.is_pending() {
            vec![Decision::Approve, Decision::Reject]
        } else {
            Vec::new()
        };
        Self {
            kind: record.kind(),
            id: record.id.clone(),
            title: record.details.display_name(),
            contact: record.details.contact_email().to_string(),
            status: record.status,
            submitted: record.created_at,
            zone: record.zone.clone(),
            actions,
        }
    }

    pub fn submitted_on(&self) -> String {
        self.submitted.format("%Y-%m-%d").to_string()
    }
}

pub fn status_badge(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "Pending",
        RequestStatus::Approved => "Approved",
        RequestStatus::Rejected => "Rejected",
    }
}

pub fn empty_message(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::University => "No university requests found",
        RequestKind::Individual => "No individual requests found",
    }
}
