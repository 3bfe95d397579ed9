// ── Central reactive data store ──
//
// Everything the views render lives here, each piece behind its own
// `watch` channel. Readers take cheap `Arc` snapshots or subscribe for
// change notification; only the `Dashboard` writes.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{AuditLogEntry, Entry, Site};

/// Entries and sites from one successful refresh. Always replaced as a pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub sites: Vec<Site>,
    /// Server-reported total, which may exceed `entries.len()`.
    pub total_count: i64,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// State of the entries/sites refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub loading: bool,
    /// Message for the error banner, cleared when the next refresh starts.
    pub error: Option<String>,
}

/// Result of the last `/health` probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ApiHealth {
    #[default]
    Unknown,
    Healthy,
    Unreachable(String),
}

pub struct DataStore {
    pub(crate) snapshot: watch::Sender<Arc<Snapshot>>,
    pub(crate) audit_logs: watch::Sender<Arc<Vec<AuditLogEntry>>>,
    pub(crate) refresh_status: watch::Sender<RefreshStatus>,
    pub(crate) health: watch::Sender<ApiHealth>,
    pub(crate) in_flight: AtomicUsize,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (audit_logs, _) = watch::channel(Arc::new(Vec::new()));
        let (refresh_status, _) = watch::channel(RefreshStatus::default());
        let (health, _) = watch::channel(ApiHealth::default());

        Self {
            snapshot,
            audit_logs,
            refresh_status,
            health,
            in_flight: AtomicUsize::new(0),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn audit_logs(&self) -> Arc<Vec<AuditLogEntry>> {
        self.audit_logs.borrow().clone()
    }

    pub fn refresh_status(&self) -> RefreshStatus {
        self.refresh_status.borrow().clone()
    }

    pub fn health(&self) -> ApiHealth {
        self.health.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    pub fn subscribe_audit_logs(&self) -> watch::Receiver<Arc<Vec<AuditLogEntry>>> {
        self.audit_logs.subscribe()
    }

    pub fn subscribe_refresh_status(&self) -> watch::Receiver<RefreshStatus> {
        self.refresh_status.subscribe()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<ApiHealth> {
        self.health.subscribe()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn entry_by_id(&self, id: &str) -> Option<Entry> {
        self.snapshot.borrow().entries.iter().find(|e| e.id == id).cloned()
    }
}
