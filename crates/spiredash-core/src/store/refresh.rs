// ── Refresh application logic ──
//
// Server collections are replaced wholesale: last successful fetch wins,
// nothing is merged. Overlapping refreshes are counted so `loading`
// stays up until the last one lands.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;

use super::{ApiHealth, DataStore, RefreshStatus, Snapshot};
use crate::model::{AuditLogEntry, Entry, Site};

impl DataStore {
    /// Publish a new entries/sites pair in a single send.
    pub(crate) fn apply_snapshot(&self, entries: Vec<Entry>, sites: Vec<Site>, total_count: i64) {
        self.snapshot.send_replace(Arc::new(Snapshot {
            entries,
            sites,
            total_count,
            fetched_at: Some(Utc::now()),
        }));
    }

    pub(crate) fn apply_audit_logs(&self, logs: Vec<AuditLogEntry>) {
        self.audit_logs.send_replace(Arc::new(logs));
    }

    pub(crate) fn set_health(&self, health: ApiHealth) {
        self.health.send_replace(health);
    }

    /// Mark a refresh as started; clears any previous error.
    pub(crate) fn begin_refresh(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.refresh_status.send_replace(RefreshStatus {
            loading: true,
            error: None,
        });
    }

    /// Mark a refresh as finished. An error is kept even if a later
    /// overlapping refresh is still in flight.
    pub(crate) fn finish_refresh(&self, error: Option<String>) {
        let remaining = self
            .in_flight
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);
        self.refresh_status.send_modify(|status| {
            status.loading = remaining > 0;
            if error.is_some() {
                status.error = error;
            }
        });
    }
}
