// ── Workload entry domain types ──

use std::fmt;

use chrono::{DateTime, Utc};

use super::sync_status::SyncStatus;

/// A `type:value` workload selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Selector {
    pub kind: String,
    pub value: String,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// How one entry is doing on one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatus {
    pub site_id: String,
    pub site_name: String,
    pub status: SyncStatus,
    /// Entry id assigned by the site's SPIRE server, once synced.
    pub spire_entry_id: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Last error reported by the site agent. `None` when healthy.
    pub sync_error: Option<String>,
}

/// A workload registration entry and its per-site fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub spiffe_id: String,
    pub parent_id: String,
    pub selectors: Vec<Selector>,
    pub ttl: i64,
    pub description: String,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub site_statuses: Vec<SiteStatus>,
}

impl Entry {
    /// True if any site reported a sync error.
    pub fn has_sync_errors(&self) -> bool {
        self.site_statuses.iter().any(|s| s.sync_error.is_some())
    }
}
