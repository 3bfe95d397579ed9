// ── Site domain type ──

use chrono::{DateTime, Utc};

use super::sync_status::SyncStatus;

/// A federated site with its own SPIRE server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub region: String,
    pub trust_domain: String,
    pub spire_server_address: String,
    pub status: SyncStatus,
    pub last_sync_at: Option<DateTime<Utc>>,
}
