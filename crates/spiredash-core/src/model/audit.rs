// ── Audit trail domain type ──

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: i64,
    pub timestamp: Option<DateTime<Utc>>,
    pub actor: String,
    /// Free-form tag: `create`, `delete`, `assign`, `sync`, `delete_sync`, ...
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    /// JSON text recorded by the server, shown as-is.
    pub details: String,
}
