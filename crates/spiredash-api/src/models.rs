// Wire types for the workload management REST API.
//
// The backend encodes its Go structs without JSON tags, so response
// fields arrive in PascalCase (`SpiffeID`, `SiteStatuses`, ...). Slices
// that were never populated arrive as `null`; every collection here
// decodes `null` as empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// TTL (seconds) attached to every newly created entry.
pub const ENTRY_TTL_SECS: u32 = 3600;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Timestamps ───────────────────────────────────────────────────────

/// Protobuf-style timestamp as serialized by the backend: `{seconds, nanos}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoTimestamp {
    #[serde(default)]
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl ProtoTimestamp {
    /// Convert to a UTC datetime. Out-of-range values yield `None`.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

// ── Entries ──────────────────────────────────────────────────────────

/// A single selector. Responses spell the keys `Type`/`Value`, requests
/// send `type`/`value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(
        rename(serialize = "type", deserialize = "Type"),
        alias = "type",
        default,
        deserialize_with = "null_as_default_string"
    )]
    pub kind: String,
    #[serde(
        rename(serialize = "value", deserialize = "Value"),
        alias = "value",
        default,
        deserialize_with = "null_as_default_string"
    )]
    pub value: String,
}

/// Per-site synchronization state of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteStatus {
    #[serde(rename = "SiteID", default)]
    pub site_id: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub status: String,
    #[serde(rename = "SpireEntryID", default, deserialize_with = "null_as_default_string")]
    pub spire_entry_id: String,
    #[serde(default)]
    pub last_sync_at: Option<ProtoTimestamp>,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub sync_error: String,
}

/// A workload registration entry as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkloadEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "SpiffeID", default)]
    pub spiffe_id: String,
    #[serde(rename = "ParentID", default)]
    pub parent_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selectors: Vec<Selector>,
    #[serde(rename = "TTL", default)]
    pub ttl: i64,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<ProtoTimestamp>,
    #[serde(default)]
    pub updated_at: Option<ProtoTimestamp>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub site_statuses: Vec<SiteStatus>,
}

/// `GET /api/v1/entries`
#[derive(Debug, Clone, Deserialize)]
pub struct ListEntriesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entries: Vec<WorkloadEntry>,
    #[serde(default)]
    pub total_count: i64,
}

/// Body of `POST /api/v1/entries`, minus the fixed TTL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    pub spiffe_id: String,
    pub parent_id: String,
    pub selectors: Vec<Selector>,
    pub site_ids: Vec<String>,
    pub description: String,
}

/// `NewEntry` as it goes over the wire, with the TTL stamped on.
#[derive(Debug, Serialize)]
pub(crate) struct CreateEntryBody<'a> {
    #[serde(flatten)]
    pub entry: &'a NewEntry,
    pub ttl: u32,
}

// ── Sites ────────────────────────────────────────────────────────────

/// A federated site running its own SPIRE server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Site {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub spire_server_address: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub trust_domain: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub status: String,
    #[serde(default)]
    pub last_sync_at: Option<ProtoTimestamp>,
}

/// `GET /api/v1/sites`
#[derive(Debug, Clone, Deserialize)]
pub struct ListSitesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sites: Vec<Site>,
}

// ── Audit ────────────────────────────────────────────────────────────

/// One row of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditLogEntry {
    #[serde(rename = "ID", default)]
    pub id: i64,
    #[serde(default)]
    pub timestamp: Option<ProtoTimestamp>,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub actor: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub resource_type: String,
    #[serde(rename = "ResourceID", default, deserialize_with = "null_as_default_string")]
    pub resource_id: String,
    #[serde(default, deserialize_with = "null_as_default_string")]
    pub details: String,
}

/// `GET /api/v1/audit`
#[derive(Debug, Clone, Deserialize)]
pub struct ListAuditLogsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entries: Vec<AuditLogEntry>,
}

/// Optional filters for `GET /api/v1/audit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
}

impl AuditQuery {
    /// Audit trail of a single workload entry.
    pub fn for_entry(entry_id: impl Into<String>) -> Self {
        Self {
            resource_type: Some("workload_entry".into()),
            resource_id: Some(entry_id.into()),
        }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(rt) = &self.resource_type {
            params.push(("resource_type", rt.clone()));
        }
        if let Some(id) = &self.resource_id {
            params.push(("resource_id", id.clone()));
        }
        params
    }
}

// ── Health ───────────────────────────────────────────────────────────

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
