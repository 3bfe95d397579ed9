// spiredash-api: Async Rust client for the SPIRE workload management REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod audit;
mod entries;
mod sites;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    AuditLogEntry, AuditQuery, ENTRY_TTL_SECS, HealthResponse, ListAuditLogsResponse,
    ListEntriesResponse, ListSitesResponse, NewEntry, ProtoTimestamp, Selector, Site, SiteStatus,
    WorkloadEntry,
};
pub use transport::{TlsMode, TransportConfig};
