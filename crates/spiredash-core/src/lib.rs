//! Reactive data layer between `spiredash-api` and the terminal UI.
//!
//! - **[`Dashboard`]**: facade owning the API client, the store, and the
//!   background poll task ([`start()`](Dashboard::start) /
//!   [`stop()`](Dashboard::stop)). Entries and sites are always refreshed
//!   together and published as one [`Snapshot`].
//!
//! - **[`DataStore`]**: `tokio::sync::watch` channels for the snapshot,
//!   audit trail, refresh status, and API health.
//!
//! - **[`Draft`]**: immutable "create entry" form state with
//!   copy-on-write transitions.
//!
//! - **[`status_badge`]**: maps a [`SyncStatus`] to badge colours and label.

pub mod badge;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod draft;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use badge::{Badge, BadgeColor, status_badge};
pub use config::{DashboardConfig, TlsVerification};
pub use dashboard::Dashboard;
pub use draft::{Draft, DraftField, SelectorField, SelectorKind, SelectorRow};
pub use error::CoreError;
pub use model::{AuditLogEntry, Entry, Selector, Site, SiteStatus, SyncStatus};
pub use store::{ApiHealth, DataStore, RefreshStatus, Snapshot};

pub use spiredash_api::AuditQuery;
