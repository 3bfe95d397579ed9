//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use spiredash_core::{ApiHealth, AuditLogEntry, Draft, Entry, RefreshStatus, Snapshot};

use crate::screen::TabId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Actions that require a y/n confirmation before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteEntry { id: String, spiffe_id: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteEntry { .. } => f.write_str(
                "Are you sure you want to delete this entry? It will be removed from all sites.",
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchTab(TabId),
    ToggleHelp,

    // ── Data (from the bridge) ──
    DataRefreshed(Arc<Snapshot>),
    RefreshStatusChanged(RefreshStatus),
    HealthChanged(ApiHealth),
    AuditLogsUpdated(Arc<Vec<AuditLogEntry>>),

    // ── Data requests ──
    Refresh,
    RequestAuditLogs,
    /// Entry under the cursor on the Entries tab.
    SelectEntry(Option<String>),
    ToggleAuditFilter,
    AuditFilterChanged(Option<String>),

    // ── Create flow ──
    OpenCreateForm,
    CloseCreateForm,
    SubmitDraft(Box<Draft>),
    CreateSucceeded(Box<Entry>),
    CreateFailed(String),

    // ── Delete flow ──
    RequestDelete(String),
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    DeleteSucceeded(String),
    DeleteFailed(String),

    // ── Entry detail ──
    OpenDetail(String),
    DetailLoaded(Box<Entry>),
    DetailFailed(String),
    CloseDetail,

    // ── Alerts / notifications ──
    ShowAlert(String),
    DismissAlert,
    Notify(Notification),
}
