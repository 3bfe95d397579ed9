//! Data bridge: connects the [`DataStore`](spiredash_core::DataStore)
//! watch channels to TUI actions.
//!
//! Runs as a background task: starts the dashboard's poller, then forwards
//! every snapshot, refresh-status, health and audit-log change as an
//! [`Action`] through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use spiredash_core::Dashboard;

use crate::action::Action;

/// Spawn the data bridge between [`Dashboard`] and the TUI.
///
/// Sends the current store values first so screens have data immediately,
/// then loops until cancelled. Stops the poller on the way out.
pub async fn spawn_data_bridge(
    dashboard: Dashboard,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let store = dashboard.store();
    let mut snapshot = store.subscribe_snapshot();
    let mut status = store.subscribe_refresh_status();
    let mut health = store.subscribe_health();
    let mut audit = store.subscribe_audit_logs();

    dashboard.start().await;

    let probe = dashboard.clone();
    tokio::spawn(async move {
        probe.check_health().await;
    });

    let _ = action_tx.send(Action::DataRefreshed(snapshot.borrow_and_update().clone()));
    let _ = action_tx.send(Action::RefreshStatusChanged(
        status.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::HealthChanged(health.borrow_and_update().clone()));
    let _ = action_tx.send(Action::AuditLogsUpdated(audit.borrow_and_update().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = snapshot.changed() => {
                let snap = snapshot.borrow_and_update().clone();
                debug!(entries = snap.entries.len(), "dispatching DataRefreshed");
                let _ = action_tx.send(Action::DataRefreshed(snap));
            }
            Ok(()) = status.changed() => {
                let s = status.borrow_and_update().clone();
                let _ = action_tx.send(Action::RefreshStatusChanged(s));
            }
            Ok(()) = health.changed() => {
                let h = health.borrow_and_update().clone();
                let _ = action_tx.send(Action::HealthChanged(h));
            }
            Ok(()) = audit.changed() => {
                let logs = audit.borrow_and_update().clone();
                let _ = action_tx.send(Action::AuditLogsUpdated(logs));
            }
        }
    }

    dashboard.stop().await;
    debug!("data bridge shut down");
}
