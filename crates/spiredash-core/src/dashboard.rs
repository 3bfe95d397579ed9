// ── Dashboard facade ──
//
// Owns the API client, the data store, and the background poll task.
// Views read from the store and call the async methods here for
// everything else.

use std::sync::Arc;
use std::time::Duration;

use spiredash_api::{ApiClient, AuditQuery};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::draft::Draft;
use crate::error::CoreError;
use crate::model::{AuditLogEntry, Entry, Site};
use crate::store::{ApiHealth, DataStore};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Construction does no I/O;
/// call [`start()`](Self::start) to begin polling.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: ApiClient,
    store: Arc<DataStore>,
    /// Token for the current poll run. Cancelled by `stop()`, replaced by `start()`.
    cancel: Mutex<CancellationToken>,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Dashboard {
    /// Build a dashboard for `config.api_url`.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_url.as_str(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Build a dashboard around an existing client.
    pub fn with_client(config: DashboardConfig, client: ApiClient) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                store: Arc::new(DataStore::new()),
                cancel: Mutex::new(CancellationToken::new()),
                poll_handle: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// A fresh form seeded with the configured parent ID.
    pub fn new_draft(&self) -> Draft {
        Draft::seeded(&self.inner.config.default_parent_id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start background polling: one refresh now, then one per
    /// `poll_interval`. Calling `start` while already running is a no-op.
    pub async fn start(&self) {
        let mut handle = self.inner.poll_handle.lock().await;
        if handle.is_some() {
            return;
        }

        let cancel = {
            let mut current = self.inner.cancel.lock().await;
            if current.is_cancelled() {
                *current = CancellationToken::new();
            }
            current.clone()
        };

        let interval = self.inner.config.poll_interval.max(Duration::from_secs(1));
        info!(interval_secs = interval.as_secs(), url = %self.inner.config.api_url, "starting poller");
        *handle = Some(tokio::spawn(poll_task(self.clone(), interval, cancel)));
    }

    /// Stop polling and wait for the poll task to exit. Refreshes still in
    /// flight finish on their own and their results are dropped.
    pub async fn stop(&self) {
        self.inner.cancel.lock().await.cancel();

        if let Some(handle) = self.inner.poll_handle.lock().await.take() {
            let _ = handle.await;
        }
        debug!("poller stopped");
    }

    async fn is_stopped(&self) -> bool {
        self.inner.cancel.lock().await.is_cancelled()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch entries and sites concurrently and publish them together.
    ///
    /// On failure the previous snapshot stays and the error is published
    /// on the refresh status for the banner.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.begin_refresh();

        let client = &self.inner.client;
        let result = futures::future::try_join(client.list_entries(), client.list_sites()).await;

        if self.is_stopped().await {
            debug!("discarding refresh that completed after stop");
            store.finish_refresh(None);
            return Ok(());
        }

        match result {
            Ok((entries, sites)) => {
                let total = entries.total_count;
                let entries: Vec<Entry> = entries.entries.into_iter().map(Entry::from).collect();
                let sites: Vec<Site> = sites.sites.into_iter().map(Site::from).collect();
                debug!(entries = entries.len(), sites = sites.len(), "refresh applied");
                store.apply_snapshot(entries, sites, total);
                store.finish_refresh(None);
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "refresh failed");
                store.finish_refresh(Some(err.action_message("fetch data")));
                Err(err)
            }
        }
    }

    /// Fetch the audit trail. Failures are logged and leave the last list
    /// in place; they never reach the error banner.
    pub async fn refresh_audit_logs(&self, query: &AuditQuery) -> Result<(), CoreError> {
        match self.inner.client.list_audit_logs(query).await {
            Ok(resp) => {
                let logs: Vec<AuditLogEntry> =
                    resp.entries.into_iter().map(AuditLogEntry::from).collect();
                debug!(count = logs.len(), ?query, "audit logs applied");
                self.inner.store.apply_audit_logs(logs);
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "audit log fetch failed");
                Err(err)
            }
        }
    }

    /// Probe `/health` and publish the result.
    pub async fn check_health(&self) -> ApiHealth {
        let health = match self.inner.client.health().await {
            Ok(resp) if resp.is_healthy() => ApiHealth::Healthy,
            Ok(resp) => ApiHealth::Unreachable(format!("status {:?}", resp.status)),
            Err(e) => ApiHealth::Unreachable(CoreError::from(e).to_string()),
        };
        debug!(?health, "health probe");
        self.inner.store.set_health(health.clone());
        health
    }

    // ── Entries ──────────────────────────────────────────────────────

    /// Fetch one entry with its full per-site detail.
    pub async fn get_entry(&self, id: &str) -> Result<Entry, CoreError> {
        match self.inner.client.get_entry(id).await {
            Ok(entry) => Ok(entry.into()),
            Err(e) if e.is_not_found() => Err(CoreError::EntryNotFound { id: id.to_owned() }),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit `draft`. Returns as soon as the server accepts it; the
    /// follow-up refresh runs in the background.
    pub async fn create_entry(&self, draft: &Draft) -> Result<Entry, CoreError> {
        draft.validate()?;
        let request = draft.to_new_entry();
        let created: Entry = match self.inner.client.create_entry(&request).await? {
            Some(entry) => entry.into(),
            None => request.into(),
        };
        info!(id = %created.id, spiffe_id = %created.spiffe_id, "entry created");
        self.spawn_refresh();
        Ok(created)
    }

    /// Delete an entry from every site. The follow-up refresh runs in the
    /// background.
    pub async fn delete_entry(&self, id: &str) -> Result<(), CoreError> {
        self.inner.client.delete_entry(id).await?;
        info!(id, "entry deleted");
        self.spawn_refresh();
        Ok(())
    }

    /// Failure lands on the banner via the refresh status.
    fn spawn_refresh(&self) {
        let dash = self.clone();
        tokio::spawn(async move {
            let _ = dash.refresh().await;
        });
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Tick immediately, then every `interval`. Each tick spawns its own
/// refresh so a slow backend never delays the schedule.
async fn poll_task(dashboard: Dashboard, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => dashboard.spawn_refresh(),
        }
    }
}
