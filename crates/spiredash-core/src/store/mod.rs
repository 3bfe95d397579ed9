// ── Reactive data store ──

mod data_store;
mod refresh;

pub use data_store::{ApiHealth, DataStore, RefreshStatus, Snapshot};
