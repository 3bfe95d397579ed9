// ── Domain model ──
//
// Canonical types the dashboard renders. Built from `spiredash_api`
// wire types in `crate::convert`; never deserialized directly.

mod audit;
mod entry;
mod site;
mod sync_status;

pub use audit::AuditLogEntry;
pub use entry::{Entry, Selector, SiteStatus};
pub use site::Site;
pub use sync_status::SyncStatus;
