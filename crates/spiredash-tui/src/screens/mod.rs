//! Screen implementations. Each tab is a top-level Component.

pub mod audit;
pub mod entries;
pub mod sites;

use crate::component::Component;
use crate::screen::TabId;

/// Create one screen component per tab.
pub fn create_screens() -> Vec<(TabId, Box<dyn Component>)> {
    vec![
        (TabId::Entries, Box::new(entries::EntriesScreen::new())),
        (TabId::Sites, Box::new(sites::SitesScreen::new())),
        (TabId::Audit, Box::new(audit::AuditScreen::new())),
    ]
}
