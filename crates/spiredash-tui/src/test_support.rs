//! Fixtures and a `TestBackend` renderer for the unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use spiredash_core::{Entry, Selector, Site, SiteStatus, Snapshot, SyncStatus};

use crate::component::Component;

/// Buffer contents, one line per row.
pub fn buffer_text(buffer: &Buffer) -> String {
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

/// Render `component` into a `width` x `height` test terminal.
pub fn render_text(component: &dyn Component, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| component.render(frame, frame.area()))
        .unwrap();
    buffer_text(terminal.backend().buffer())
}

pub fn entry(id: &str, spiffe_id: &str) -> Entry {
    Entry {
        id: id.into(),
        spiffe_id: spiffe_id.into(),
        parent_id: "spiffe://example.org/spire/agent/k8s_sat/demo/default".into(),
        selectors: vec![Selector {
            kind: "k8s:ns".into(),
            value: "default".into(),
        }],
        ttl: 3600,
        description: String::new(),
        created_by: "demo-user".into(),
        created_at: None,
        updated_at: None,
        site_statuses: vec![SiteStatus {
            site_id: "site-1".into(),
            site_name: "us-east".into(),
            status: SyncStatus::Synced,
            spire_entry_id: None,
            last_sync_at: None,
            sync_error: None,
        }],
    }
}

pub fn site(id: &str, name: &str) -> Site {
    Site {
        id: id.into(),
        name: name.into(),
        region: "us-east-1".into(),
        trust_domain: "example.org".into(),
        spire_server_address: "spire-server.us-east:8081".into(),
        status: SyncStatus::parse("active"),
        last_sync_at: None,
    }
}

/// A site whose SPIRE server is in sync.
pub fn synced_site(id: &str, name: &str) -> Site {
    Site {
        status: SyncStatus::Synced,
        ..site(id, name)
    }
}

/// A snapshot as published by a successful refresh.
pub fn snapshot(entries: Vec<Entry>, sites: Vec<Site>) -> Arc<Snapshot> {
    Arc::new(Snapshot {
        total_count: i64::try_from(entries.len()).unwrap(),
        entries,
        sites,
        fetched_at: Some(chrono::Utc::now()),
    })
}
