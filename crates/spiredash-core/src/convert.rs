// ── Wire → domain conversion ──
//
// Empty strings on the wire mean "absent"; they become `None` here so
// the views never have to check for both.

use spiredash_api::models as wire;

use crate::model::{AuditLogEntry, Entry, Selector, Site, SiteStatus, SyncStatus};

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

impl From<wire::Selector> for Selector {
    fn from(s: wire::Selector) -> Self {
        Self {
            kind: s.kind,
            value: s.value,
        }
    }
}

/// What was sent, for a create the server accepted without echoing the
/// entry back. The id stays empty until the next refresh.
impl From<wire::NewEntry> for Entry {
    fn from(e: wire::NewEntry) -> Self {
        Self {
            id: String::new(),
            spiffe_id: e.spiffe_id,
            parent_id: e.parent_id,
            selectors: e.selectors.into_iter().map(Selector::from).collect(),
            ttl: i64::from(wire::ENTRY_TTL_SECS),
            description: e.description,
            created_by: String::new(),
            created_at: None,
            updated_at: None,
            site_statuses: Vec::new(),
        }
    }
}

impl From<wire::SiteStatus> for SiteStatus {
    fn from(s: wire::SiteStatus) -> Self {
        Self {
            status: SyncStatus::parse(&s.status),
            site_id: s.site_id,
            site_name: s.site_name,
            spire_entry_id: non_empty(s.spire_entry_id),
            last_sync_at: s.last_sync_at.and_then(wire::ProtoTimestamp::to_datetime),
            sync_error: non_empty(s.sync_error),
        }
    }
}

impl From<wire::WorkloadEntry> for Entry {
    fn from(e: wire::WorkloadEntry) -> Self {
        Self {
            id: e.id,
            spiffe_id: e.spiffe_id,
            parent_id: e.parent_id,
            selectors: e.selectors.into_iter().map(Selector::from).collect(),
            ttl: e.ttl,
            description: e.description,
            created_by: e.created_by,
            created_at: e.created_at.and_then(wire::ProtoTimestamp::to_datetime),
            updated_at: e.updated_at.and_then(wire::ProtoTimestamp::to_datetime),
            site_statuses: e.site_statuses.into_iter().map(SiteStatus::from).collect(),
        }
    }
}

impl From<wire::Site> for Site {
    fn from(s: wire::Site) -> Self {
        Self {
            status: SyncStatus::parse(&s.status),
            id: s.id,
            name: s.name,
            region: s.region,
            trust_domain: s.trust_domain,
            spire_server_address: s.spire_server_address,
            last_sync_at: s.last_sync_at.and_then(wire::ProtoTimestamp::to_datetime),
        }
    }
}

impl From<wire::AuditLogEntry> for AuditLogEntry {
    fn from(a: wire::AuditLogEntry) -> Self {
        Self {
            id: a.id,
            timestamp: a.timestamp.and_then(wire::ProtoTimestamp::to_datetime),
            actor: a.actor,
            action: a.action,
            resource_type: a.resource_type,
            resource_id: a.resource_id,
            details: a.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_status(status: &str, error: &str) -> wire::SiteStatus {
        wire::SiteStatus {
            site_id: "site-eu".into(),
            site_name: "eu-west".into(),
            status: status.into(),
            spire_entry_id: String::new(),
            last_sync_at: None,
            sync_error: error.into(),
        }
    }

    #[test]
    fn empty_wire_strings_become_none() {
        let status = SiteStatus::from(wire_status("", ""));
        assert_eq!(status.status, SyncStatus::Pending);
        assert!(status.sync_error.is_none());
        assert!(status.spire_entry_id.is_none());
    }

    #[test]
    fn sync_error_is_preserved() {
        let status = SiteStatus::from(wire_status("failed", "spire server unreachable"));
        assert_eq!(status.status, SyncStatus::Failed);
        assert_eq!(status.sync_error.as_deref(), Some("spire server unreachable"));
    }

    #[test]
    fn accepted_request_fills_an_entry() {
        let entry = Entry::from(wire::NewEntry {
            spiffe_id: "spiffe://example.org/web".into(),
            parent_id: "spiffe://example.org/agent".into(),
            selectors: vec![wire::Selector {
                kind: "k8s:ns".into(),
                value: "prod".into(),
            }],
            site_ids: vec!["site-us".into()],
            description: String::new(),
        });
        assert!(entry.id.is_empty());
        assert_eq!(entry.spiffe_id, "spiffe://example.org/web");
        assert_eq!(entry.selectors[0].value, "prod");
        assert_eq!(entry.ttl, 3600);
    }

    #[test]
    fn audit_timestamp_unwrapped() {
        let audit = AuditLogEntry::from(wire::AuditLogEntry {
            id: 1,
            timestamp: Some(wire::ProtoTimestamp {
                seconds: 86_400,
                nanos: 0,
            }),
            actor: "demo-user".into(),
            action: "create".into(),
            resource_type: "workload_entry".into(),
            resource_id: "e-1".into(),
            details: "{}".into(),
        });
        assert_eq!(audit.timestamp.map(|t| t.timestamp()), Some(86_400));
    }
}
