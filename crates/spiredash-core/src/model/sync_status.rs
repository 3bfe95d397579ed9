// ── Synchronization status ──

use std::fmt;

/// Sync state of an entry on one site, or of a site as a whole.
///
/// Parsing never fails. Tags match exactly as the server sends them, in
/// lowercase; missing input is `Pending` and anything else is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SyncStatus {
    #[default]
    Pending,
    Synced,
    Failed,
    Deleting,
    Other(String),
}

impl SyncStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" | "pending" => Self::Pending,
            "synced" => Self::Synced,
            "failed" => Self::Failed,
            "deleting" => Self::Deleting,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
            Self::Deleting => "deleting",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for SyncStatus {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_parse() {
        assert_eq!(SyncStatus::parse("synced"), SyncStatus::Synced);
        assert_eq!(SyncStatus::parse("failed"), SyncStatus::Failed);
        assert_eq!(SyncStatus::parse("deleting"), SyncStatus::Deleting);
        assert_eq!(SyncStatus::parse("pending"), SyncStatus::Pending);
    }

    #[test]
    fn empty_is_pending() {
        assert_eq!(SyncStatus::parse(""), SyncStatus::Pending);
    }

    #[test]
    fn tags_are_case_and_space_sensitive() {
        assert_eq!(SyncStatus::parse("Synced"), SyncStatus::Other("Synced".into()));
        assert_eq!(SyncStatus::parse("FAILED"), SyncStatus::Other("FAILED".into()));
        assert_eq!(SyncStatus::parse(" synced "), SyncStatus::Other(" synced ".into()));
        assert_eq!(SyncStatus::parse("   "), SyncStatus::Other("   ".into()));
    }

    #[test]
    fn unknown_is_kept_verbatim() {
        let status = SyncStatus::parse("active");
        assert_eq!(status, SyncStatus::Other("active".into()));
        assert_eq!(status.to_string(), "active");
    }
}
