// ── Status badge policy ──
//
// Maps a sync status to the badge the views draw. The TUI theme turns
// `BadgeColor` into terminal colours; nothing here knows about ratatui.

use crate::model::SyncStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeColor {
    Amber,
    Green,
    Red,
    Violet,
    White,
}

impl BadgeColor {
    /// RGB value of the colour.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Amber => (0xf5, 0x9e, 0x0b),
            Self::Green => (0x10, 0xb9, 0x81),
            Self::Red => (0xef, 0x44, 0x44),
            Self::Violet => (0x8b, 0x5c, 0xf6),
            Self::White => (0xff, 0xff, 0xff),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub background: BadgeColor,
    pub foreground: BadgeColor,
    pub label: String,
}

/// Badge for `status`. Total: unknown statuses get the pending colour
/// and their own text, upper-cased.
pub fn status_badge(status: &SyncStatus) -> Badge {
    let background = match status {
        SyncStatus::Pending | SyncStatus::Other(_) => BadgeColor::Amber,
        SyncStatus::Synced => BadgeColor::Green,
        SyncStatus::Failed => BadgeColor::Red,
        SyncStatus::Deleting => BadgeColor::Violet,
    };
    Badge {
        background,
        foreground: BadgeColor::White,
        label: status.as_str().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses() {
        let cases = [
            (SyncStatus::Pending, BadgeColor::Amber, "PENDING"),
            (SyncStatus::Synced, BadgeColor::Green, "SYNCED"),
            (SyncStatus::Failed, BadgeColor::Red, "FAILED"),
            (SyncStatus::Deleting, BadgeColor::Violet, "DELETING"),
        ];
        for (status, bg, label) in cases {
            let badge = status_badge(&status);
            assert_eq!(badge.background, bg, "{status}");
            assert_eq!(badge.foreground, BadgeColor::White);
            assert_eq!(badge.label, label);
        }
    }

    #[test]
    fn unknown_status_falls_back_to_pending_colour() {
        let badge = status_badge(&SyncStatus::parse("active"));
        assert_eq!(badge.background, BadgeColor::Amber);
        assert_eq!(badge.label, "ACTIVE");
    }

    #[test]
    fn mixed_case_tags_are_unknown() {
        for raw in ["Synced", "FAILED", " synced "] {
            let badge = status_badge(&SyncStatus::parse(raw));
            assert_eq!(badge.background, BadgeColor::Amber, "{raw:?}");
            assert_eq!(badge.label, raw.to_uppercase());
        }
    }

    #[test]
    fn missing_status_reads_pending() {
        assert_eq!(status_badge(&SyncStatus::parse("")).label, "PENDING");
    }
}
