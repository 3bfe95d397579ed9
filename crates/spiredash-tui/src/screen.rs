//! Tab identifiers and the tab order.

use std::fmt;

/// The three tabs. Switching is immediate and unguarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabId {
    #[default]
    Entries, // 1
    Sites,   // 2
    Audit,   // 3
}

impl TabId {
    /// All tabs in tab-bar order.
    pub const ALL: [TabId; 3] = [Self::Entries, Self::Sites, Self::Audit];

    /// Numeric key (1-3) for this tab.
    pub fn number(self) -> u8 {
        match self {
            Self::Entries => 1,
            Self::Sites => 2,
            Self::Audit => 3,
        }
    }

    /// Tab from a numeric key (1-3). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Entries),
            2 => Some(Self::Sites),
            3 => Some(Self::Audit),
            _ => None,
        }
    }

    /// Next tab in order (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Entries => Self::Sites,
            Self::Sites => Self::Audit,
            Self::Audit => Self::Entries,
        }
    }

    /// Previous tab in order (wraps around).
    pub fn prev(self) -> Self {
        match self {
            Self::Entries => Self::Audit,
            Self::Sites => Self::Entries,
            Self::Audit => Self::Sites,
        }
    }

    /// Label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Entries => "Entries",
            Self::Sites => "Sites",
            Self::Audit => "Audit Log",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
