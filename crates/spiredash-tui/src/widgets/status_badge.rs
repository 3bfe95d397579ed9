//! Status badge spans for sync states.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use spiredash_core::{SyncStatus, status_badge};

use crate::theme;

/// Filled badge, e.g. ` SYNCED ` on green.
pub fn badge_span(status: &SyncStatus) -> Span<'static> {
    let badge = status_badge(status);
    Span::styled(format!(" {} ", badge.label), theme::badge_style(&badge))
}

/// Inline marker for a site that reported a sync error.
pub fn sync_error_marker() -> Span<'static> {
    Span::styled(
        "!",
        Style::default()
            .fg(theme::ERROR_RED)
            .add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;

    #[test]
    fn synced_badge_is_green_with_white_text() {
        let span = badge_span(&SyncStatus::Synced);
        assert_eq!(span.content, " SYNCED ");
        assert_eq!(span.style.bg, Some(Color::Rgb(0x10, 0xb9, 0x81)));
        assert_eq!(span.style.fg, Some(Color::Rgb(0xff, 0xff, 0xff)));
    }

    #[test]
    fn unknown_status_keeps_its_text() {
        let span = badge_span(&SyncStatus::parse("orphaned"));
        assert_eq!(span.content, " ORPHANED ");
        assert_eq!(span.style.bg, Some(Color::Rgb(0xf5, 0x9e, 0x0b)));
    }
}
