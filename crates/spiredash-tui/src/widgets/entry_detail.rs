//! Entry detail overlay: full record plus per-site sync state.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use spiredash_core::Entry;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt::{NONE, fmt_timestamp, or_dash};
use crate::widgets::overlay;
use crate::widgets::status_badge::{badge_span, sync_error_marker};

pub struct EntryDetail {
    id: String,
    /// Cached row while the fresh copy loads, then the server's copy.
    entry: Option<Entry>,
    loading: bool,
    error: Option<String>,
    scroll: u16,
}

impl EntryDetail {
    pub fn new(id: String, cached: Option<Entry>) -> Self {
        Self {
            id,
            entry: cached,
            loading: true,
            error: None,
            scroll: 0,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.id
    }

    fn lines(entry: &Entry) -> Vec<Line<'static>> {
        let field = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<14}"), theme::label()),
                Span::styled(value, theme::value()),
            ])
        };

        let selectors = if entry.selectors.is_empty() {
            NONE.to_owned()
        } else {
            entry
                .selectors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut lines = vec![
            Line::from(""),
            field("SPIFFE ID", entry.spiffe_id.clone()),
            field("Parent ID", entry.parent_id.clone()),
            field("Selectors", selectors),
            field("TTL", format!("{}s", entry.ttl)),
            field("Description", or_dash(&entry.description).to_owned()),
            field("Created By", or_dash(&entry.created_by).to_owned()),
            field("Created", fmt_timestamp(entry.created_at)),
            field("Updated", fmt_timestamp(entry.updated_at)),
            Line::from(""),
            Line::from(Span::styled(
                "  Sites",
                theme::heading(),
            )),
            Line::from(Span::styled("  ─────", theme::key_hint())),
        ];

        if entry.site_statuses.is_empty() {
            lines.push(Line::from(Span::styled(
                "  Not assigned to any site",
                theme::key_hint(),
            )));
        }

        for status in &entry.site_statuses {
            let mut head = vec![
                Span::styled(
                    format!("  {} ", status.site_name),
                    theme::site_name(),
                ),
                badge_span(&status.status),
            ];
            if status.sync_error.is_some() {
                head.push(Span::raw(" "));
                head.push(sync_error_marker());
            }
            lines.push(Line::from(head));
            lines.push(field(
                "  SPIRE entry",
                status
                    .spire_entry_id
                    .clone()
                    .unwrap_or_else(|| NONE.to_owned()),
            ));
            lines.push(field("  Last sync", fmt_timestamp(status.last_sync_at)));
            if let Some(err) = &status.sync_error {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<14}", "  Error"), theme::label()),
                    Span::styled(err.clone(), theme::error_text()),
                ]));
            }
        }

        lines
    }
}

impl Component for EntryDetail {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Ok(Some(Action::CloseDetail)),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Ok(None)
            }
            KeyCode::Char('d') => Ok(Some(Action::RequestDelete(self.id.clone()))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DetailLoaded(entry) if entry.id == self.id => {
                self.entry = Some(entry.as_ref().clone());
                self.loading = false;
                self.error = None;
            }
            Action::DetailFailed(msg) => {
                self.loading = false;
                self.error = Some(msg.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel_area = overlay::centered_rect(90, area.height.saturating_sub(2), area);
        let inner = overlay::panel(frame, panel_area, "Workload Entry", theme::ELECTRIC_PURPLE);

        let layout = Layout::vertical([
            Constraint::Length(1), // status
            Constraint::Min(1),    // body
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let status = if self.loading {
            Span::styled("  Loading...", theme::pending_text())
        } else if let Some(err) = &self.error {
            Span::styled(format!("  {err}"), theme::error_text())
        } else if self.entry.as_ref().is_some_and(Entry::has_sync_errors) {
            Span::styled(
                format!("  {}  · sync errors on some sites", self.id),
                theme::error_text(),
            )
        } else {
            Span::styled(format!("  {}", self.id), theme::key_hint())
        };
        frame.render_widget(Paragraph::new(status), layout[0]);

        if let Some(entry) = &self.entry {
            frame.render_widget(
                Paragraph::new(Self::lines(entry))
                    .wrap(Wrap { trim: false })
                    .scroll((self.scroll, 0)),
                layout[1],
            );
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("scroll  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("close", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);
    }

    fn id(&self) -> &'static str {
        "EntryDetail"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{entry, render_text};

    #[test]
    fn ignores_other_entries() {
        let mut detail = EntryDetail::new("e-1".into(), None);
        detail
            .update(&Action::DetailLoaded(Box::new(entry("e-2", "spiffe://b"))))
            .unwrap();
        assert!(detail.entry.is_none());
        assert!(detail.loading);
    }

    #[test]
    fn flags_sync_errors() {
        let mut failing = entry("e-1", "spiffe://example.org/web");
        failing.site_statuses[0].sync_error = Some("spire server unreachable".into());
        let mut detail = EntryDetail::new("e-1".into(), None);
        detail
            .update(&Action::DetailLoaded(Box::new(failing)))
            .unwrap();

        let text = render_text(&detail, 120, 30);
        assert!(text.contains("sync errors on some sites"), "{text}");
        assert!(text.contains("spire server unreachable"), "{text}");
        assert!(text.contains("3600s"), "{text}");
    }
}
