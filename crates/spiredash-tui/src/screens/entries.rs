//! Entries tab: workload entries with per-site sync badges.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};

use spiredash_core::{Entry, RefreshStatus, Snapshot};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt::{NONE, or_dash};
use crate::widgets::status_badge::{badge_span, sync_error_marker};

pub struct EntriesScreen {
    focused: bool,
    snapshot: Arc<Snapshot>,
    status: RefreshStatus,
    table_state: TableState,
    throbber_state: ThrobberState,
}

impl EntriesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(Snapshot::default()),
            status: RefreshStatus::default(),
            table_state: TableState::default(),
            throbber_state: ThrobberState::default(),
        }
    }

    fn entries(&self) -> &[Entry] {
        &self.snapshot.entries
    }

    fn selected_entry(&self) -> Option<&Entry> {
        self.table_state
            .selected()
            .and_then(|idx| self.entries().get(idx))
    }

    fn selection_action(&self) -> Action {
        Action::SelectEntry(self.selected_entry().map(|e| e.id.clone()))
    }

    fn select(&mut self, idx: usize) {
        let len = self.entries().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(len - 1)));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let current = self.table_state.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(delta));
    }

    /// Nothing to show yet and a fetch is (or is about to be) in flight.
    fn show_loading(&self) -> bool {
        self.entries().is_empty()
            && (self.status.loading
                || (self.snapshot.fetched_at.is_none() && self.status.error.is_none()))
    }

    fn title(&self) -> String {
        let shown = self.entries().len();
        let total = usize::try_from(self.snapshot.total_count).unwrap_or(0);
        if total > shown {
            format!(" Workload Entries ({shown} of {total}) ")
        } else {
            format!(" Workload Entries ({shown}) ")
        }
    }

    fn selectors_text(entry: &Entry) -> String {
        entry
            .selectors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// `name BADGE !  name BADGE` for every site the entry targets.
    fn site_status_line(entry: &Entry) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, status) in entry.site_statuses.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format!("{} ", status.site_name),
                theme::site_name(),
            ));
            spans.push(badge_span(&status.status));
            if status.sync_error.is_some() {
                spans.push(sync_error_marker());
            }
        }
        if spans.is_empty() {
            spans.push(Span::styled(NONE, theme::key_hint()));
        }
        Line::from(spans)
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("SPIFFE ID").style(theme::table_header()),
            Cell::from("Selectors").style(theme::table_header()),
            Cell::from("Site Status").style(theme::table_header()),
            Cell::from("Created By").style(theme::table_header()),
        ]);

        let selected_idx = self.table_state.selected();
        let rows: Vec<Row> = self
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = if selected_idx == Some(i) { "▸" } else { " " };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", entry.spiffe_id))
                        .style(theme::spiffe_id()),
                    Cell::from(Self::selectors_text(entry))
                        .style(theme::selector()),
                    Cell::from(Self::site_status_line(entry)),
                    Cell::from(or_dash(&entry.created_by).to_owned()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(14),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Default for EntriesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EntriesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Char('g') => {
                self.select(0);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Char('G') => {
                self.select(usize::MAX);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(10);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-10);
                Ok(Some(self.selection_action()))
            }
            KeyCode::Enter => Ok(self
                .selected_entry()
                .map(|e| Action::OpenDetail(e.id.clone()))),
            KeyCode::Char('n') => Ok(Some(Action::OpenCreateForm)),
            KeyCode::Char('d') => Ok(self
                .selected_entry()
                .map(|e| Action::RequestDelete(e.id.clone()))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataRefreshed(snapshot) => {
                let previous = self.selected_entry().map(|e| e.id.clone());
                self.snapshot = Arc::clone(snapshot);
                // Follow the selected entry to its new row if it survived.
                let idx = previous
                    .and_then(|id| self.entries().iter().position(|e| e.id == id))
                    .or(self.table_state.selected())
                    .unwrap_or(0);
                self.select(idx);
                return Ok(Some(self.selection_action()));
            }
            Action::RefreshStatusChanged(status) => {
                self.status = status.clone();
            }
            Action::Tick => {
                if self.show_loading() {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if self.show_loading() {
            let throbber = Throbber::default()
                .label("Loading...")
                .style(theme::value())
                .throbber_style(theme::throbber());
            let spot = Rect::new(
                layout[0].x + 2,
                layout[0].y + 1,
                layout[0].width.saturating_sub(2),
                1,
            )
            .intersection(layout[0]);
            frame.render_stateful_widget(throbber, spot, &mut self.throbber_state.clone());
        } else if self.entries().is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No workload entries found",
                theme::key_hint(),
            )))
            .alignment(Alignment::Center);
            let spot = Rect::new(layout[0].x, layout[0].y + 1, layout[0].width, 1)
                .intersection(layout[0]);
            frame.render_widget(empty, spot);
        } else {
            self.render_table(frame, layout[0]);
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("details  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("create  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Entries"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crossterm::event::{KeyEventKind, KeyEventState};

    use super::*;
    use crate::test_support::{entry, render_text, site, snapshot};

    fn key(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn shows_loading_before_first_refresh() {
        let screen = EntriesScreen::new();
        let text = render_text(&screen, 100, 12);
        assert!(text.contains("Loading..."), "{text}");
        assert!(!text.contains("No workload entries found"));
    }

    #[test]
    fn empty_state_after_refresh() {
        let mut screen = EntriesScreen::new();
        screen
            .update(&Action::DataRefreshed(snapshot(vec![], vec![site("site-1", "us-east")])))
            .unwrap();
        let text = render_text(&screen, 100, 12);
        assert!(text.contains("Workload Entries (0)"), "{text}");
        assert!(text.contains("No workload entries found"), "{text}");
        assert!(!text.contains("Loading..."));
    }

    #[test]
    fn rows_show_selectors_and_site_badges() {
        let mut screen = EntriesScreen::new();
        let mut failing = entry("e-1", "spiffe://example.org/web");
        failing.site_statuses[0].sync_error = Some("connection refused".into());
        failing.site_statuses[0].status = spiredash_core::SyncStatus::Failed;
        screen
            .update(&Action::DataRefreshed(snapshot(vec![failing], vec![])))
            .unwrap();

        let text = render_text(&screen, 140, 12);
        assert!(text.contains("spiffe://example.org/web"), "{text}");
        assert!(text.contains("k8s:ns:default"), "{text}");
        assert!(text.contains("us-east  FAILED !"), "{text}");
        assert!(text.contains("demo-user"), "{text}");
    }

    #[test]
    fn delete_and_detail_target_the_selected_row() {
        let mut screen = EntriesScreen::new();
        assert!(screen.handle_key_event(key('d')).unwrap().is_none());

        screen
            .update(&Action::DataRefreshed(snapshot(
                vec![entry("e-1", "spiffe://a"), entry("e-2", "spiffe://b")],
                vec![],
            )))
            .unwrap();
        screen.handle_key_event(key('j')).unwrap();

        match screen.handle_key_event(key('d')).unwrap() {
            Some(Action::RequestDelete(id)) => assert_eq!(id, "e-2"),
            other => panic!("expected RequestDelete, got {other:?}"),
        }
        let enter = KeyEvent {
            code: KeyCode::Enter,
            ..key('x')
        };
        match screen.handle_key_event(enter).unwrap() {
            Some(Action::OpenDetail(id)) => assert_eq!(id, "e-2"),
            other => panic!("expected OpenDetail, got {other:?}"),
        }
    }

    #[test]
    fn selection_follows_entry_across_refreshes() {
        let mut screen = EntriesScreen::new();
        screen
            .update(&Action::DataRefreshed(snapshot(
                vec![entry("e-1", "spiffe://a"), entry("e-2", "spiffe://b")],
                vec![],
            )))
            .unwrap();
        screen.handle_key_event(key('j')).unwrap();

        let follow_up = screen
            .update(&Action::DataRefreshed(snapshot(
                vec![
                    entry("e-0", "spiffe://z"),
                    entry("e-1", "spiffe://a"),
                    entry("e-2", "spiffe://b"),
                ],
                vec![],
            )))
            .unwrap();
        assert!(matches!(follow_up, Some(Action::SelectEntry(Some(ref id))) if id == "e-2"));
    }
}
