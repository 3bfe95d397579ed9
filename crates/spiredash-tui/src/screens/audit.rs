//! Audit tab: recent audit log, optionally narrowed to one entry.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use spiredash_core::AuditLogEntry;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt::{fmt_resource, fmt_timestamp, or_dash, short_id};

pub struct AuditScreen {
    focused: bool,
    logs: Arc<Vec<AuditLogEntry>>,
    /// Entry id the list is narrowed to.
    filter: Option<String>,
    table_state: TableState,
}

impl AuditScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            logs: Arc::new(Vec::new()),
            filter: None,
            table_state: TableState::default(),
        }
    }

    fn action_color(action: &str) -> Color {
        match action {
            "create" => theme::SUCCESS_GREEN,
            "delete" | "delete_sync" => theme::ERROR_RED,
            "sync" => theme::NEON_CYAN,
            "assign" => theme::ELECTRIC_PURPLE,
            _ => theme::ELECTRIC_YELLOW,
        }
    }

    fn title(&self) -> String {
        match &self.filter {
            Some(id) => format!(
                " Audit Log ({}) · entry {} ",
                self.logs.len(),
                short_id(id, 8)
            ),
            None => format!(" Audit Log ({}) ", self.logs.len()),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.logs.len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(current.saturating_add_signed(delta).min(len - 1)));
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("Timestamp").style(theme::table_header()),
            Cell::from("Actor").style(theme::table_header()),
            Cell::from("Action").style(theme::table_header()),
            Cell::from("Resource").style(theme::table_header()),
            Cell::from("Details").style(theme::table_header()),
        ]);

        let selected_idx = self.table_state.selected();
        let rows: Vec<Row> = self
            .logs
            .iter()
            .enumerate()
            .map(|(i, log)| {
                let prefix = if selected_idx == Some(i) { "▸" } else { " " };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", fmt_timestamp(log.timestamp))),
                    Cell::from(or_dash(&log.actor).to_owned())
                        .style(theme::site_name()),
                    Cell::from(log.action.clone())
                        .style(Style::default().fg(Self::action_color(&log.action))),
                    Cell::from(fmt_resource(&log.resource_type, &log.resource_id))
                        .style(Style::default().fg(theme::LIGHT_BLUE)),
                    Cell::from(or_dash(&log.details).to_owned()).style(theme::key_hint()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(21),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(30),
            Constraint::Fill(1),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Default for AuditScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AuditScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.move_selection(isize::MIN);
                Ok(None)
            }
            KeyCode::Char('G') => {
                self.move_selection(isize::MAX);
                Ok(None)
            }
            KeyCode::Char('f') => Ok(Some(Action::ToggleAuditFilter)),
            KeyCode::Char('R') => Ok(Some(Action::RequestAuditLogs)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::AuditLogsUpdated(logs) => {
                self.logs = Arc::clone(logs);
                let selected = self.table_state.selected().unwrap_or(0);
                self.table_state.select(if self.logs.is_empty() {
                    None
                } else {
                    Some(selected.min(self.logs.len() - 1))
                });
            }
            Action::AuditFilterChanged(filter) => {
                self.filter.clone_from(filter);
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

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if self.logs.is_empty() {
            let spot = Rect::new(layout[0].x, layout[0].y + 1, layout[0].width, 1)
                .intersection(layout[0]);
            frame.render_widget(
                Paragraph::new(Span::styled("No audit logs found", theme::key_hint()))
                    .alignment(Alignment::Center),
                spot,
            );
        } else {
            self.render_table(frame, layout[0]);
        }

        let filter_hint = if self.filter.is_some() {
            "show all  "
        } else {
            "selected entry only  "
        };
        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled(filter_hint, theme::key_hint()),
            Span::styled("R ", theme::key_hint_key()),
            Span::styled("reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Audit"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;
    use crate::test_support::render_text;

    fn log(action: &str) -> AuditLogEntry {
        AuditLogEntry {
            id: 1,
            timestamp: None,
            actor: "demo-user".into(),
            action: action.into(),
            resource_type: "workload_entry".into(),
            resource_id: "5f3c9a21-77aa-4c1e-9d0b".into(),
            details: r#"{"spiffe_id":"spiffe://example.org/web"}"#.into(),
        }
    }

    #[test]
    fn empty_list() {
        let screen = AuditScreen::new();
        let text = render_text(&screen, 120, 10);
        assert!(text.contains("Audit Log (0)"), "{text}");
        assert!(text.contains("No audit logs found"), "{text}");
    }

    #[test]
    fn rows_show_short_resource_ids() {
        let mut screen = AuditScreen::new();
        screen
            .update(&Action::AuditLogsUpdated(Arc::new(vec![log("create")])))
            .unwrap();
        let text = render_text(&screen, 160, 10);
        assert!(text.contains("Audit Log (1)"), "{text}");
        assert!(text.contains("demo-user"), "{text}");
        assert!(text.contains("create"), "{text}");
        assert!(text.contains("workload_entry/5f3c9a21..."), "{text}");
        assert!(!text.contains("No audit logs found"));
    }

    #[test]
    fn filter_shows_in_title() {
        let mut screen = AuditScreen::new();
        screen
            .update(&Action::AuditFilterChanged(Some("e-123456789".into())))
            .unwrap();
        let text = render_text(&screen, 120, 10);
        assert!(text.contains("entry e-123456..."), "{text}");
    }

    #[test]
    fn f_toggles_the_filter() {
        let mut screen = AuditScreen::new();
        let key = KeyEvent {
            code: KeyCode::Char('f'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert!(matches!(
            screen.handle_key_event(key).unwrap(),
            Some(Action::ToggleAuditFilter)
        ));
    }
}
