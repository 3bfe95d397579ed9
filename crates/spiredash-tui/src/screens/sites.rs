//! Sites tab: one card per configured site.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use spiredash_core::{Site, Snapshot};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt::{fmt_timestamp, or_dash};
use crate::widgets::status_badge::badge_span;

/// Card height including borders.
const CARD_HEIGHT: u16 = 8;
/// Narrowest card before the grid drops a column.
const CARD_MIN_WIDTH: u16 = 38;

pub struct SitesScreen {
    focused: bool,
    snapshot: Arc<Snapshot>,
    /// First visible card row.
    scroll: usize,
}

impl SitesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: Arc::new(Snapshot::default()),
            scroll: 0,
        }
    }

    fn sites(&self) -> &[Site] {
        &self.snapshot.sites
    }

    fn render_card(frame: &mut Frame, area: Rect, site: &Site) {
        let block = Block::default()
            .title(format!(" {} ", site.name))
            .title_style(theme::site_name())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {label:<13}"), theme::label()),
                Span::styled(value, theme::value()),
            ])
        };

        let lines = vec![
            row("ID", site.id.clone()),
            row("Region", or_dash(&site.region).to_owned()),
            row("Trust Domain", or_dash(&site.trust_domain).to_owned()),
            row("Server", or_dash(&site.spire_server_address).to_owned()),
            Line::from(vec![
                Span::styled(format!(" {:<13}", "Status"), theme::label()),
                badge_span(&site.status),
            ]),
            row("Last Sync", fmt_timestamp(site.last_sync_at)),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for SitesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SitesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let rows = self.sites().len();
                if self.scroll + 1 < rows {
                    self.scroll += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::DataRefreshed(snapshot) = action {
            self.snapshot = Arc::clone(snapshot);
            self.scroll = self.scroll.min(self.sites().len().saturating_sub(1));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Configured Sites ({}) ", self.sites().len()))
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

        if self.sites().is_empty() {
            let spot = Rect::new(inner.x, inner.y + 1, inner.width, 1).intersection(inner);
            frame.render_widget(
                Paragraph::new(Span::styled("No sites configured", theme::key_hint()))
                    .alignment(Alignment::Center),
                spot,
            );
            return;
        }

        let columns = usize::from((inner.width / CARD_MIN_WIDTH).max(1));
        let visible_rows = usize::from((inner.height / CARD_HEIGHT).max(1));
        let first_row = (self.scroll / columns).min(self.sites().len().div_ceil(columns) - 1);

        let rows: Vec<&[Site]> = self
            .sites()
            .chunks(columns)
            .skip(first_row)
            .take(visible_rows)
            .collect();

        for (r, row_sites) in rows.iter().enumerate() {
            let offset = u16::try_from(r).unwrap_or(u16::MAX).saturating_mul(CARD_HEIGHT);
            let row_area = Rect::new(
                inner.x,
                inner.y.saturating_add(offset),
                inner.width,
                CARD_HEIGHT,
            )
            .intersection(inner);
            let cells = Layout::horizontal(vec![Constraint::Fill(1); columns]).split(row_area);
            for (site, cell) in row_sites.iter().zip(cells.iter()) {
                Self::render_card(frame, *cell, site);
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Sites"
    }
}
