//! Create-entry form overlay.
//!
//! Holds a [`Draft`] and replaces it on every edit. Submitting hands a copy
//! to the app, which runs the request and reports back with
//! `CreateSucceeded` / `CreateFailed`.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::{Throbber, ThrobberState};
use tracing::warn;

use spiredash_core::{Draft, DraftField, SelectorField, SelectorKind, Site};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::overlay;

const SPIFFE_ID_PLACEHOLDER: &str = "spiffe://example.org/workload/my-service";
const VALUE_PLACEHOLDER: &str = "value";
const DESCRIPTION_PLACEHOLDER: &str = "Optional description...";

/// One focusable element, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(DraftField),
    SelectorKind(usize),
    SelectorValue(usize),
    AddSelector,
    Site(usize),
    Submit,
}

pub struct CreateForm {
    draft: Draft,
    sites: Vec<Site>,
    focus: Focus,
    submitting: bool,
    /// Inline validation message.
    error: Option<String>,
    throbber_state: ThrobberState,
}

impl CreateForm {
    pub fn new(draft: Draft, sites: Vec<Site>) -> Self {
        Self {
            draft,
            sites,
            focus: Focus::Field(DraftField::SpiffeId),
            submitting: false,
            error: None,
            throbber_state: ThrobberState::default(),
        }
    }

    #[cfg(test)]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[cfg(test)]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ── Focus ────────────────────────────────────────────────────────

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![
            Focus::Field(DraftField::SpiffeId),
            Focus::Field(DraftField::ParentId),
        ];
        for i in 0..self.draft.selectors().len() {
            order.push(Focus::SelectorKind(i));
            order.push(Focus::SelectorValue(i));
        }
        order.push(Focus::AddSelector);
        order.extend((0..self.sites.len()).map(Focus::Site));
        order.push(Focus::Field(DraftField::Description));
        order.push(Focus::Submit);
        order
    }

    fn focus_next(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        if let Some(next) = order.get((pos + 1) % order.len()) {
            self.focus = *next;
        }
    }

    fn focus_prev(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let prev = if pos == 0 { order.len() - 1 } else { pos - 1 };
        if let Some(prev) = order.get(prev) {
            self.focus = *prev;
        }
    }

    /// Keep focus valid after the site list shrinks.
    fn clamp_focus(&mut self) {
        if !self.focus_order().contains(&self.focus) {
            self.focus = Focus::AddSelector;
        }
    }

    // ── Edits ────────────────────────────────────────────────────────

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        match self.focus {
            Focus::Field(field) => {
                let mut value = self.draft.field(field).to_owned();
                edit(&mut value);
                self.draft = self.draft.with_field(field, value);
            }
            Focus::SelectorValue(index) => {
                let Some(row) = self.draft.selectors().get(index) else {
                    return;
                };
                let mut value = row.value.clone();
                edit(&mut value);
                self.update_selector(index, SelectorField::Value, value);
            }
            _ => {}
        }
    }

    fn update_selector(&mut self, index: usize, field: SelectorField, value: String) {
        match self.draft.with_selector_updated(index, field, value) {
            Ok(next) => self.draft = next,
            Err(e) => warn!(error = %e, "selector edit ignored"),
        }
    }

    fn cycle_kind(&mut self, index: usize, forward: bool) {
        let Some(row) = self.draft.selectors().get(index) else {
            return;
        };
        let current = SelectorKind::from_wire(&row.kind).unwrap_or(SelectorKind::Unset);
        let next = if forward {
            current.cycle_next()
        } else {
            current.cycle_prev()
        };
        self.update_selector(index, SelectorField::Kind, next.as_str().to_owned());
    }

    fn add_selector_row(&mut self) {
        self.draft = self.draft.with_selector_row_added();
        self.focus = Focus::SelectorKind(self.draft.selectors().len() - 1);
    }

    fn toggle_site(&mut self, index: usize) {
        if let Some(site) = self.sites.get(index) {
            self.draft = self.draft.with_site_toggled(&site.id);
        }
    }

    fn submit(&mut self) -> Option<Action> {
        if let Err(e) = self.draft.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        self.error = None;
        self.submitting = true;
        Some(Action::SubmitDraft(Box::new(self.draft.clone())))
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn body(&self) -> Body {
        let mut body = Body::default();

        body.heading("SPIFFE ID", true);
        body.push(
            self.input_line(DraftField::SpiffeId, SPIFFE_ID_PLACEHOLDER),
            self.focus == Focus::Field(DraftField::SpiffeId),
        );
        body.blank();

        body.heading("Parent ID", true);
        body.push(
            self.input_line(DraftField::ParentId, ""),
            self.focus == Focus::Field(DraftField::ParentId),
        );
        body.blank();

        body.heading("Selectors", false);
        for (i, row) in self.draft.selectors().iter().enumerate() {
            let kind_focused = self.focus == Focus::SelectorKind(i);
            let value_focused = self.focus == Focus::SelectorValue(i);
            let kind_label = SelectorKind::from_wire(&row.kind)
                .map_or(row.kind.as_str(), |kind| kind.label());
            let kind_style = if kind_focused {
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::LIGHT_BLUE)
            };
            let mut spans = vec![
                Span::raw(marker(kind_focused || value_focused)),
                Span::styled(format!("[{kind_label:<15}]"), kind_style),
                Span::raw("  "),
            ];
            spans.extend(text_spans(&row.value, VALUE_PLACEHOLDER, value_focused));
            body.push(Line::from(spans), kind_focused || value_focused);
        }
        body.push(
            button_line("+ Add Selector", self.focus == Focus::AddSelector),
            self.focus == Focus::AddSelector,
        );
        body.blank();

        body.heading("Target Sites", false);
        if self.sites.is_empty() {
            body.push(
                Line::from(Span::styled("    No sites configured", theme::key_hint())),
                false,
            );
        }
        for (i, site) in self.sites.iter().enumerate() {
            let focused = self.focus == Focus::Site(i);
            let checked = self.draft.is_site_selected(&site.id);
            let check = if checked { "[\u{2713}]" } else { "[ ]" };
            let check_style = if focused {
                Style::default().fg(theme::ELECTRIC_PURPLE)
            } else if checked {
                Style::default().fg(theme::SUCCESS_GREEN)
            } else {
                Style::default().fg(theme::BORDER_GRAY)
            };
            body.push(
                Line::from(vec![
                    Span::raw(marker(focused)),
                    Span::styled(check, check_style),
                    Span::styled(
                        format!(" {} ({})", site.name, site.region),
                        if focused {
                            Style::default().fg(theme::NEON_CYAN)
                        } else {
                            theme::label()
                        },
                    ),
                ]),
                focused,
            );
        }
        body.blank();

        body.heading("Description", false);
        body.push(
            self.input_line(DraftField::Description, DESCRIPTION_PLACEHOLDER),
            self.focus == Focus::Field(DraftField::Description),
        );
        body.blank();

        body.push(
            button_line("Create Entry", self.focus == Focus::Submit),
            self.focus == Focus::Submit,
        );

        body
    }

    fn input_line(&self, field: DraftField, placeholder: &str) -> Line<'static> {
        let focused = self.focus == Focus::Field(field);
        let mut spans = vec![Span::raw(marker(focused))];
        spans.extend(text_spans(self.draft.field(field), placeholder, focused));
        Line::from(spans)
    }

    fn render_footer(&self, frame: &mut Frame, status_area: Rect, hint_area: Rect) {
        if self.submitting {
            let throbber = Throbber::default()
                .label("  Creating entry...")
                .style(theme::value())
                .throbber_style(theme::throbber());
            frame.render_stateful_widget(throbber, status_area, &mut self.throbber_state.clone());
        } else if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {err}"),
                    Style::default().fg(theme::ERROR_RED),
                )),
                status_area,
            );
        }

        let hints = match self.focus {
            Focus::SelectorKind(_) => "  \u{25C2}/\u{25B8} type  Tab next  Ctrl+S create  Esc cancel",
            Focus::Site(_) => "  Space toggle  Tab next  Ctrl+S create  Esc cancel",
            Focus::AddSelector | Focus::Submit => "  Enter select  Tab next  Ctrl+S create  Esc cancel",
            Focus::Field(_) | Focus::SelectorValue(_) => {
                "  Tab next  Shift+Tab prev  Ctrl+S create  Esc cancel"
            }
        };
        frame.render_widget(Paragraph::new(Span::styled(hints, theme::key_hint())), hint_area);
    }
}

/// Form lines plus the index of the focused line, for scrolling.
#[derive(Default)]
struct Body {
    lines: Vec<Line<'static>>,
    focus_line: usize,
}

impl Body {
    fn heading(&mut self, text: &str, required: bool) {
        let mut spans = vec![Span::styled(format!("  {text}"), theme::label())];
        if required {
            spans.push(Span::styled(" *", Style::default().fg(theme::CORAL)));
        }
        self.lines.push(Line::from(spans));
    }

    fn push(&mut self, line: Line<'static>, focused: bool) {
        if focused {
            self.focus_line = self.lines.len();
        }
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }
}

fn marker(focused: bool) -> &'static str {
    if focused { "  \u{25B8} " } else { "    " }
}

fn text_spans(value: &str, placeholder: &str, focused: bool) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(2);
    if value.is_empty() && !focused {
        spans.push(Span::styled(placeholder.to_owned(), theme::key_hint()));
    } else {
        spans.push(Span::styled(
            value.to_owned(),
            Style::default().fg(theme::NEON_CYAN),
        ));
    }
    if focused {
        spans.push(Span::styled("\u{2588}", Style::default().fg(theme::NEON_CYAN)));
    }
    spans
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(theme::BG_DARK)
            .bg(theme::ELECTRIC_PURPLE)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::ELECTRIC_PURPLE)
    };
    Line::from(vec![
        Span::raw(marker(focused)),
        Span::styled(format!(" {label} "), style),
    ])
}

impl Component for CreateForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }
        if key.code == KeyCode::Esc {
            return Ok(Some(Action::CloseCreateForm));
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(match key.code {
                KeyCode::Char('s') => self.submit(),
                _ => None,
            });
        }

        self.error = None;

        match (self.focus, key.code) {
            (_, KeyCode::Tab | KeyCode::Down) => self.focus_next(),
            (_, KeyCode::BackTab | KeyCode::Up) => self.focus_prev(),

            (Focus::SelectorKind(i), KeyCode::Right | KeyCode::Char(' ' | 'l')) => {
                self.cycle_kind(i, true);
            }
            (Focus::SelectorKind(i), KeyCode::Left | KeyCode::Char('h')) => {
                self.cycle_kind(i, false);
            }
            (Focus::SelectorKind(_), KeyCode::Enter) => self.focus_next(),

            (Focus::AddSelector, KeyCode::Enter | KeyCode::Char(' ' | '+')) => {
                self.add_selector_row();
            }
            (Focus::Site(i), KeyCode::Enter | KeyCode::Char(' ')) => self.toggle_site(i),
            (Focus::Submit, KeyCode::Enter) => return Ok(self.submit()),

            (Focus::Field(_) | Focus::SelectorValue(_), KeyCode::Char(c)) => {
                self.edit_text(|s| s.push(c));
            }
            (Focus::Field(_) | Focus::SelectorValue(_), KeyCode::Backspace) => {
                self.edit_text(|s| {
                    s.pop();
                });
            }
            (Focus::Field(_) | Focus::SelectorValue(_), KeyCode::Enter) => self.focus_next(),

            _ => {}
        }

        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DataRefreshed(snapshot) => {
                self.sites.clone_from(&snapshot.sites);
                self.clamp_focus();
            }
            Action::CreateFailed(_) => {
                self.submitting = false;
            }
            Action::Tick => {
                if self.submitting {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel_area = overlay::centered_rect(76, area.height.saturating_sub(2), area);
        let inner = overlay::panel(
            frame,
            panel_area,
            "Create Workload Entry",
            theme::ELECTRIC_PURPLE,
        );

        let layout = Layout::vertical([
            Constraint::Min(1),    // form body
            Constraint::Length(1), // status / validation
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let body = self.body();
        let visible = usize::from(layout[0].height.max(1));
        let scroll = body.focus_line.saturating_sub(visible.saturating_sub(2));
        let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(body.lines).scroll((scroll, 0)), layout[0]);

        self.render_footer(frame, layout[1], layout[2]);
    }

    fn id(&self) -> &'static str {
        "CreateForm"
    }
}
