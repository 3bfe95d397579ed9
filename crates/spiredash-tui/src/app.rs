//! Application core: event loop, tab management, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use spiredash_core::{ApiHealth, AuditQuery, Dashboard, Draft, RefreshStatus, Snapshot};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader, Rates};
use crate::screen::TabId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::create_form::CreateForm;
use crate::widgets::entry_detail::EntryDetail;
use crate::widgets::fmt::{fmt_timestamp, truncate};
use crate::widgets::overlay;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    /// Current tab.
    active_tab: TabId,
    /// One screen component per tab.
    screens: HashMap<TabId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Action sender. Background tasks report back through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver, drained by the main loop.
    action_rx: mpsc::UnboundedReceiver<Action>,
    dashboard: Dashboard,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Blocking error modal for a failed create or delete.
    alert: Option<String>,
    create_form: Option<CreateForm>,
    detail: Option<EntryDetail>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Latest published snapshot, for lookups and the status bar.
    snapshot: Arc<Snapshot>,
    refresh_status: RefreshStatus,
    health: ApiHealth,
    /// Entry under the cursor on the Entries tab.
    selected_entry: Option<String>,
    /// Entry id the audit tab is narrowed to.
    audit_filter: Option<String>,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<TabId, Box<dyn Component>> = create_screens().into_iter().collect();

        Self {
            active_tab: TabId::default(),
            screens,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            dashboard,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            alert: None,
            create_form: None,
            detail: None,
            notification: None,
            snapshot: Arc::new(Snapshot::default()),
            refresh_status: RefreshStatus::default(),
            health: ApiHealth::default(),
            selected_entry: None,
            audit_filter: None,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_tab) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        self.init_screens()?;

        let dashboard = self.dashboard.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        let bridge = tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(dashboard, tx, cancel).await;
        });

        let mut events = EventReader::spawn(Rates::default(), self.data_cancel.child_token());

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        // Stops the input reader, the bridge, and with it the poller
        self.data_cancel.cancel();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Modals capture input first; global
    /// keys come next, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.alert.is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Action::DismissAlert),
                _ => None,
            });
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if let Some(form) = self.create_form.as_mut() {
            return form.handle_key_event(key);
        }

        if let Some(detail) = self.detail.as_mut() {
            return detail.handle_key_event(key);
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),

            // Tab navigation via number keys
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => {
                let tab = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(TabId::from_number);
                if let Some(tab) = tab {
                    return Ok(Some(Action::SwitchTab(tab)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchTab(self.active_tab.next())));
            }
            (_, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchTab(self.active_tab.prev())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_tab) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::SwitchTab(target) => {
                if *target != self.active_tab {
                    debug!("switching tab: {} → {}", self.active_tab, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_tab) {
                        screen.set_focused(false);
                    }
                    self.active_tab = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_tab) {
                        screen.set_focused(true);
                    }

                    // The audit trail is fetched on arrival, not polled
                    if *target == TabId::Audit {
                        self.action_tx.send(Action::RequestAuditLogs)?;
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if let Some(form) = self.create_form.as_mut() {
                    form.update(action)?;
                }
                self.update_active_screen(action)?;
            }

            // ── Data ──────────────────────────────────────────────────
            Action::DataRefreshed(snapshot) => {
                self.snapshot = Arc::clone(snapshot);
                if let Some(form) = self.create_form.as_mut() {
                    form.update(action)?;
                }
                self.broadcast(action)?;
            }

            Action::RefreshStatusChanged(status) => {
                self.refresh_status = status.clone();
                self.broadcast(action)?;
            }

            Action::HealthChanged(health) => {
                self.health = health.clone();
            }

            Action::AuditLogsUpdated(_) | Action::AuditFilterChanged(_) => {
                self.broadcast(action)?;
            }

            Action::SelectEntry(id) => {
                self.selected_entry.clone_from(id);
            }

            Action::Refresh => self.spawn_refresh(),

            Action::RequestAuditLogs => self.spawn_audit_fetch(),

            Action::ToggleAuditFilter => {
                let next = if self.audit_filter.is_some() {
                    None
                } else if let Some(id) = &self.selected_entry {
                    Some(id.clone())
                } else {
                    self.action_tx.send(Action::Notify(Notification::info(
                        "Select an entry on the Entries tab first",
                    )))?;
                    return Ok(());
                };
                self.audit_filter.clone_from(&next);
                self.action_tx.send(Action::AuditFilterChanged(next))?;
                self.action_tx.send(Action::RequestAuditLogs)?;
            }

            // ── Create ────────────────────────────────────────────────
            Action::OpenCreateForm => {
                if self.create_form.is_none() {
                    self.create_form = Some(CreateForm::new(
                        self.dashboard.new_draft(),
                        self.snapshot.sites.clone(),
                    ));
                }
            }

            Action::CloseCreateForm => {
                self.create_form = None;
            }

            Action::SubmitDraft(draft) => self.spawn_create(draft.as_ref().clone()),

            Action::CreateSucceeded(entry) => {
                self.create_form = None;
                self.action_tx.send(Action::Notify(Notification::success(format!(
                    "Created {}",
                    entry.spiffe_id
                ))))?;
            }

            Action::CreateFailed(message) => {
                self.alert = Some(message.clone());
                if let Some(form) = self.create_form.as_mut() {
                    form.update(action)?;
                }
            }

            // ── Delete ────────────────────────────────────────────────
            Action::RequestDelete(id) => {
                let spiffe_id = self
                    .snapshot
                    .entries
                    .iter()
                    .find(|e| e.id == *id)
                    .map_or_else(|| id.clone(), |e| e.spiffe_id.clone());
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::DeleteEntry {
                        id: id.clone(),
                        spiffe_id,
                    }))?;
            }

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            Action::DeleteSucceeded(id) => {
                if self.detail.as_ref().is_some_and(|d| d.entry_id() == id) {
                    self.detail = None;
                }
                self.action_tx
                    .send(Action::Notify(Notification::success("Entry deleted")))?;
            }

            Action::DeleteFailed(message) => {
                self.alert = Some(message.clone());
            }

            // ── Detail ────────────────────────────────────────────────
            Action::OpenDetail(id) => {
                let cached = self.dashboard.store().entry_by_id(id);
                self.detail = Some(EntryDetail::new(id.clone(), cached));
                self.spawn_detail_fetch(id.clone());
            }

            Action::DetailLoaded(_) | Action::DetailFailed(_) => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.update(action)?;
                }
            }

            Action::CloseDetail => {
                self.detail = None;
            }

            // ── Alerts / notifications ────────────────────────────────
            Action::ShowAlert(message) => {
                self.alert = Some(message.clone());
            }

            Action::DismissAlert => {
                self.alert = None;
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            Action::Resize(..) | Action::Render => {}
        }

        Ok(())
    }

    /// Data updates go to ALL screens so inactive tabs stay current.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn update_active_screen(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_tab) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Background requests ───────────────────────────────────────

    /// Refetch entries and sites, and re-probe health. Failures land on
    /// the banner through the store's refresh status.
    fn spawn_refresh(&self) {
        let dashboard = self.dashboard.clone();
        tokio::spawn(async move {
            let (refreshed, _) = tokio::join!(dashboard.refresh(), dashboard.check_health());
            if let Err(e) = refreshed {
                debug!(error = %e, "manual refresh failed");
            }
        });
    }

    fn spawn_audit_fetch(&self) {
        let query = self
            .audit_filter
            .as_deref()
            .map_or_else(AuditQuery::default, AuditQuery::for_entry);
        let dashboard = self.dashboard.clone();
        tokio::spawn(async move {
            // Logged by the dashboard; the last list stays up.
            let _ = dashboard.refresh_audit_logs(&query).await;
        });
    }

    fn spawn_create(&self, draft: Draft) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match dashboard.create_entry(&draft).await {
                Ok(entry) => {
                    let _ = tx.send(Action::CreateSucceeded(Box::new(entry)));
                }
                Err(e) => {
                    warn!(error = %e, "create entry failed");
                    let _ = tx.send(Action::CreateFailed(e.action_message("create entry")));
                }
            }
        });
    }

    fn spawn_detail_fetch(&self, id: String) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match dashboard.get_entry(&id).await {
                Ok(entry) => {
                    let _ = tx.send(Action::DetailLoaded(Box::new(entry)));
                }
                Err(e) => {
                    warn!(error = %e, id, "entry detail fetch failed");
                    let _ = tx.send(Action::DetailFailed(e.to_string()));
                }
            }
        });
    }

    /// Run a confirmed action in the background.
    fn execute_confirm(&self, confirm: ConfirmAction) {
        match confirm {
            ConfirmAction::DeleteEntry { id, spiffe_id } => {
                info!(id, spiffe_id, "deleting entry");
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match dashboard.delete_entry(&id).await {
                        Ok(()) => {
                            let _ = tx.send(Action::DeleteSucceeded(id));
                        }
                        Err(e) => {
                            warn!(error = %e, id, "delete entry failed");
                            let message = e.action_message("delete entry");
                            let _ = tx.send(Action::DeleteFailed(message));
                        }
                    }
                });
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let banner_height = u16::from(self.refresh_status.error.is_some());

        // Layout: [header] [error banner] [tab content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        if let Some(err) = &self.refresh_status.error {
            Self::render_error_banner(frame, layout[1], err);
        }
        if let Some(screen) = self.screens.get(&self.active_tab) {
            screen.render(frame, layout[2]);
        }
        self.render_tab_bar(frame, layout[3]);
        self.render_status_bar(frame, layout[4]);

        // Overlays on top (order matters: last = topmost)
        if let Some(detail) = &self.detail {
            detail.render(frame, layout[2]);
        }
        if let Some(form) = &self.create_form {
            form.render(frame, layout[2]);
        }
        if let Some((notif, _)) = &self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(confirm) = &self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }
        if let Some(message) = &self.alert {
            Self::render_alert(frame, area, message);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" SPIRE Workload Management", theme::title_style()),
            Span::styled("  │  ", theme::key_hint()),
            Span::styled("user ", theme::key_hint()),
            Span::styled(
                self.dashboard.config().user.clone(),
                theme::site_name(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_error_banner(frame: &mut Frame, area: Rect, err: &str) {
        let line = Line::from(vec![
            Span::styled(
                format!(" Error: {err} "),
                Style::default()
                    .fg(theme::ERROR_RED)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" r ", theme::key_hint_key()),
            Span::styled("retry", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(theme::BG_HIGHLIGHT)),
            area,
        );
    }

    /// Render the bottom tab bar.
    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = TabId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_tab {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                TabId::ALL
                    .iter()
                    .position(|&t| t == self.active_tab)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Render the bottom status bar with API health and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let health = match &self.health {
            ApiHealth::Healthy => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ApiHealth::Unreachable(_) => {
                Span::styled("○ unreachable", Style::default().fg(theme::ERROR_RED))
            }
            ApiHealth::Unknown => {
                Span::styled("◐ checking", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
        };

        let updated = Span::styled(
            format!(" │ updated {}", fmt_timestamp(self.snapshot.fetched_at)),
            theme::key_hint(),
        );
        let hints = Span::styled(" │ r refresh  ? help  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), health, updated, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = overlay::centered_rect(60, 24, area);
        let inner = overlay::panel(frame, help_area, "Keyboard Shortcuts", theme::ELECTRIC_PURPLE);

        let key = |k: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {k:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };
        let heading = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                theme::heading(),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Navigation"),
            key("1-3", "Jump to tab"),
            key("Tab", "Next tab"),
            key("j/k ↑/↓", "Move up/down"),
            key("g/G", "Top / bottom"),
            key("Ctrl+d/u", "Page down / up"),
            Line::from(""),
            heading("Entries"),
            key("Enter", "Entry details"),
            key("n", "New entry"),
            key("d", "Delete entry"),
            Line::from(""),
            heading("Audit Log"),
            key("f", "Only the selected entry / all"),
            key("R", "Reload"),
            Line::from(""),
            heading("Global"),
            key("r", "Refresh now"),
            key("?", "This help"),
            key("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                         Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a centered confirmation dialog.
    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let dialog_area = overlay::centered_rect(56, 8, area);
        let inner = overlay::panel(frame, dialog_area, "Confirm", theme::ELECTRIC_YELLOW);

        let ConfirmAction::DeleteEntry { spiffe_id, .. } = confirm;
        let text = vec![
            Line::from(Span::styled(
                confirm.to_string(),
                theme::body(),
            )),
            Line::from(Span::styled(
                spiffe_id.clone(),
                theme::spiffe_id(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
    }

    /// Render the blocking error modal.
    fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
        let alert_area = overlay::centered_rect(60, 7, area);
        let inner = overlay::panel(frame, alert_area, "Error", theme::ERROR_RED);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.to_owned(),
                theme::body(),
            ))
            .wrap(Wrap { trim: true }),
            layout[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("dismiss", theme::key_hint()),
            ])),
            layout[1],
        );
    }

    /// Render a notification toast in the bottom-right corner.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 60)
            .min(area.width.saturating_sub(2));
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height).intersection(area);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme::BG_DARK));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(
                truncate(&notif.message, usize::from(inner.width.saturating_sub(3))),
                theme::body(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crossterm::event::{KeyEventKind, KeyEventState};
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use spiredash_core::{DashboardConfig, DraftField, SelectorField};

    use super::*;
    use crate::test_support::{buffer_text, entry, snapshot, synced_site};

    const WAIT: Duration = Duration::from_secs(5);

    async fn setup() -> (MockServer, App) {
        let server = MockServer::start().await;
        let config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
        let app = App::new(Dashboard::new(config).unwrap());
        (server, app)
    }

    fn entry_json(id: &str, spiffe_id: &str) -> serde_json::Value {
        json!({
            "ID": id,
            "SpiffeID": spiffe_id,
            "ParentID": "spiffe://example.org/spire/agent/k8s_sat/demo/default",
            "Selectors": [{ "Type": "k8s:ns", "Value": "prod" }],
            "TTL": 3600,
            "CreatedBy": "demo-user",
        })
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn drain(app: &mut App) -> Vec<Action> {
        let mut queued = Vec::new();
        while let Ok(action) = app.action_rx.try_recv() {
            queued.push(action);
        }
        queued
    }

    /// Process queued actions until `done` matches one of them.
    async fn pump_until(app: &mut App, done: impl Fn(&Action) -> bool) -> Action {
        tokio::time::timeout(WAIT, async {
            loop {
                let action = app.action_rx.recv().await.unwrap();
                app.process_action(&action).unwrap();
                if done(&action) {
                    return action;
                }
            }
        })
        .await
        .unwrap()
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    async fn request_count(server: &MockServer, url_path: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == url_path)
            .count()
    }

    // ── Tabs ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn entering_audit_requests_logs_once() {
        let (_server, mut app) = setup().await;

        app.process_action(&Action::SwitchTab(TabId::Audit)).unwrap();
        let queued = drain(&mut app);
        assert_eq!(
            queued
                .iter()
                .filter(|a| matches!(a, Action::RequestAuditLogs))
                .count(),
            1
        );

        // Staying on the tab or redrawing does not fetch again
        app.process_action(&Action::SwitchTab(TabId::Audit)).unwrap();
        app.process_action(&Action::Render).unwrap();
        assert!(drain(&mut app).is_empty());

        app.process_action(&Action::SwitchTab(TabId::Sites)).unwrap();
        assert!(drain(&mut app).is_empty());
    }

    #[tokio::test]
    async fn number_keys_switch_tabs() {
        let (_server, mut app) = setup().await;
        let action = app.handle_key_event(press(KeyCode::Char('2'))).unwrap();
        assert!(matches!(action, Some(Action::SwitchTab(TabId::Sites))));
        let action = app.handle_key_event(press(KeyCode::Tab)).unwrap();
        assert!(matches!(action, Some(Action::SwitchTab(TabId::Sites))));
    }

    #[tokio::test]
    async fn empty_entries_with_one_site() {
        let (_server, mut app) = setup().await;
        app.process_action(&Action::DataRefreshed(snapshot(
            vec![],
            vec![synced_site("site-1", "us-east")],
        )))
        .unwrap();
        app.process_action(&Action::RefreshStatusChanged(RefreshStatus::default()))
            .unwrap();

        let text = render(&app, 120, 30);
        assert!(text.contains("SPIRE Workload Management"), "{text}");
        assert!(text.contains("demo-user"), "{text}");
        assert!(text.contains("Workload Entries (0)"), "{text}");
        assert!(text.contains("No workload entries found"), "{text}");
        assert!(text.contains("1 Entries"), "{text}");
        assert!(!text.contains("Error:"), "{text}");

        app.process_action(&Action::SwitchTab(TabId::Sites)).unwrap();
        let text = render(&app, 120, 30);
        assert!(text.contains("Configured Sites (1)"), "{text}");
        assert!(text.contains("us-east-1"), "{text}");
        assert!(text.contains(" SYNCED "), "{text}");
    }

    #[tokio::test]
    async fn audit_tab_without_logs() {
        let (_server, mut app) = setup().await;
        app.process_action(&Action::SwitchTab(TabId::Audit)).unwrap();
        app.process_action(&Action::AuditLogsUpdated(Arc::new(Vec::new())))
            .unwrap();
        let text = render(&app, 120, 30);
        assert!(text.contains("No audit logs found"), "{text}");
    }

    #[tokio::test]
    async fn audit_filter_needs_a_selection() {
        let (_server, mut app) = setup().await;

        app.process_action(&Action::ToggleAuditFilter).unwrap();
        let queued = drain(&mut app);
        assert!(matches!(
            queued.as_slice(),
            [Action::Notify(n)] if n.level == NotificationLevel::Info
        ));
        assert!(app.audit_filter.is_none());

        app.process_action(&Action::SelectEntry(Some("e-1".into())))
            .unwrap();
        app.process_action(&Action::ToggleAuditFilter).unwrap();
        assert_eq!(app.audit_filter.as_deref(), Some("e-1"));
        let queued = drain(&mut app);
        assert!(matches!(
            queued.as_slice(),
            [Action::AuditFilterChanged(Some(id)), Action::RequestAuditLogs] if id == "e-1"
        ));

        app.process_action(&Action::ToggleAuditFilter).unwrap();
        assert!(app.audit_filter.is_none());
    }

    // ── Refresh ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn failed_refresh_shows_banner_and_retry_refetches_both() {
        let (server, mut app) = setup().await;
        for p in ["/api/v1/entries", "/api/v1/sites"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(
                    ResponseTemplate::new(500)
                        .set_body_string("boom")
                        .set_delay(Duration::from_millis(50)),
                )
                .mount(&server)
                .await;
        }

        let mut status = app.dashboard.store().subscribe_refresh_status();
        app.process_action(&Action::Refresh).unwrap();
        let failed = tokio::time::timeout(WAIT, async {
            loop {
                status.changed().await.unwrap();
                let s = status.borrow_and_update().clone();
                if !s.loading && s.error.is_some() {
                    return s;
                }
            }
        })
        .await
        .unwrap();

        app.process_action(&Action::RefreshStatusChanged(failed)).unwrap();
        let text = render(&app, 120, 30);
        assert!(text.contains("Error:"), "{text}");
        assert!(text.contains("retry"), "{text}");

        let retry = app.handle_key_event(press(KeyCode::Char('r'))).unwrap();
        assert!(matches!(retry, Some(Action::Refresh)));
        app.process_action(&Action::Refresh).unwrap();

        tokio::time::timeout(WAIT, async {
            while request_count(&server, "/api/v1/entries").await < 2
                || request_count(&server, "/api/v1/sites").await < 2
            {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    // ── Create ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_success_closes_form_and_refreshes() {
        let (server, mut app) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entries"))
            .and(body_partial_json(json!({
                "spiffe_id": "spiffe://example.org/web",
                "selectors": [{ "type": "k8s:ns", "value": "prod" }],
                "site_ids": ["site-1"],
                "ttl": 3600,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(entry_json("e-9", "spiffe://example.org/web")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [entry_json("e-9", "spiffe://example.org/web")],
                "total_count": 1,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sites": null })))
            .mount(&server)
            .await;

        app.process_action(&Action::OpenCreateForm).unwrap();
        assert!(app.create_form.is_some());

        let draft = Draft::default()
            .with_field(DraftField::SpiffeId, "spiffe://example.org/web")
            .with_field(DraftField::ParentId, "spiffe://example.org/agent")
            .with_selector_updated(0, SelectorField::Kind, "k8s:ns")
            .unwrap()
            .with_selector_updated(0, SelectorField::Value, "prod")
            .unwrap()
            .with_site_toggled("site-1");
        let mut snapshots = app.dashboard.store().subscribe_snapshot();
        app.process_action(&Action::SubmitDraft(Box::new(draft)))
            .unwrap();

        pump_until(&mut app, |a| matches!(a, Action::CreateSucceeded(_))).await;
        assert!(app.create_form.is_none());
        assert!(app.alert.is_none());

        let queued = drain(&mut app);
        assert!(queued.iter().any(|a| matches!(
            a,
            Action::Notify(n) if n.level == NotificationLevel::Success
        )));

        // The refresh after create follows in the background
        tokio::time::timeout(WAIT, snapshots.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshots.borrow().entries.len(), 1);
    }

    #[tokio::test]
    async fn create_failure_keeps_form_and_blocks_with_alert() {
        let (_server, mut app) = setup().await;
        app.process_action(&Action::OpenCreateForm).unwrap();
        app.process_action(&Action::CreateFailed(
            "Failed to create entry: spiffe_id already registered".into(),
        ))
        .unwrap();

        assert!(app.create_form.is_some());
        assert_eq!(
            app.alert.as_deref(),
            Some("Failed to create entry: spiffe_id already registered")
        );

        let text = render(&app, 120, 30);
        assert!(text.contains("already registered"), "{text}");

        // The alert swallows everything but Enter/Esc
        assert!(app.handle_key_event(press(KeyCode::Char('q'))).unwrap().is_none());
        let dismiss = app.handle_key_event(press(KeyCode::Enter)).unwrap();
        assert!(matches!(dismiss, Some(Action::DismissAlert)));
        app.process_action(&Action::DismissAlert).unwrap();
        assert!(app.alert.is_none());
        assert!(app.create_form.is_some());
    }

    // ── Delete ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let (server, mut app) = setup().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(0)
            .mount(&server)
            .await;

        app.process_action(&Action::DataRefreshed(snapshot(
            vec![entry("e-1", "spiffe://example.org/web")],
            vec![],
        )))
        .unwrap();
        drain(&mut app);

        app.process_action(&Action::RequestDelete("e-1".into()))
            .unwrap();
        for action in drain(&mut app) {
            app.process_action(&action).unwrap();
        }
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::DeleteEntry {
                id: "e-1".into(),
                spiffe_id: "spiffe://example.org/web".into(),
            })
        );
        let text = render(&app, 120, 30);
        assert!(text.contains("removed from all sites"), "{text}");

        let no = app.handle_key_event(press(KeyCode::Char('n'))).unwrap();
        assert!(matches!(no, Some(Action::ConfirmNo)));
        app.process_action(&Action::ConfirmNo).unwrap();
        assert!(app.pending_confirm.is_none());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(drain(&mut app).is_empty());
        assert_eq!(request_count(&server, "/api/v1/entries/e-1").await, 0);
    }

    #[tokio::test]
    async fn confirmed_delete_failure_raises_alert() {
        let (server, mut app) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/entries/e-1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        app.process_action(&Action::ShowConfirm(ConfirmAction::DeleteEntry {
            id: "e-1".into(),
            spiffe_id: "spiffe://example.org/web".into(),
        }))
        .unwrap();
        app.process_action(&Action::ConfirmYes).unwrap();

        pump_until(&mut app, |a| matches!(a, Action::DeleteFailed(_))).await;
        assert_eq!(app.alert.as_deref(), Some("Failed to delete entry"));
    }

    #[tokio::test]
    async fn delete_success_closes_matching_detail() {
        let (_server, mut app) = setup().await;
        app.detail = Some(EntryDetail::new("e-1".into(), None));

        app.process_action(&Action::DeleteSucceeded("e-2".into()))
            .unwrap();
        assert!(app.detail.is_some());

        app.process_action(&Action::DeleteSucceeded("e-1".into()))
            .unwrap();
        assert!(app.detail.is_none());
    }

    // ── Detail ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn detail_loads_full_entry() {
        let (server, mut app) = setup().await;
        let mut body = entry_json("e-1", "spiffe://example.org/web");
        body["Description"] = json!("checkout frontend");
        body["SiteStatuses"] = json!([{
            "SiteID": "site-eu",
            "SiteName": "eu-west",
            "Status": "failed",
            "SpireEntryID": "",
            "SyncError": "spire server unreachable",
        }]);
        Mock::given(method("GET"))
            .and(path("/api/v1/entries/e-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        app.process_action(&Action::OpenDetail("e-1".into())).unwrap();
        pump_until(&mut app, |a| matches!(a, Action::DetailLoaded(_))).await;

        let text = render(&app, 120, 40);
        assert!(text.contains("checkout frontend"), "{text}");
        assert!(text.contains("eu-west"), "{text}");
        assert!(text.contains("spire server unreachable"), "{text}");

        let close = app.handle_key_event(press(KeyCode::Esc)).unwrap();
        assert!(matches!(close, Some(Action::CloseDetail)));
    }
}
