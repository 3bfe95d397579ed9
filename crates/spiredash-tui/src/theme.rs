//! Neon palette and the styles each part of the dashboard draws with.

use ratatui::style::{Color, Modifier, Style};

use spiredash_core::{Badge, BadgeColor};

// ── Palette ───────────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

fn bold(color: Color) -> Style {
    fg(color).add_modifier(Modifier::BOLD)
}

// ── Sync badges ───────────────────────────────────────────────────────

pub fn badge_color(color: BadgeColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

/// White bold text on the status colour.
pub fn badge_style(badge: &Badge) -> Style {
    bold(badge_color(badge.foreground)).bg(badge_color(badge.background))
}

// ── Chrome ────────────────────────────────────────────────────────────

pub fn title_style() -> Style {
    bold(NEON_CYAN)
}

pub fn border_focused() -> Style {
    fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    fg(BORDER_GRAY)
}

pub fn tab_active() -> Style {
    bold(ELECTRIC_PURPLE)
}

pub fn tab_inactive() -> Style {
    fg(DIM_WHITE)
}

/// Hint text, e.g. `navigate` in `j/k navigate`.
pub fn key_hint() -> Style {
    fg(BORDER_GRAY)
}

/// The key itself in a hint.
pub fn key_hint_key() -> Style {
    bold(NEON_CYAN)
}

/// Section heading inside an overlay.
pub fn heading() -> Style {
    fg(NEON_CYAN)
}

/// Body text of dialogs and toasts.
pub fn body() -> Style {
    fg(DIM_WHITE)
}

pub fn error_text() -> Style {
    fg(ERROR_RED)
}

pub fn pending_text() -> Style {
    fg(ELECTRIC_YELLOW)
}

pub fn throbber() -> Style {
    fg(ELECTRIC_PURPLE)
}

// ── Tables ────────────────────────────────────────────────────────────

pub fn table_header() -> Style {
    bold(NEON_CYAN).add_modifier(Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    bold(ELECTRIC_PURPLE).bg(BG_HIGHLIGHT)
}

// ── Workload data ─────────────────────────────────────────────────────

/// Field label in detail panels, cards, and the form.
pub fn label() -> Style {
    fg(DIM_WHITE)
}

/// Field value next to a [`label`].
pub fn value() -> Style {
    fg(NEON_CYAN)
}

pub fn spiffe_id() -> Style {
    fg(NEON_CYAN)
}

pub fn selector() -> Style {
    fg(LIGHT_BLUE)
}

/// Site names and audit actors.
pub fn site_name() -> Style {
    fg(CORAL)
}
