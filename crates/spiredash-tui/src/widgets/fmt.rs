//! Text formatting helpers shared by the tabs and overlays.

use chrono::{DateTime, Local, Utc};

/// Placeholder for values the server did not send.
pub const NONE: &str = "─";

/// Timestamp in the viewer's local time zone.
pub fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || NONE.to_owned(),
        |ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// First `len` characters of an id followed by `...`.
pub fn short_id(id: &str, len: usize) -> String {
    let head: String = id.chars().take(len).collect();
    format!("{head}...")
}

/// `resource_type/abcd1234...` for the audit resource column.
pub fn fmt_resource(resource_type: &str, resource_id: &str) -> String {
    format!("{resource_type}/{}", short_id(resource_id, 8))
}

/// Clip `s` to `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let keep = max.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

/// Placeholder for blank strings.
pub fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { NONE } else { s }
}
