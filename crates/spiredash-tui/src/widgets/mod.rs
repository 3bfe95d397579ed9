//! Reusable widgets and formatting helpers.

pub mod create_form;
pub mod entry_detail;
pub mod fmt;
pub mod overlay;
pub mod status_badge;
