// ── Core error types ──
//
// User-facing errors from spiredash-core. Display strings are what the
// dashboard shows; HTTP details stay inside `spiredash-api`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Server responses ─────────────────────────────────────────────
    /// The server refused a mutation and said why.
    #[error("{message}")]
    Rejected { message: String },

    /// A request failed without a usable explanation. `message` already
    /// names the operation ("Failed to delete entry").
    #[error("{message}")]
    RequestFailed { message: String, status: u16 },

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("Entry not found: {id}")]
    EntryNotFound { id: String },

    // ── Form errors ──────────────────────────────────────────────────
    #[error("Selector row {index} does not exist (form has {len})")]
    SelectorIndexOutOfRange { index: usize, len: usize },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Message shown when an action fails, e.g. `Failed to create entry: <reason>`.
    pub fn action_message(&self, action: &str) -> String {
        match self {
            Self::RequestFailed { message, .. } => message.clone(),
            _ => format!("Failed to {action}: {self}"),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<spiredash_api::Error> for CoreError {
    fn from(err: spiredash_api::Error) -> Self {
        match err {
            spiredash_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            spiredash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            spiredash_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            spiredash_api::Error::Status { status, message } => {
                CoreError::RequestFailed { message, status }
            }
            spiredash_api::Error::Rejected { body, .. } => CoreError::Rejected { message: body },
            spiredash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
