use thiserror::Error;

/// Top-level error type for the `spiredash-api` crate.
///
/// Every failure the REST API can produce lands here: transport failures,
/// non-2xx responses, and body decoding. `spiredash-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// Non-2xx response from an endpoint that reports a generic failure.
    ///
    /// List and delete calls never surface the server's body text.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Non-2xx response whose body text is the user-facing reason.
    ///
    /// Produced by entry creation, where the server explains what it
    /// rejected (duplicate SPIFFE ID, unknown site, ...).
    #[error("{body}")]
    Rejected { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
