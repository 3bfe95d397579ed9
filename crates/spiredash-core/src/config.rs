// ── Runtime dashboard configuration ──
//
// Describes which API to talk to and how often to poll it. Built by the
// TUI (from `spiredash-config` + CLI flags) and handed to `Dashboard`;
// core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::draft::DEFAULT_PARENT_ID;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "http://localhost:8081";

/// Default interval between background refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default actor shown in the header.
pub const DEFAULT_USER: &str = "demo-user";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed ingress certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for spiredash_api::TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// API base URL (e.g. `http://localhost:8081`).
    pub api_url: Url,
    /// Interval between background refreshes. Must be non-zero.
    pub poll_interval: Duration,
    /// Parent ID new drafts start with.
    pub default_parent_id: String,
    /// Actor name shown in the header.
    pub user: String,
    pub tls: TlsVerification,
}

impl DashboardConfig {
    /// Config for `api_url` with every other setting at its default.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_parent_id: DEFAULT_PARENT_ID.to_owned(),
            user: DEFAULT_USER.to_owned(),
            tls: TlsVerification::default(),
        }
    }

    pub(crate) fn transport(&self) -> spiredash_api::TransportConfig {
        spiredash_api::TransportConfig {
            tls: (&self.tls).into(),
        }
    }
}
