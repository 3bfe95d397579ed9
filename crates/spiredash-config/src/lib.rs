//! Configuration for spiredash.
//!
//! Sources merge in order: built-in defaults, the TOML file, the bare
//! `SPIRE_API_URL` variable, then `SPIREDASH_*` variables. The result is
//! translated into `spiredash_core::DashboardConfig`; CLI flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use spiredash_core::config::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_USER};
use spiredash_core::draft::DEFAULT_PARENT_ID;
use spiredash_core::{DashboardConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Everything the config file and environment can set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// API base URL.
    pub api_url: String,

    /// Seconds between background refreshes (at least 1).
    pub poll_interval_secs: u64,

    /// Parent SPIFFE ID new entries start with.
    pub default_parent_id: String,

    /// Actor name shown in the header.
    pub user: String,

    /// Path to a custom CA certificate (PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            default_parent_id: DEFAULT_PARENT_ID.into(),
            user: DEFAULT_USER.into(),
            ca_cert: None,
            insecure: false,
        }
    }
}

impl Config {
    /// Validate and translate into the runtime config.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let api_url = Url::parse(self.api_url.trim()).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: e.to_string(),
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("unsupported scheme '{}'", api_url.scheme()),
            });
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let user = if self.user.trim().is_empty() {
            DEFAULT_USER.to_owned()
        } else {
            self.user.clone()
        };

        Ok(DashboardConfig {
            api_url,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            default_parent_id: self.default_parent_id.clone(),
            user,
            tls,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "spiredash", "spiredash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("spiredash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::raw().only(&["SPIRE_API_URL"]).map(|_| "api_url".into()))
        .merge(Env::prefixed("SPIREDASH_"))
}

/// Load config from the platform config file + environment.
/// A missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment(path).extract()?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|jail| {
            let config = load_config_from(&jail.directory().join("missing.toml")).unwrap();
            assert_eq!(config, Config::default());

            let dash = config.to_dashboard_config().unwrap();
            assert_eq!(dash.api_url.as_str(), "http://localhost:8081/");
            assert_eq!(dash.poll_interval, Duration::from_secs(5));
            assert_eq!(dash.user, "demo-user");
            assert_eq!(dash.default_parent_id, DEFAULT_PARENT_ID);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    api_url = "http://file-host:9000"
                    poll_interval_secs = 10
                    user = "alice"
                "#,
            )?;
            jail.set_env("SPIREDASH_POLL_INTERVAL_SECS", "2");

            let config = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(config.api_url, "http://file-host:9000");
            assert_eq!(config.poll_interval_secs, 2);
            assert_eq!(config.user, "alice");
            Ok(())
        });
    }

    #[test]
    fn bare_spire_api_url_is_honoured_but_prefixed_wins() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("none.toml");

            jail.set_env("SPIRE_API_URL", "http://bare:8081");
            assert_eq!(load_config_from(&path).unwrap().api_url, "http://bare:8081");

            jail.set_env("SPIREDASH_API_URL", "http://prefixed:8081");
            assert_eq!(load_config_from(&path).unwrap().api_url, "http://prefixed:8081");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_from_tempfile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_parent_id = \"spiffe://corp.example/agent\"").unwrap();
        writeln!(file, "insecure = true").unwrap();

        let config = figment(file.path()).extract::<Config>().unwrap();
        let dash = config.to_dashboard_config().unwrap();
        assert_eq!(dash.default_parent_id, "spiffe://corp.example/agent");
        assert_eq!(dash.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.to_dashboard_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "poll_interval_secs"
        ));
    }

    #[test]
    fn bad_url_rejected() {
        for bad in ["not a url", "ftp://host/"] {
            let config = Config {
                api_url: bad.into(),
                ..Config::default()
            };
            assert!(config.to_dashboard_config().is_err(), "{bad}");
        }
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let config = Config {
            ca_cert: Some(PathBuf::from("/etc/ssl/spire-ca.pem")),
            ..Config::default()
        };
        assert_eq!(
            config.to_dashboard_config().unwrap().tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/spire-ca.pem"))
        );
    }
}
