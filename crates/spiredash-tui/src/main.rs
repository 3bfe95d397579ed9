//! `spiredash`: terminal dashboard for SPIFFE/SPIRE workload registration.
//!
//! Built on [ratatui](https://ratatui.rs) with data from `spiredash-core`'s
//! [`Dashboard`](spiredash_core::Dashboard). Three tabs, navigable via
//! number keys (1-3): Entries, Sites, and Audit.
//!
//! Logs are written to a file (default `/tmp/spiredash.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards
//! every store change into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
#[cfg(test)]
mod test_support;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use spiredash_config::Config;
use spiredash_core::Dashboard;

use crate::app::App;

/// Terminal dashboard for SPIFFE/SPIRE workload entries across federated sites.
#[derive(Parser, Debug)]
#[command(name = "spiredash", version, about)]
struct Cli {
    /// API base URL (e.g., http://localhost:8081)
    #[arg(short = 'u', long, env = "SPIRE_API_URL")]
    api_url: Option<String>,

    /// Config file path (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between background refreshes
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Actor name shown in the header
    #[arg(long)]
    user: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/spiredash.log)
    #[arg(long, default_value = "/tmp/spiredash.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr, which
/// belong to the terminal UI. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "spiredash={log_level},spiredash_core={log_level},spiredash_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("spiredash.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + environment, with CLI flags applied on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => spiredash_config::load_config_from(path)?,
        None => spiredash_config::load_config()?,
    };

    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }
    if let Some(user) = &cli.user {
        config.user.clone_from(user);
    }
    if cli.insecure {
        config.insecure = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = load_config(&cli)?.to_dashboard_config()?;
    info!(
        url = %config.api_url,
        poll_secs = config.poll_interval.as_secs(),
        user = %config.user,
        "starting spiredash"
    );

    let dashboard = Dashboard::new(config)?;
    let mut app = App::new(dashboard);
    app.run().await?;

    Ok(())
}
