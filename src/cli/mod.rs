//! cli
//!
//! Command-line interface for ghstore.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve configuration (TOML file or environment)
//! - Install logging
//! - Open one storage session and delegate to a command handler
//!
//! The CLI layer is thin: every remote interaction goes through
//! [`crate::storage::Backend`].

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use std::path::Path;

use anyhow::{Context as _, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::storage::Backend;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let config = load_config(cli.config.as_deref(), cli.branch.as_deref())?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(config, cli.command))
}

async fn run_async(config: Config, command: Command) -> Result<()> {
    let backend = Backend::new(&config).context("cannot open storage session")?;

    // Ctrl-C stops the command before its next round trip
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = commands::dispatch(command, &backend, &cancel).await;
    watcher.abort();
    backend.close().await;
    result
}

/// Resolve configuration from a file, or the environment when no file is
/// given, then apply the branch override.
pub fn load_config(path: Option<&Path>, branch: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };
    if let Some(branch) = branch.filter(|b| !b.is_empty()) {
        config.branch = branch.to_string();
    }
    Ok(config)
}

/// Install the log subscriber. `RUST_LOG` wins unless `--debug` is set.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("ghstore=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghstore=warn"))
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
