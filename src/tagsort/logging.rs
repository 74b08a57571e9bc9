//! Tracing setup for the `tagsort` binary.

use crate::error::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    /// Also write logs here, without colors.
    pub log_file: Option<PathBuf>,
    /// Truncate `log_file` instead of appending to it.
    pub overwrite: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_file: None,
            overwrite: false,
        }
    }
}

impl LogConfig {
    /// The most verbose flag wins.
    pub fn level_from_flags(quiet: bool, verbose: bool, debug: bool) -> Level {
        if debug {
            Level::DEBUG
        } else if verbose {
            Level::INFO
        } else if quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
/// Calling it again once a subscriber is set is a no-op.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_lowercase()));

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(!config.overwrite)
                .truncate(config.overwrite)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(file_layer)
        .try_init();
    Ok(())
}
