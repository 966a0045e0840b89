//! Tracing setup.
//!
//! Logs go to a daily-rolling file under `<home>/logs/` so the full-screen
//! terminal UI never gets log lines drawn over it. The filter comes from
//! `STACKSCROLL_LOG` when set, otherwise from the config's `log_level`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Env var holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "STACKSCROLL_LOG";

const LOG_FILE_PREFIX: &str = "stackscroll.log";

/// Installs the global subscriber, writing to `<home>/logs/`.
///
/// The returned guard flushes buffered lines on drop; keep it alive for the
/// whole process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), config.log_filter())
}

/// Installs the global subscriber writing into `dir`.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_in(dir: &Path, default_filter: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}
