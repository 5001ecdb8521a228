//! Tracing setup: stdout plus an append-only file in the log directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILENAME: &str = "recruit.log";

const DEFAULT_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records into tracing: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// Path of the log file inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILENAME)
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// If the log file cannot be opened, logging continues on stdout only.
pub fn init(log_dir: &Path) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file = open_log_file(log_dir);
    let file_error = file.as_ref().err().map(ToString::to_string);
    let file_layer = file.ok().map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init()?;

    if let Some(e) = file_error {
        tracing::warn!(
            "Logging to stdout only, cannot open {}: {}",
            log_file_path(log_dir).display(),
            e
        );
    }
    Ok(())
}

fn open_log_file(log_dir: &Path) -> std::io::Result<File> {
    fs::create_dir_all(log_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(log_dir))
}
