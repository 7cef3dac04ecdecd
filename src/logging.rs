//! Tracing setup: a compact stdout layer plus an append-only file layer.
//!
//! The log file path comes from [`Config::log_file`](crate::config::Config::log_file). The file
//! layer writes through a `tracing-appender` non-blocking worker whose guard lives for the rest
//! of the process.
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. When `log_file` cannot be opened the error is
/// reported on stderr and only the stdout layer is installed.
pub fn init_tracing(log_file: &Path) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = match file_writer(log_file) {
        Ok(writer) => Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact(),
        ),
        Err(error) => {
            eprintln!("Failed to open log file {}: {error}", log_file.display());
            None
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

fn file_writer(path: &Path) -> io::Result<NonBlocking> {
    let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
    let _ = LOG_GUARD.set(guard);
    Ok(writer)
}

/// Open `path` for appending, creating it and any missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
