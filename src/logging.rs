//! Tracing setup for the solver server.
//!
//! Every request is handled inside a `solve` span carrying its request id, so the stdout stream
//! and the log file can both be grepped per request. The file defaults to `logs/tds-solver.log`
//! relative to the working directory; `TDS_SOLVER_LOG_FILE` points it elsewhere. File output goes
//! through a non-blocking writer so a slow disk never holds up an answer.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "TDS_SOLVER_LOG_FILE";
const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "tds-solver.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the stdout and file subscribers.
///
/// `RUST_LOG` filters both outputs (default `info`). When the log file cannot be opened the
/// server still starts with stdout logging only. A second call is a no-op, which lets
/// integration tests share one process-wide subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_log_file().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}

fn log_file_path(override_path: Option<String>) -> PathBuf {
    override_path
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(LOG_DIR).join(LOG_FILE_NAME))
}

fn open_log_file() -> Option<NonBlocking> {
    let path = log_file_path(std::env::var(LOG_FILE_ENV).ok());
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
