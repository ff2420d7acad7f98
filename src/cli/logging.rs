//! Logging initialization

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialize logging
///
/// - `--log-file <path>` writes to that file
/// - `--debug` alone writes debug logs to a temporary file
/// - otherwise warnings and errors go to stderr
///
/// Returns the log file path when logging to a file.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<Option<PathBuf>> {
    let level = if debug { "debug" } else { "info" };

    let path = match (log_file, debug) {
        (Some(path), _) => path.to_path_buf(),
        (None, true) => debug_log_path(),
        (None, false) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .with_target(false)
                .init();
            return Ok(None);
        }
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_ansi(false) // No ANSI codes in log file
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(Some(path))
}

/// Named temp file that outlives the process
fn debug_log_path() -> PathBuf {
    tempfile::Builder::new()
        .prefix("kestra-export-")
        .suffix(".log")
        .tempfile()
        .and_then(|f| f.keep().map_err(|e| e.error))
        .map(|(_, path)| path)
        .unwrap_or_else(|_| {
            std::env::temp_dir().join(format!("kestra-export-{}.log", std::process::id()))
        })
}
