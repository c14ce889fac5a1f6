//! Structured logging setup (§10 ambient stack): a run-scoped log file plus
//! a console mirror, in the teacher's `tracing` + `tracing-appender` style.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Must be kept alive for the lifetime of the run — dropping it stops the
/// background flush thread and silently truncates buffered log lines.
pub struct LoggingHandle {
    _file_guard: WorkerGuard,
}

/// Initialize the global `tracing` subscriber: every event goes to
/// `log_dir/duplicate_finder_<timestamp_tag>.log`, and additionally to
/// stderr when `verbose` is set. Returns a guard that must be held for the
/// duration of the run.
pub fn init_logging(
    log_dir: &Path,
    timestamp_tag: &str,
    verbose: bool,
) -> Result<LoggingHandle, StartupError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        StartupError::Logging(format!("failed to create log directory {log_dir:?}: {e}"))
    })?;

    let file_name = format!("duplicate_finder_{timestamp_tag}.log");
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    let file_writer = non_blocking.with_max_level(tracing::Level::TRACE);

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_ansi(false);

    if verbose {
        let writer = file_writer.and(std::io::stderr);
        builder
            .with_writer(writer)
            .try_init()
            .map_err(|e| StartupError::Logging(format!("failed to install subscriber: {e}")))?;
    } else {
        builder
            .with_writer(file_writer)
            .try_init()
            .map_err(|e| StartupError::Logging(format!("failed to install subscriber: {e}")))?;
    }

    Ok(LoggingHandle { _file_guard: file_guard })
}
