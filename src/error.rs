use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup failures — these abort the run before any engine executes.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("input directory does not exist: {0}")]
    MissingInputDirectory(PathBuf),

    #[error("input directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to enumerate input directory {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Per-file or per-stage failure. These are logged and isolated; they never
/// unwind past the worker that produced them, but they flip the run's final
/// exit status to non-zero.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("{file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: worker panicked: {message}")]
    WorkerPanic { file: PathBuf, message: String },

    #[error("DISK merge failed: {0}")]
    Merge(String),

    #[error("deletion failed for {file}: {source}")]
    Deletion {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level run error: anything that stops the whole run outright.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("DISK engine aborted: {0}")]
    DiskAborted(String),

    #[error("failed to build worker thread pool: {0}")]
    WorkerPool(String),
}

pub type RunResult<T> = Result<T, RunError>;
