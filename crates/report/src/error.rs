//! Error types for report persistence

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing report output.
///
/// These never escape the public [`crate::Aggregator`] API: the aggregator
/// logs and drops them. They are surfaced only through the `try_*` methods.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Screenshot not found: {0}")]
    ScreenshotMissing(PathBuf),

    #[error("Unknown test handle: {0}")]
    UnknownHandle(usize),
}

pub type ReportResult<T> = Result<T, ReportError>;
