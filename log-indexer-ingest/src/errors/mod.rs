//! Error types for the log indexer ingest.

use log_indexer_repository::SinkError;
use thiserror::Error;

/// Errors that end a single pipeline invocation.
///
/// Per-item and per-chunk failures never surface here; they are recovered
/// locally and reported through the processor and loader results.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The endpoint could not be reached or the file could not be read.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The endpoint response is missing the expected structure.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// A sink call needed by the invocation failed.
    #[error("Sink unavailable: {0}")]
    SinkUnavailable(#[from] SinkError),

    /// The pipeline was assembled with invalid settings.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl IngestError {
    /// Create a source unavailable error.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create an unexpected shape error.
    pub fn unexpected_shape(msg: impl Into<String>) -> Self {
        Self::UnexpectedShape(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }
}

/// A raw item that could not be turned into a document.
///
/// Recovered by dropping the item; its position is still consumed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Item {position} dropped: {reason}")]
pub struct ItemParseFailure {
    /// Position of the item in the source sequence.
    pub position: usize,
    /// Why the item was dropped.
    pub reason: String,
}

impl ItemParseFailure {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// Errors that end a schedule early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// An invocation failed while the stop-on-error policy was active.
    #[error("Schedule aborted after attempt {attempt}: {reason}")]
    Aborted { attempt: u64, reason: String },

    /// The scheduler task itself panicked or was torn down.
    #[error("Scheduler task failed: {0}")]
    Join(String),
}
