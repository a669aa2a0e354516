//! Sink error types.
//!
//! This module defines the error types that can occur while talking to the
//! search sink. Every variant maps to the `SinkUnavailable` condition of the
//! ingest pipeline; the variants only record which call failed.

use thiserror::Error;

/// Errors that can occur during search sink operations.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// Failed to reach the sink or build the transport.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The sink answered with an unexpected status code.
    #[error("Request failed with status {status}: {body}")]
    RequestError { status: u16, body: String },

    /// Failed to create the target index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The document count query failed.
    #[error("Count error: {0}")]
    CountError(String),

    /// An ad-hoc search query failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse a response from the sink.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SinkError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error from a status code and response body.
    pub fn request(status: u16, body: impl Into<String>) -> Self {
        Self::RequestError {
            status,
            body: body.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a count error.
    pub fn count(msg: impl Into<String>) -> Self {
        Self::CountError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether retrying the same call may succeed (transient failures).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::RequestError { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::IndexCreationError(_)
            | Self::CountError(_)
            | Self::QueryError(_)
            | Self::ParseError(_) => false,
        }
    }
}
