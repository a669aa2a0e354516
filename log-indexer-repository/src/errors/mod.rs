//! Error types for the log indexer repository.

mod sink_error;

pub use sink_error::SinkError;
