//! # Log Indexer Repository
//!
//! This crate provides the interface the ingest pipeline uses to talk to the
//! search sink, the error and response types of that interface, and a
//! concrete implementation for OpenSearch (and Elasticsearch-compatible) APIs.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::SinkConfig;
pub use errors::SinkError;
pub use interfaces::SearchSink;
pub use opensearch::OpenSearchSink;
pub use types::{BulkItem, BulkResponse, CreateIndexOutcome};
