//! OpenSearch implementation of the search sink.
//!
//! This module provides a concrete implementation of `SearchSink` using the
//! OpenSearch Rust client.

mod bulk;
mod client;
mod queries;

pub use client::OpenSearchSink;
