//! Interface definitions for the search sink.
//!
//! This module defines the abstract `SearchSink` trait that allows for
//! dependency injection of the sink into every pipeline component and for
//! swapping the backend with test doubles.

mod search_sink;

pub use search_sink::SearchSink;
