//! Processor module for the log indexer ingest.
//!
//! Normalizes raw source items into flat documents for indexing.

mod transformer;

pub use transformer::{TransformConfig, Transformer};
