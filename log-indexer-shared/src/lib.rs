//! # Log Indexer Shared
//!
//! Data types shared across the log indexer crates: raw source items, the
//! normalized documents written to the sink, field selectors and index schemas.

pub mod document;
pub mod raw_item;
pub mod schema;
pub mod search;
pub mod selector;

pub use document::{NormalizedDocument, DATE_FIELD, ID_FIELD};
pub use raw_item::RawItem;
pub use schema::{FieldType, IndexSchema, SchemaError};
pub use search::SearchHit;
pub use selector::FieldSelector;

/// Maximum number of documents carried by a single bulk write.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
