//! Search sink trait definition.
//!
//! This module defines the abstract interface for the search/index store the
//! pipeline writes into, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SinkError;
use crate::types::{BulkResponse, CreateIndexOutcome};
use log_indexer_shared::{NormalizedDocument, SearchHit};

/// Abstract interface for search sink operations.
///
/// A single sink handle is shared by every pipeline component and every
/// scheduler tick. All calls are addressed by index name.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SinkError>` for consistent error handling.
#[async_trait]
pub trait SearchSink: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index exists
    /// * `Ok(false)` - The index does not exist
    /// * `Err(SinkError)` - If the check could not be performed
    async fn index_exists(&self, index: &str) -> Result<bool, SinkError>;

    /// Create an index with the given field mappings.
    ///
    /// A conflict because the index already exists is not an error; it is
    /// reported as [`CreateIndexOutcome::AlreadyExists`].
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to create
    /// * `mappings` - Mapping body, `{"properties": {...}}`
    async fn create_index(
        &self,
        index: &str,
        mappings: &Value,
    ) -> Result<CreateIndexOutcome, SinkError>;

    /// Write documents in a single bulk call, preserving their order.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index
    /// * `documents` - Documents to write, one index operation each
    /// * `refresh` - Make the writes visible to search before returning
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The call went through; individual documents may
    ///   still have failed and are reported in the response items
    /// * `Err(SinkError)` - If the call as a whole failed
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[NormalizedDocument],
        refresh: bool,
    ) -> Result<BulkResponse, SinkError>;

    /// Count the documents stored in an index.
    async fn count(&self, index: &str) -> Result<u64, SinkError>;

    /// Run an ad-hoc search query against an index.
    async fn search(&self, index: &str, query: &Value) -> Result<Vec<SearchHit>, SinkError>;

    /// Check if the sink is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SinkError>;
}
