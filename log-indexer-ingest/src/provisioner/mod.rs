//! Provisioner module for the log indexer ingest.
//!
//! Creates the target index with its schema when it does not exist yet.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::IngestError;
use log_indexer_repository::{CreateIndexOutcome, SearchSink};
use log_indexer_shared::IndexSchema;

/// What `ensure` had to do for the target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The index was created with the supplied schema.
    Created,
    /// The index was already there; nothing was sent.
    AlreadyExisted,
    /// The index was missing at check time but another actor created it first.
    CreatedConcurrently,
}

/// Idempotent index provisioning against a shared sink.
pub struct IndexProvisioner {
    sink: Arc<dyn SearchSink>,
}

impl IndexProvisioner {
    /// Create a new provisioner using the given sink.
    pub fn new(sink: Arc<dyn SearchSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<dyn SearchSink> {
        &self.sink
    }

    /// Check whether the index exists.
    pub async fn exists(&self, index: &str) -> Result<bool, IngestError> {
        Ok(self.sink.index_exists(index).await?)
    }

    /// Make sure `index` exists, creating it with `schema` if absent.
    ///
    /// An existing index is left untouched; its live mapping is not compared
    /// with `schema`.
    ///
    /// # Returns
    ///
    /// * `Ok(ProvisionOutcome)` - The index exists after the call
    /// * `Err(IngestError::SinkUnavailable)` - If the check or the creation failed
    #[instrument(skip(self, index, schema), fields(index = %index))]
    pub async fn ensure(
        &self,
        index: &str,
        schema: &IndexSchema,
    ) -> Result<ProvisionOutcome, IngestError> {
        if self.exists(index).await? {
            info!("Index already exists");
            return Ok(ProvisionOutcome::AlreadyExisted);
        }

        info!(field_count = schema.len(), "Index does not exist, creating it now");

        match self.sink.create_index(index, &schema.to_mappings()).await? {
            CreateIndexOutcome::Created => Ok(ProvisionOutcome::Created),
            CreateIndexOutcome::AlreadyExists => Ok(ProvisionOutcome::CreatedConcurrently),
        }
    }
}
