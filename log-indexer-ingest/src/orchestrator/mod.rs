//! Orchestrator module for the log indexer ingest.
//!
//! Coordinates the source, transformer, provisioner, and loader components
//! for a single pipeline invocation.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::IngestError;
use crate::loader::{BulkLoader, LoadReport};
use crate::processor::Transformer;
use crate::provisioner::{IndexProvisioner, ProvisionOutcome};
use crate::source::Source;
use log_indexer_shared::IndexSchema;

/// Index the pipeline writes into, and the schema it is created with.
#[derive(Debug, Clone)]
pub struct PipelineTarget {
    pub index_name: String,
    pub schema: IndexSchema,
}

impl PipelineTarget {
    pub fn new(index_name: impl Into<String>, schema: IndexSchema) -> Self {
        Self {
            index_name: index_name.into(),
            schema,
        }
    }
}

/// Result of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Raw items returned by the source.
    pub fetched: usize,
    /// Documents produced by the transformer.
    pub documents: usize,
    /// Items the transformer dropped.
    pub dropped: usize,
    pub provision: ProvisionOutcome,
    pub load: LoadReport,
}

/// Pipeline that runs Source, Transformer, IndexProvisioner and BulkLoader
/// in sequence.
///
/// The pipeline:
/// - Fetches every raw item from the source
/// - Normalizes them into documents
/// - Makes sure the target index exists
/// - Loads the documents in chunks and reports the outcome
pub struct Pipeline {
    source: Source,
    transformer: Transformer,
    provisioner: IndexProvisioner,
    loader: BulkLoader,
    target: PipelineTarget,
    probe_query: Option<Value>,
}

impl Pipeline {
    /// Create a new pipeline with the given components.
    pub fn new(
        source: Source,
        transformer: Transformer,
        provisioner: IndexProvisioner,
        loader: BulkLoader,
        target: PipelineTarget,
    ) -> Self {
        Self {
            source,
            transformer,
            provisioner,
            loader,
            target,
            probe_query: None,
        }
    }

    /// Run `query` against the target index after every load and log the hit count.
    pub fn with_probe_query(mut self, query: Value) -> Self {
        self.probe_query = Some(query);
        self
    }

    pub fn target(&self) -> &PipelineTarget {
        &self.target
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Run one invocation end to end.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineReport)` - The load was attempted; chunk and item
    ///   failures are inside the report
    /// * `Err(IngestError)` - The source could not be read or the index could
    ///   not be provisioned
    #[instrument(skip(self), fields(index = %self.target.index_name, source = %self.source.describe()))]
    pub async fn run_once(&self) -> Result<PipelineReport, IngestError> {
        let items = self.source.fetch_all().await?;
        let fetched = items.len();

        let documents = self.transformer.normalize(items);
        let dropped = fetched - documents.len();

        let provision = self
            .provisioner
            .ensure(&self.target.index_name, &self.target.schema)
            .await?;

        let load = self.loader.load(&self.target.index_name, &documents).await;

        if let Some(query) = &self.probe_query {
            self.probe(query).await;
        }

        info!(
            fetched = fetched,
            documents = documents.len(),
            dropped = dropped,
            chunks_failed = load.chunks_failed(),
            indexed_total = ?load.indexed_total,
            "Pipeline invocation completed"
        );

        Ok(PipelineReport {
            fetched,
            documents: documents.len(),
            dropped,
            provision,
            load,
        })
    }

    async fn probe(&self, query: &Value) {
        match self
            .provisioner
            .sink()
            .search(&self.target.index_name, query)
            .await
        {
            Ok(hits) => info!(hits = hits.len(), "Probe query answered"),
            Err(e) => warn!(error = %e, "Probe query failed"),
        }
    }
}
