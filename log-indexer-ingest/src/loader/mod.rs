//! Loader module for the log indexer ingest.
//!
//! Writes normalized documents into the search index in fixed-size chunks,
//! one bulk call per chunk.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use log_indexer_repository::{BulkItem, BulkResponse, SearchSink, SinkError};
use log_indexer_shared::{NormalizedDocument, DEFAULT_CHUNK_SIZE};

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of documents per bulk call.
    pub chunk_size: usize,
    /// Retry attempts for a chunk whose bulk call failed with a transient error.
    pub max_retries: u32,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
    /// Ask the sink to make each chunk searchable before answering.
    pub refresh: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: 0,
            initial_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
            refresh: true,
        }
    }
}

/// A document the sink refused inside an otherwise successful bulk call.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    /// Position of the document in the sequence passed to `load`.
    pub position: usize,
    /// The sink's report for that document, unmodified.
    pub item: BulkItem,
}

/// How a single chunk fared.
#[derive(Debug, Clone)]
pub enum ChunkOutcome {
    /// The bulk call went through. Individual documents may still have failed.
    Written {
        took_ms: u64,
        item_failures: Vec<BulkItemFailure>,
    },
    /// The bulk call failed as a whole.
    Failed { error: SinkError },
}

/// Report for one chunk of a load.
#[derive(Debug, Clone)]
pub struct ChunkReport {
    /// Zero-based chunk number.
    pub chunk: usize,
    /// Position of the chunk's first document in the load input.
    pub offset: usize,
    /// Number of documents in the chunk.
    pub size: usize,
    /// Bulk calls issued for this chunk, retries included.
    pub attempts: u32,
    pub outcome: ChunkOutcome,
}

impl ChunkReport {
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Written { .. })
    }
}

/// Aggregate result of a load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Number of documents handed to the loader.
    pub documents: usize,
    /// One report per chunk, in write order.
    pub chunks: Vec<ChunkReport>,
    /// Document count of the index after the load, if the count query succeeded.
    pub indexed_total: Option<u64>,
}

impl LoadReport {
    pub fn chunks_written(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_written()).count()
    }

    pub fn chunks_failed(&self) -> usize {
        self.chunks.len() - self.chunks_written()
    }

    /// Per-document failures reported by the sink across all written chunks.
    pub fn item_failures(&self) -> impl Iterator<Item = &BulkItemFailure> {
        self.chunks.iter().flat_map(|c| match &c.outcome {
            ChunkOutcome::Written { item_failures, .. } => item_failures.as_slice(),
            ChunkOutcome::Failed { .. } => &[],
        })
    }

    /// Documents carried by chunks whose bulk call went through.
    pub fn documents_written(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.is_written())
            .map(|c| c.size)
            .sum()
    }

    /// Every chunk written and no document refused.
    pub fn is_clean(&self) -> bool {
        self.chunks_failed() == 0 && self.item_failures().next().is_none()
    }
}

/// Loader that writes documents into the search sink.
///
/// The loader is responsible for:
/// - Splitting the document sequence into chunks of at most `chunk_size`
/// - Issuing one bulk call per chunk, strictly one after another
/// - Recording each chunk's outcome without letting a failure stop the rest
/// - Reporting the index's document count once all chunks were attempted
pub struct BulkLoader {
    sink: Arc<dyn SearchSink>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new bulk loader with the given sink.
    pub fn new(sink: Arc<dyn SearchSink>) -> Self {
        Self {
            sink,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new bulk loader with custom configuration.
    pub fn with_config(sink: Arc<dyn SearchSink>, config: LoaderConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Write `documents` into `index`.
    ///
    /// Chunks preserve document order, and chunks are written in order.
    #[instrument(skip(self, index, documents), fields(index = %index, document_count = documents.len()))]
    pub async fn load(&self, index: &str, documents: &[NormalizedDocument]) -> LoadReport {
        let chunk_size = self.config.chunk_size.max(1);
        let mut chunks = Vec::with_capacity(documents.len().div_ceil(chunk_size));

        for (chunk, docs) in documents.chunks(chunk_size).enumerate() {
            let offset = chunk * chunk_size;
            let (result, attempts) = self.bulk_index_with_retry(index, docs).await;

            let outcome = match result {
                Ok(response) => {
                    let item_failures = item_failures(&response, offset);
                    if !item_failures.is_empty() {
                        warn!(
                            chunk = chunk,
                            failed = item_failures.len(),
                            "Sink refused some documents"
                        );
                    }
                    debug!(chunk = chunk, size = docs.len(), took_ms = response.took_ms, "Chunk written");
                    ChunkOutcome::Written {
                        took_ms: response.took_ms,
                        item_failures,
                    }
                }
                Err(e) => {
                    error!(chunk = chunk, size = docs.len(), error = %e, "Chunk write failed");
                    ChunkOutcome::Failed { error: e }
                }
            };

            chunks.push(ChunkReport {
                chunk,
                offset,
                size: docs.len(),
                attempts,
                outcome,
            });
        }

        let indexed_total = match self.sink.count(index).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Failed to count documents");
                None
            }
        };

        let report = LoadReport {
            documents: documents.len(),
            chunks,
            indexed_total,
        };

        info!(
            chunks = report.chunks.len(),
            chunks_failed = report.chunks_failed(),
            item_failures = report.item_failures().count(),
            indexed_total = ?report.indexed_total,
            "Load completed"
        );

        report
    }

    /// Issue the bulk call for one chunk, retrying transient failures with
    /// exponential backoff. Returns the final result and the attempt count.
    async fn bulk_index_with_retry(
        &self,
        index: &str,
        docs: &[NormalizedDocument],
    ) -> (Result<BulkResponse, SinkError>, u32) {
        let mut delay_ms = self.config.initial_retry_delay_ms;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.sink.bulk_index(index, docs, self.config.refresh).await {
                Ok(response) => {
                    if attempt > 1 {
                        info!(attempt = attempt, count = docs.len(), "Bulk index succeeded after retry");
                    }
                    return (Ok(response), attempt);
                }
                Err(e) => {
                    if !e.is_retryable() || attempt > self.config.max_retries {
                        return (Err(e), attempt);
                    }

                    warn!(
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Bulk index failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = std::cmp::min(delay_ms * 2, self.config.max_retry_delay_ms);
                }
            }
        }
    }
}

fn item_failures(response: &BulkResponse, offset: usize) -> Vec<BulkItemFailure> {
    response
        .failed_items()
        .map(|(i, item)| BulkItemFailure {
            position: offset + i,
            item: item.clone(),
        })
        .collect()
}
