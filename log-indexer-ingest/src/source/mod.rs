//! Source module for the log indexer ingest.
//!
//! Acquires the raw items of one pipeline invocation, either from a remote
//! HTTP endpoint or from a local log file.

mod endpoint;
mod file;

pub use endpoint::{EndpointConfig, EndpointSource, DEFAULT_COLLECTION_KEY};
pub use file::FileSource;

use tracing::{info, instrument};

use crate::errors::IngestError;
use log_indexer_shared::RawItem;

/// Where the raw items of an invocation come from.
///
/// Every variant fetches the complete item set in one go; there is no
/// pagination, streaming, or incremental reading.
#[derive(Debug)]
pub enum Source {
    /// A JSON endpoint returning the items under a named top-level key.
    Endpoint(EndpointSource),
    /// A local file holding one item per line.
    File(FileSource),
}

impl Source {
    /// Fetch every raw item the source currently holds.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RawItem>)` - The items, in source order
    /// * `Err(IngestError::SourceUnavailable)` - If the endpoint or file cannot be read
    /// * `Err(IngestError::UnexpectedShape)` - If the endpoint response lacks the item collection
    #[instrument(skip(self), fields(source = %self.describe()))]
    pub async fn fetch_all(&self) -> Result<Vec<RawItem>, IngestError> {
        let items = match self {
            Self::Endpoint(endpoint) => endpoint.fetch_all().await?,
            Self::File(file) => file.fetch_all().await?,
        };

        info!(count = items.len(), "Fetched raw items");
        Ok(items)
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Endpoint(endpoint) => format!("endpoint {}", endpoint.url()),
            Self::File(file) => format!("file {}", file.path().display()),
        }
    }
}

impl From<EndpointSource> for Source {
    fn from(source: EndpointSource) -> Self {
        Self::Endpoint(source)
    }
}

impl From<FileSource> for Source {
    fn from(source: FileSource) -> Self {
        Self::File(source)
    }
}
