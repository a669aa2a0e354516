//! Command-line arguments.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::IndexingError;
use log_indexer_ingest::{Poller, Runner, DEFAULT_COLLECTION_KEY};
use log_indexer_shared::{FieldSelector, DEFAULT_CHUNK_SIZE};

/// Default header carrying the endpoint API token.
pub const DEFAULT_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// Default target index.
pub const DEFAULT_INDEX: &str = "algorand-final";

#[derive(Parser, Debug, Clone)]
#[command(name = "log-indexer")]
#[command(about = "Load records from an endpoint or a log file into a search index", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub struct Cli {
    /// Read items from a local file, one JSON record per line
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Fetch items from a JSON endpoint (needs SOURCE_API_TOKEN)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Index mappings: a builtin schema name or a path to a JSON mappings file
    #[arg(long, value_name = "NAME|PATH")]
    pub mappings: String,

    /// Index name
    #[arg(long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Top-level response key holding the items (endpoint only)
    #[arg(long, default_value = DEFAULT_COLLECTION_KEY)]
    pub collection_key: String,

    /// Read fields from this nested object of each item (e.g. txn)
    #[arg(long)]
    pub record_root: Option<String>,

    /// Comma-separated fields to keep (default: every field)
    #[arg(long, value_name = "A,B,C")]
    pub fields: Option<String>,

    /// Maximum documents per bulk call
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Retries for a chunk failing with a transient sink error
    #[arg(long, default_value_t = 0)]
    pub max_retries: u32,

    /// Repeat the pipeline every SECS seconds (default: run once)
    #[arg(long, value_name = "SECS")]
    pub every: Option<u64>,

    /// Number of scheduled runs, -1 for no limit
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub times: i64,

    /// End the schedule at the first failed run
    #[arg(long)]
    pub stop_on_error: bool,

    /// Request timeout in seconds for the endpoint and the sink
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Header carrying SOURCE_API_TOKEN
    #[arg(long, default_value = DEFAULT_TOKEN_HEADER)]
    pub token_header: String,

    /// Search body to run against the index after every load
    #[arg(long, value_name = "JSON")]
    pub probe_query: Option<String>,
}

/// Where the pipeline reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    File(PathBuf),
    Endpoint(String),
}

impl Cli {
    pub fn source_mode(&self) -> Result<SourceMode, IndexingError> {
        match (&self.file, &self.url) {
            (Some(path), None) => Ok(SourceMode::File(path.clone())),
            (None, Some(url)) => Ok(SourceMode::Endpoint(url.clone())),
            _ => Err(IndexingError::config(
                "exactly one of --file or --url is required",
            )),
        }
    }

    pub fn selector(&self) -> Option<FieldSelector> {
        self.fields
            .as_deref()
            .map(FieldSelector::parse)
            .filter(|selector| !selector.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The schedule to run under, or `None` for a single run.
    pub fn schedule(&self) -> Option<Runner> {
        self.every.map(|secs| {
            Poller::every(secs)
                .for_iterations(self.times)
                .stop_on_error(self.stop_on_error)
        })
    }

    pub fn probe_query(&self) -> Result<Option<serde_json::Value>, IndexingError> {
        self.probe_query
            .as_deref()
            .map(|text| {
                serde_json::from_str(text)
                    .map_err(|e| IndexingError::config(format!("invalid --probe-query: {}", e)))
            })
            .transpose()
    }
}
