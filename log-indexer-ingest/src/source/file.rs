//! File source: one raw item per line of a local file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::IngestError;
use log_indexer_shared::RawItem;

/// Reads a whole file and yields its lines as raw text items.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file as UTF-8 and split it on line boundaries.
    ///
    /// A trailing newline produces a trailing empty item; empty and
    /// unparsable lines are left for the processor to drop.
    pub async fn fetch_all(&self) -> Result<Vec<RawItem>, IngestError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            IngestError::source_unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), bytes = text.len(), "Read source file");

        Ok(split_lines(&text))
    }
}

fn split_lines(text: &str) -> Vec<RawItem> {
    text.split('\n')
        .map(|line| RawItem::line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}
