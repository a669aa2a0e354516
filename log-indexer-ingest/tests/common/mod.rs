//! Shared helpers for the ingest integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use log_indexer_repository::{BulkItem, BulkResponse, CreateIndexOutcome, SearchSink, SinkError};
use log_indexer_shared::{NormalizedDocument, SearchHit};

/// In-memory sink recording every call it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub indices: Mutex<HashMap<String, Value>>,
    pub documents: Mutex<HashMap<String, Vec<NormalizedDocument>>>,
    pub bulk_sizes: Mutex<Vec<usize>>,
    pub create_calls: Mutex<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bulk_sizes(&self) -> Vec<usize> {
        self.bulk_sizes.lock().await.clone()
    }

    pub async fn stored(&self, index: &str) -> Vec<NormalizedDocument> {
        self.documents
            .lock()
            .await
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn mappings(&self, index: &str) -> Option<Value> {
        self.indices.lock().await.get(index).cloned()
    }
}

#[async_trait]
impl SearchSink for RecordingSink {
    async fn index_exists(&self, index: &str) -> Result<bool, SinkError> {
        Ok(self.indices.lock().await.contains_key(index))
    }

    async fn create_index(
        &self,
        index: &str,
        mappings: &Value,
    ) -> Result<CreateIndexOutcome, SinkError> {
        *self.create_calls.lock().await += 1;
        let mut indices = self.indices.lock().await;
        if indices.contains_key(index) {
            return Ok(CreateIndexOutcome::AlreadyExists);
        }
        indices.insert(index.to_string(), mappings.clone());
        Ok(CreateIndexOutcome::Created)
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[NormalizedDocument],
        _refresh: bool,
    ) -> Result<BulkResponse, SinkError> {
        self.bulk_sizes.lock().await.push(documents.len());
        self.documents
            .lock()
            .await
            .entry(index.to_string())
            .or_default()
            .extend_from_slice(documents);

        Ok(BulkResponse {
            took_ms: 1,
            errors: false,
            items: documents
                .iter()
                .map(|doc| BulkItem {
                    status: 201,
                    id: doc.id().map(str::to_string),
                    error: None,
                })
                .collect(),
        })
    }

    async fn count(&self, index: &str) -> Result<u64, SinkError> {
        Ok(self
            .documents
            .lock()
            .await
            .get(index)
            .map_or(0, |docs| docs.len() as u64))
    }

    async fn search(&self, index: &str, _query: &Value) -> Result<Vec<SearchHit>, SinkError> {
        Ok(self
            .stored(index)
            .await
            .into_iter()
            .map(|doc| SearchHit {
                id: doc.id().map(str::to_string),
                score: Some(1.0),
                source: doc.into_value(),
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool, SinkError> {
        Ok(true)
    }
}
