//! Request and response types for search sink operations.

use serde_json::Value;

/// Result of a create-index call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateIndexOutcome {
    /// The index was created by this call.
    Created,
    /// The index already existed (created by a racing actor).
    AlreadyExists,
}

/// Outcome of a single document write within a bulk call.
///
/// Carried through as reported by the sink; nothing here is interpreted
/// beyond the status code.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItem {
    /// HTTP-style status reported for this document.
    pub status: u16,
    /// Sink-assigned document ID, if reported.
    pub id: Option<String>,
    /// The sink's error object for a failed write.
    pub error: Option<Value>,
}

impl BulkItem {
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || self.status >= 300
    }
}

/// Parsed response of a bulk write call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkResponse {
    /// Time the sink spent on the call, in milliseconds.
    pub took_ms: u64,
    /// Whether the sink flagged any per-document error.
    pub errors: bool,
    /// Per-document outcomes, in request order.
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    /// Per-document failures with their position within the call.
    pub fn failed_items(&self) -> impl Iterator<Item = (usize, &BulkItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failed_items().count()
    }
}
