//! Search hits returned by ad-hoc probe queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single hit from a search against the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Sink-assigned document ID.
    pub id: Option<String>,
    /// Relevance score, absent for unscored queries.
    pub score: Option<f64>,
    /// The stored document.
    pub source: Value,
}
