//! Search response parsing.

use serde_json::Value;

use log_indexer_shared::SearchHit;

/// Extract the hits of a search response.
///
/// Missing `hits.hits` yields no hits rather than an error.
pub(crate) fn parse_hits(body: &Value) -> Vec<SearchHit> {
    body.get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(|hits| hits.iter().map(parse_hit).collect())
        .unwrap_or_default()
}

fn parse_hit(hit: &Value) -> SearchHit {
    SearchHit {
        id: hit.get("_id").and_then(Value::as_str).map(String::from),
        score: hit.get("_score").and_then(Value::as_f64),
        source: hit.get("_source").cloned().unwrap_or(Value::Null),
    }
}
