//! Bulk request building and bulk response parsing.

use serde_json::{json, Value};

use crate::errors::SinkError;
use crate::types::{BulkItem, BulkResponse};
use log_indexer_shared::NormalizedDocument;

/// Build the newline-delimited operation/document pairs of a bulk call.
///
/// Each document is preceded by an `index` operation naming the target index.
/// No `_id` is set, so the sink assigns one per write.
pub(crate) fn bulk_operations(index: &str, documents: &[NormalizedDocument]) -> Vec<Value> {
    let mut body = Vec::with_capacity(documents.len() * 2);

    for doc in documents {
        body.push(json!({ "index": { "_index": index } }));
        body.push(Value::Object(doc.as_map().clone()));
    }

    body
}

/// Parse the body of a bulk response.
///
/// Each entry of `items` is keyed by its operation type; the single inner
/// object carries the status and, for failed writes, an `error` object.
pub(crate) fn parse_bulk_response(body: &Value) -> Result<BulkResponse, SinkError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SinkError::parse("bulk response has no items array"))?;

    let items = items
        .iter()
        .map(|item| {
            let outcome = item
                .as_object()
                .and_then(|op| op.values().next())
                .ok_or_else(|| SinkError::parse("bulk response item has no operation"))?;

            Ok(BulkItem {
                status: outcome
                    .get("status")
                    .and_then(Value::as_u64)
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or(0),
                id: outcome.get("_id").and_then(Value::as_str).map(String::from),
                error: outcome.get("error").cloned(),
            })
        })
        .collect::<Result<Vec<_>, SinkError>>()?;

    Ok(BulkResponse {
        took_ms: body.get("took").and_then(Value::as_u64).unwrap_or(0),
        errors: body.get("errors").and_then(Value::as_bool).unwrap_or(false),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(position: usize) -> NormalizedDocument {
        let mut doc = NormalizedDocument::new();
        doc.insert("fee", json!(position * 10));
        doc.stamp(position, Utc::now());
        doc
    }

    #[test]
    fn test_bulk_operations_pairs_in_order() {
        let docs = vec![doc(0), doc(1)];
        let body = bulk_operations("txns", &docs);

        assert_eq!(body.len(), 4);
        assert_eq!(body[0], json!({"index": {"_index": "txns"}}));
        assert_eq!(body[1]["id"], "0");
        assert_eq!(body[2], json!({"index": {"_index": "txns"}}));
        assert_eq!(body[3]["id"], "1");
        assert_eq!(body[3]["fee"], 10);
    }

    #[test]
    fn test_parse_bulk_response_with_failures() {
        let body = json!({
            "took": 12,
            "errors": true,
            "items": [
                { "index": { "_index": "txns", "_id": "a1", "status": 201 } },
                { "index": {
                    "_index": "txns",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [fee]" }
                } }
            ]
        });

        let response = parse_bulk_response(&body).unwrap();

        assert_eq!(response.took_ms, 12);
        assert!(response.errors);
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].id.as_deref(), Some("a1"));
        assert!(!response.items[0].is_failure());
        assert_eq!(response.items[1].status, 400);
        assert_eq!(
            response.items[1].error.as_ref().unwrap()["type"],
            "mapper_parsing_exception"
        );
    }

    #[test]
    fn test_parse_bulk_response_out_of_range_status() {
        let body = json!({
            "took": 1,
            "errors": true,
            "items": [{ "index": { "_index": "txns", "status": 65_937 } }]
        });

        let response = parse_bulk_response(&body).unwrap();

        assert_eq!(response.items[0].status, 0);
    }

    #[test]
    fn test_parse_bulk_response_without_items() {
        let result = parse_bulk_response(&json!({"error": "boom"}));
        assert!(matches!(result, Err(SinkError::ParseError(_))));
    }
}
