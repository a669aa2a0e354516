//! Record normalization.
//!
//! Turns raw items into flat documents: parse, project the selected fields
//! under lower-cased names, then stamp the `date` and `id` system fields.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::errors::ItemParseFailure;
use log_indexer_shared::{FieldSelector, NormalizedDocument, RawItem};

/// Configuration for the transformer.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Fields to project. `None` projects every key of the record.
    pub selector: Option<FieldSelector>,
    /// Key of a nested object holding the record's fields (e.g. `txn`).
    ///
    /// When set, fields are read from that sub-object and the default
    /// selector is its key set. When unset, the parsed item itself is the
    /// record.
    pub record_root: Option<String>,
}

impl TransformConfig {
    pub fn with_selector(mut self, selector: FieldSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_record_root(mut self, root: impl Into<String>) -> Self {
        self.record_root = Some(root.into());
        self
    }
}

/// Processor that normalizes raw items into documents.
///
/// The transformer is responsible for:
/// - Parsing text items as JSON, dropping the ones that do not parse
/// - Projecting the selected fields under lower-cased names
/// - Stamping every document with `date` and its original position as `id`
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    /// Create a new transformer.
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Normalize a batch of raw items, stamping them with the current time.
    ///
    /// Output order follows input order minus dropped items.
    pub fn normalize(&self, items: Vec<RawItem>) -> Vec<NormalizedDocument> {
        self.normalize_at(items, Utc::now())
    }

    /// Normalize a batch of raw items, stamping them with `now`.
    ///
    /// # Arguments
    ///
    /// * `items` - Raw items in source order
    /// * `now` - Ingestion timestamp written to every document's `date`
    ///
    /// # Returns
    ///
    /// The documents, each with `id` set to the item's position in `items`.
    /// Items that fail to parse are skipped but still consume their position.
    #[instrument(skip(self, items, now), fields(item_count = items.len()))]
    pub fn normalize_at(
        &self,
        items: Vec<RawItem>,
        now: DateTime<Utc>,
    ) -> Vec<NormalizedDocument> {
        let mut documents = Vec::with_capacity(items.len());
        let mut dropped = 0usize;

        for (position, item) in items.into_iter().enumerate() {
            match self.normalize_item(position, item, now) {
                Ok(doc) => documents.push(doc),
                Err(failure) => {
                    debug!(position = failure.position, reason = %failure.reason, "Dropping item");
                    dropped += 1;
                }
            }
        }

        debug!(
            document_count = documents.len(),
            dropped = dropped,
            "Normalized item batch"
        );
        documents
    }

    /// Normalize a single item at `position`.
    fn normalize_item(
        &self,
        position: usize,
        item: RawItem,
        now: DateTime<Utc>,
    ) -> Result<NormalizedDocument, ItemParseFailure> {
        let parsed = match item {
            RawItem::Json(value) => value,
            RawItem::Line(text) => serde_json::from_str::<Value>(&text)
                .map_err(|e| ItemParseFailure::new(position, e.to_string()))?,
        };

        let record = self.record_of(position, &parsed)?;

        let mut doc = NormalizedDocument::new();
        match &self.config.selector {
            Some(selector) => project(&mut doc, record, selector),
            None => project(&mut doc, record, &FieldSelector::all_keys(record)),
        }
        doc.stamp(position, now);

        Ok(doc)
    }

    /// Locate the object the fields are read from.
    fn record_of<'a>(
        &self,
        position: usize,
        parsed: &'a Value,
    ) -> Result<&'a Map<String, Value>, ItemParseFailure> {
        let object = parsed
            .as_object()
            .ok_or_else(|| ItemParseFailure::new(position, "item is not a JSON object"))?;

        match &self.config.record_root {
            None => Ok(object),
            Some(root) => object
                .get(root)
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    ItemParseFailure::new(position, format!("item has no '{}' object", root))
                }),
        }
    }
}

/// Copy the selected fields into `doc`. Missing fields are written as `null`.
fn project(doc: &mut NormalizedDocument, record: &Map<String, Value>, selector: &FieldSelector) {
    for field in selector.fields() {
        let value = FieldSelector::lookup(record, field)
            .cloned()
            .unwrap_or(Value::Null);
        doc.insert(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sorted_fields(doc: &NormalizedDocument) -> Vec<&str> {
        let mut fields: Vec<&str> = doc.field_names().collect();
        fields.sort_unstable();
        fields
    }

    #[test]
    fn test_selected_fields_plus_system_fields() {
        let transformer = Transformer::new(
            TransformConfig::default().with_selector(FieldSelector::parse("Fee,SND")),
        );
        let items = vec![RawItem::Json(json!({
            "fee": 1000,
            "snd": "ADDR",
            "note": "ignored"
        }))];

        let docs = transformer.normalize_at(items, fixed_now());

        assert_eq!(docs.len(), 1);
        assert_eq!(sorted_fields(&docs[0]), vec!["date", "fee", "id", "snd"]);
        assert_eq!(docs[0].get("fee"), Some(&json!(1000)));
        assert_eq!(docs[0].get("snd"), Some(&json!("ADDR")));
        assert_eq!(docs[0].id(), Some("0"));
        assert_eq!(docs[0].date(), Some(fixed_now()));
    }

    #[test]
    fn test_default_selector_uses_all_keys_lowercased() {
        let transformer = Transformer::default();
        let items = vec![RawItem::line(r#"{"Fee": 1, "Type": "pay"}"#)];

        let docs = transformer.normalize_at(items, fixed_now());

        assert_eq!(sorted_fields(&docs[0]), vec!["date", "fee", "id", "type"]);
        assert_eq!(docs[0].get("type"), Some(&json!("pay")));
    }

    #[test]
    fn test_unparsable_items_keep_positions() {
        let transformer = Transformer::default();
        let items = vec![
            RawItem::line(r#"{"a": 1}"#),
            RawItem::line("not json"),
            RawItem::line(r#"{"a": 3}"#),
            RawItem::line(""),
        ];

        let docs = transformer.normalize_at(items, fixed_now());

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id(), Some("0"));
        assert_eq!(docs[1].id(), Some("2"));
        assert_eq!(docs[1].get("a"), Some(&json!(3)));
    }

    #[test]
    fn test_non_object_items_are_dropped() {
        let transformer = Transformer::default();
        let items = vec![RawItem::line("42"), RawItem::Json(json!(["x"]))];

        assert!(transformer.normalize_at(items, fixed_now()).is_empty());
    }

    #[test]
    fn test_record_root_reads_nested_object() {
        let transformer =
            Transformer::new(TransformConfig::default().with_record_root("txn"));
        let items = vec![
            RawItem::Json(json!({
                "sig": "SIG",
                "txn": { "fee": 1000, "rcv": "R", "type": "pay" }
            })),
            RawItem::Json(json!({ "sig": "SIG2" })),
        ];

        let docs = transformer.normalize_at(items, fixed_now());

        assert_eq!(docs.len(), 1);
        assert_eq!(
            sorted_fields(&docs[0]),
            vec!["date", "fee", "id", "rcv", "type"]
        );
        assert!(docs[0].get("sig").is_none());
    }

    #[test]
    fn test_missing_selected_field_is_null() {
        let transformer = Transformer::new(
            TransformConfig::default().with_selector(FieldSelector::parse("fee,note")),
        );
        let docs = transformer.normalize_at(vec![RawItem::Json(json!({"fee": 5}))], fixed_now());

        assert_eq!(docs[0].get("note"), Some(&Value::Null));
        assert_eq!(docs[0].len(), 4);
    }

    #[test]
    fn test_output_order_matches_input() {
        let transformer = Transformer::default();
        let items: Vec<RawItem> = (0..50)
            .map(|i| RawItem::Json(json!({ "n": i })))
            .collect();

        let docs = transformer.normalize_at(items, fixed_now());

        for (i, doc) in docs.iter().enumerate() {
            assert_eq!(doc.get("n"), Some(&json!(i)));
            assert_eq!(doc.id(), Some(i.to_string().as_str()));
        }
    }
}
