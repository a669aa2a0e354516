//! Normalized documents written to the search sink.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the ingestion timestamp.
pub const DATE_FIELD: &str = "date";

/// Field holding the item's position within its run.
pub const ID_FIELD: &str = "id";

/// A flat document ready for indexing.
///
/// Keys are lower-cased field names. Every document carries the `date` and
/// `id` system fields; `id` is only unique within one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDocument {
    fields: Map<String, Value>,
}

impl NormalizedDocument {
    /// Start an empty document.
    ///
    /// System fields are written last by [`NormalizedDocument::stamp`], so a
    /// record field called `date` or `id` never survives.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Insert a projected field under its lower-cased name.
    pub fn insert(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_lowercase(), value);
    }

    /// Write the `date` and `id` system fields.
    pub fn stamp(&mut self, position: usize, ingested_at: DateTime<Utc>) {
        self.fields.insert(
            DATE_FIELD.to_string(),
            Value::String(ingested_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        self.fields
            .insert(ID_FIELD.to_string(), Value::String(position.to_string()));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The run-local identifier, if the document has been stamped.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// The ingestion timestamp, if the document has been stamped.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get(DATE_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Default for NormalizedDocument {
    fn default() -> Self {
        Self::new()
    }
}
