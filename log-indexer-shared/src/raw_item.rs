//! Raw items as produced by a source, before normalization.

use serde_json::Value;

/// One unit read from a source.
///
/// Endpoint sources hand over already-parsed JSON values; file sources hand
/// over the text of a single line, which may or may not be valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// A value taken from a parsed JSON response.
    Json(Value),
    /// A single line of text.
    Line(String),
}

impl RawItem {
    /// Create a raw item from a line of text.
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }
}

impl From<Value> for RawItem {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
