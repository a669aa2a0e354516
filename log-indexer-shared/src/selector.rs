//! Field selection for normalization.

use serde_json::{Map, Value};

/// An ordered set of field names to project out of each record.
///
/// Names are matched against record keys exactly first and then ignoring
/// ASCII case. The projected document always uses the lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelector {
    fields: Vec<String>,
}

impl FieldSelector {
    /// Build a selector, dropping empty names and repeated names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into().trim().to_string();
            if field.is_empty() {
                continue;
            }
            if !selected.iter().any(|f| f.eq_ignore_ascii_case(&field)) {
                selected.push(field);
            }
        }
        Self { fields: selected }
    }

    /// Parse a comma separated list such as `fee,snd,note`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Selector covering every key of the given record, in the record's order.
    pub fn all_keys(record: &Map<String, Value>) -> Self {
        Self::new(record.keys().cloned())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look a selected field up in a record.
    ///
    /// Returns `None` when the record has no key matching `field`.
    pub fn lookup<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
        record.get(field).or_else(|| {
            record
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
        })
    }
}
