//! Index schemas applied when the target index is first created.
//!
//! A schema maps field names to primitive field types. It is only sent to the
//! sink at index-creation time and is never checked against the documents
//! that are later written.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Name of the builtin schema for pending transaction records.
pub const TRANSACTIONS_SCHEMA: &str = "transactions";

/// Errors raised while reading a schema definition.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The definition is not shaped like a field mapping.
    #[error("Invalid schema: {0}")]
    Invalid(String),

    /// No builtin schema has the requested name.
    #[error("Unknown schema: {0}")]
    Unknown(String),
}

/// Declared type of an indexed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Keyword,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    Object,
    /// Any other type name understood by the sink.
    Other(String),
}

impl FieldType {
    pub fn parse(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "keyword" => Self::Keyword,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Keyword => "keyword",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }
}

/// Field name to field type mapping for a target index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSchema {
    fields: BTreeMap<String, FieldType>,
}

impl IndexSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field declaration.
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mapping body understood by the sink's create-index call.
    ///
    /// Produces `{"properties": {"<field>": {"type": "<type>"}, ...}}`.
    pub fn to_mappings(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field_type)| (name.clone(), json!({ "type": field_type.as_str() })))
            .collect();

        json!({ "properties": properties })
    }

    /// Read a schema from a JSON definition.
    ///
    /// Accepts a bare `{"field": {"type": ..}}` object, a `{"properties": ..}`
    /// wrapper, or a full `{"mappings": {"properties": ..}}` body. A wrapper is
    /// only unwrapped when its value is an object of field definitions, so a
    /// bare schema may declare fields named `mappings` or `properties`.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let mut root = value;
        for wrapper in ["mappings", "properties"] {
            if let Some(inner) = root.get(wrapper).filter(|inner| is_object_of_objects(inner)) {
                root = inner;
            }
        }

        let object = root
            .as_object()
            .ok_or_else(|| SchemaError::Invalid("expected a JSON object of fields".to_string()))?;

        let mut schema = Self::new();
        for (name, definition) in object {
            let type_name = definition
                .get("type")
                .and_then(Value::as_str)
                .or_else(|| definition.as_str())
                .ok_or_else(|| {
                    SchemaError::Invalid(format!("field '{}' has no type", name))
                })?;
            schema.fields.insert(name.clone(), FieldType::parse(type_name));
        }

        if schema.is_empty() {
            return Err(SchemaError::Invalid("schema declares no fields".to_string()));
        }

        Ok(schema)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Look up one of the schemas shipped with the indexer.
    pub fn builtin(name: &str) -> Result<Self, SchemaError> {
        match name {
            TRANSACTIONS_SCHEMA => Ok(transactions_schema()),
            other => Err(SchemaError::Unknown(other.to_string())),
        }
    }
}

fn is_object_of_objects(value: &Value) -> bool {
    value
        .as_object()
        .map_or(false, |object| !object.is_empty() && object.values().all(Value::is_object))
}

/// Mapping for pending transaction records.
fn transactions_schema() -> IndexSchema {
    IndexSchema::new()
        .with_field("arcv", FieldType::Text)
        .with_field("sig", FieldType::Text)
        .with_field("fee", FieldType::Integer)
        .with_field("fv", FieldType::Integer)
        .with_field("gen", FieldType::Text)
        .with_field("gh", FieldType::Text)
        .with_field("lv", FieldType::Integer)
        .with_field("note", FieldType::Text)
        .with_field("snd", FieldType::Text)
        .with_field("type", FieldType::Keyword)
        .with_field("xaid", FieldType::Integer)
        .with_field("date", FieldType::Date)
        .with_field("id", FieldType::Text)
}
