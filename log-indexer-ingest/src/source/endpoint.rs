//! Endpoint source: a single GET against a JSON API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::IngestError;
use log_indexer_shared::RawItem;

/// Top-level key holding the item array in pending-transaction responses.
pub const DEFAULT_COLLECTION_KEY: &str = "top-transactions";

/// Default per-request deadline for the endpoint call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for an endpoint source.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// URL to GET.
    pub url: String,
    /// Top-level response key holding the item array.
    pub collection_key: String,
    /// Headers sent with the request (API tokens and the like).
    pub headers: Vec<(String, String)>,
    /// Optional query parameters.
    pub params: Vec<(String, String)>,
    /// Optional JSON body sent with the GET.
    pub body: Option<Value>,
    /// Deadline for the whole request.
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_collection_key(mut self, key: impl Into<String>) -> Self {
        self.collection_key = key.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches the item array of a JSON endpoint with one GET request.
#[derive(Debug)]
pub struct EndpointSource {
    client: reqwest::Client,
    headers: HeaderMap,
    config: EndpointConfig,
}

impl EndpointSource {
    /// Build the HTTP client and validate the configured headers.
    ///
    /// # Returns
    ///
    /// * `Ok(EndpointSource)` - Ready to fetch
    /// * `Err(IngestError::ConfigurationError)` - If a header is malformed or the client cannot be built
    pub fn new(config: EndpointConfig) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                IngestError::configuration(format!("invalid header name '{}': {}", name, e))
            })?;
            let mut header_value = HeaderValue::from_str(value).map_err(|e| {
                IngestError::configuration(format!("invalid value for header '{}': {}", name, e))
            })?;
            header_value.set_sensitive(true);
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IngestError::configuration(e.to_string()))?;

        Ok(Self {
            client,
            headers,
            config,
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Issue the GET and extract the configured collection.
    pub async fn fetch_all(&self) -> Result<Vec<RawItem>, IngestError> {
        let mut request = self
            .client
            .get(&self.config.url)
            .headers(self.headers.clone());

        if !self.config.params.is_empty() {
            request = request.query(&self.config.params);
        }
        if let Some(body) = &self.config.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(url = %self.config.url, error = %e, "Endpoint request failed");
            IngestError::source_unavailable(format!("{}: {}", self.config.url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::source_unavailable(format!(
                "{} answered with status {}",
                self.config.url, status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            IngestError::unexpected_shape(format!("response body is not JSON: {}", e))
        })?;

        debug!(url = %self.config.url, "Endpoint responded");

        extract_collection(body, &self.config.collection_key)
    }
}

/// Take the item array stored under `key` out of a response body.
///
/// A `null` collection means the endpoint currently has nothing to report.
fn extract_collection(mut body: Value, key: &str) -> Result<Vec<RawItem>, IngestError> {
    let object = body.as_object_mut().ok_or_else(|| {
        IngestError::unexpected_shape("response body is not a JSON object")
    })?;

    match object.remove(key) {
        None => Err(IngestError::unexpected_shape(format!(
            "response has no '{}' field",
            key
        ))),
        Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.into_iter().map(RawItem::Json).collect()),
        Some(other) => Err(IngestError::unexpected_shape(format!(
            "'{}' is not an array (found {})",
            key,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_collection() {
        let body = json!({
            "top-transactions": [
                { "sig": "s1", "txn": { "fee": 1000 } },
                { "sig": "s2", "txn": { "fee": 2000 } }
            ],
            "total-transactions": 2
        });

        let items = extract_collection(body, DEFAULT_COLLECTION_KEY).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            RawItem::Json(json!({ "sig": "s2", "txn": { "fee": 2000 } }))
        );
    }

    #[test]
    fn test_extract_collection_missing_key() {
        let result = extract_collection(json!({"total-transactions": 0}), DEFAULT_COLLECTION_KEY);
        assert!(matches!(result, Err(IngestError::UnexpectedShape(_))));
    }

    #[test]
    fn test_extract_collection_null_is_empty() {
        let items =
            extract_collection(json!({"top-transactions": null}), DEFAULT_COLLECTION_KEY).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_extract_collection_wrong_type() {
        let result = extract_collection(json!({"top-transactions": "nope"}), DEFAULT_COLLECTION_KEY);
        match result {
            Err(IngestError::UnexpectedShape(msg)) => assert!(msg.contains("string")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_extract_collection_non_object_body() {
        let result = extract_collection(json!([1, 2, 3]), DEFAULT_COLLECTION_KEY);
        assert!(matches!(result, Err(IngestError::UnexpectedShape(_))));
    }

    #[test]
    fn test_invalid_header_is_configuration_error() {
        let config = EndpointConfig::new("http://127.0.0.1:8080/v2/transactions/pending")
            .with_header("bad header", "x");
        let result = EndpointSource::new(config);
        assert!(matches!(result, Err(IngestError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let config = EndpointConfig::new("http://127.0.0.1:9/v2/transactions/pending")
            .with_timeout(Duration::from_secs(2));
        let source = EndpointSource::new(config).unwrap();

        let result = source.fetch_all().await;
        assert!(matches!(result, Err(IngestError::SourceUnavailable(_))));
    }
}
