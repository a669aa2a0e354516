//! OpenSearch sink implementation.
//!
//! This module provides the concrete implementation of `SearchSink` using the
//! OpenSearch Rust client. The same calls work against Elasticsearch 7.x
//! compatible endpoints.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, CountParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::SinkConfig;
use crate::errors::SinkError;
use crate::interfaces::SearchSink;
use crate::opensearch::bulk::{bulk_operations, parse_bulk_response};
use crate::opensearch::queries::parse_hits;
use crate::types::{BulkResponse, CreateIndexOutcome};
use log_indexer_shared::{NormalizedDocument, SearchHit};

/// Error type the sink reports when an index is created twice.
const ALREADY_EXISTS_EXCEPTION: &str = "resource_already_exists_exception";

/// OpenSearch sink implementation.
///
/// Holds a single client for the lifetime of the process; every pipeline
/// component and scheduler tick shares it.
///
/// # Example
///
/// ```ignore
/// use log_indexer_repository::{OpenSearchSink, SearchSink, SinkConfig};
///
/// let config = SinkConfig::new("http://localhost:9200", "admin", password);
/// let sink = OpenSearchSink::new(&config)?;
///
/// if !sink.index_exists("algorand-final").await? {
///     sink.create_index("algorand-final", &schema.to_mappings()).await?;
/// }
/// ```
pub struct OpenSearchSink {
    client: OpenSearch,
}

impl OpenSearchSink {
    /// Create a new OpenSearch sink connected to the configured URL.
    ///
    /// # Arguments
    ///
    /// * `config` - URL, basic-auth credentials and request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchSink)` - A new sink instance
    /// * `Err(SinkError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: &SinkConfig) -> Result<Self, SinkError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SinkError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .auth(Credentials::Basic(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(config.request_timeout)
            .disable_proxy()
            .build()
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            username = %config.username,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "Created OpenSearch sink"
        );

        Ok(Self { client })
    }
}

/// Whether a failed create-index response reports an existing index.
fn is_already_exists(body: &str) -> bool {
    body.contains(ALREADY_EXISTS_EXCEPTION)
}

#[async_trait]
impl SearchSink for OpenSearchSink {
    async fn index_exists(&self, index: &str) -> Result<bool, SinkError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                error!(index = %index, status = status, body = %body, "Index existence check failed");
                Err(SinkError::request(status, body))
            }
        }
    }

    /// Create an index carrying the given mappings.
    ///
    /// A 400 response whose body names `resource_already_exists_exception`
    /// means another actor created the index first; that is reported as
    /// `AlreadyExists` rather than as an error.
    #[instrument(skip(self, index, mappings), fields(index = %index))]
    async fn create_index(
        &self,
        index: &str,
        mappings: &Value,
    ) -> Result<CreateIndexOutcome, SinkError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(json!({ "mappings": mappings }))
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!("Created index");
            return Ok(CreateIndexOutcome::Created);
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 400 && is_already_exists(&body) {
            warn!("Index was created concurrently");
            return Ok(CreateIndexOutcome::AlreadyExists);
        }

        error!(status = %status, body = %body, "Create index request failed");
        Err(SinkError::index_creation(format!(
            "Create index failed with status {}: {}",
            status, body
        )))
    }

    #[instrument(skip(self, index, documents), fields(index = %index, count = documents.len()))]
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[NormalizedDocument],
        refresh: bool,
    ) -> Result<BulkResponse, SinkError> {
        let body: Vec<JsonBody<Value>> = bulk_operations(index, documents)
            .into_iter()
            .map(JsonBody::new)
            .collect();

        let refresh = if refresh { Refresh::True } else { Refresh::False };

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .refresh(refresh)
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SinkError::request(status.as_u16(), error_body));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SinkError::parse(e.to_string()))?;

        let parsed = parse_bulk_response(&response_body)?;

        debug!(
            took_ms = parsed.took_ms,
            failed = parsed.failure_count(),
            "Bulk request completed"
        );

        Ok(parsed)
    }

    async fn count(&self, index: &str) -> Result<u64, SinkError> {
        let response = self
            .client
            .count(CountParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SinkError::count(format!(
                "Count failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SinkError::parse(e.to_string()))?;

        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SinkError::parse("count response has no count field"))
    }

    async fn search(&self, index: &str, query: &Value) -> Result<Vec<SearchHit>, SinkError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query.clone())
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SinkError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SinkError::parse(e.to_string()))?;

        Ok(parse_hits(&body))
    }

    async fn health_check(&self) -> Result<bool, SinkError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SinkError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Cluster health request failed");
            return Err(SinkError::request(status.as_u16(), error_body));
        }

        let health: Value = response
            .json()
            .await
            .map_err(|e| SinkError::parse(e.to_string()))?;
        let cluster_status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        debug!(status = %cluster_status, "Sink cluster status");

        Ok(cluster_status == "green" || cluster_status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_already_exists() {
        let body = r#"{"error":{"root_cause":[{"type":"resource_already_exists_exception","reason":"index [txns/abc] already exists"}]},"status":400}"#;
        assert!(is_already_exists(body));
        assert!(!is_already_exists(
            r#"{"error":{"type":"mapper_parsing_exception"},"status":400}"#
        ));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = SinkConfig::new("not a url", "admin", "pw");
        let result = OpenSearchSink::new(&config);
        assert!(matches!(result, Err(SinkError::ConnectionError(_))));
    }

    #[test]
    fn test_new_accepts_valid_url() {
        let config = SinkConfig::new("http://localhost:9200", "admin", "pw");
        assert!(OpenSearchSink::new(&config).is_ok());
    }
}
