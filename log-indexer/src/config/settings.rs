//! Settings read from the environment.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::IndexingError;
use log_indexer_repository::SinkConfig;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default OpenSearch user.
const DEFAULT_OPENSEARCH_USERNAME: &str = "admin";

pub const OPENSEARCH_URL: &str = "OPENSEARCH_URL";
pub const OPENSEARCH_USERNAME: &str = "OPENSEARCH_USERNAME";
pub const OPENSEARCH_PASSWORD: &str = "OPENSEARCH_PASSWORD";
pub const SOURCE_API_TOKEN: &str = "SOURCE_API_TOKEN";

/// Connection settings and secrets.
#[derive(Clone)]
pub struct Settings {
    pub sink: SinkConfig,
    /// Token sent to the endpoint source, when one is used.
    pub source_token: Option<String>,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME`: OpenSearch user (default: admin)
    /// - `OPENSEARCH_PASSWORD`: OpenSearch password (required)
    /// - `SOURCE_API_TOKEN`: endpoint API token (required when `require_token` is set)
    pub fn from_env(require_token: bool, timeout: Duration) -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok(), require_token, timeout)
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(
        lookup: F,
        require_token: bool,
        timeout: Duration,
    ) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let url = get(OPENSEARCH_URL).unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let username =
            get(OPENSEARCH_USERNAME).unwrap_or_else(|| DEFAULT_OPENSEARCH_USERNAME.to_string());
        let password = get(OPENSEARCH_PASSWORD)
            .ok_or_else(|| IndexingError::config(format!("{} is not set", OPENSEARCH_PASSWORD)))?;

        let source_token = get(SOURCE_API_TOKEN);
        if require_token && source_token.is_none() {
            return Err(IndexingError::config(format!(
                "{} is required with --url",
                SOURCE_API_TOKEN
            )));
        }

        Ok(Self {
            sink: SinkConfig::new(url, username, password).with_request_timeout(timeout),
            source_token,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("sink", &self.sink)
            .field("source_token", &self.source_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_defaults_with_password() {
        let settings =
            Settings::from_lookup(lookup(&[(OPENSEARCH_PASSWORD, "s3cret")]), false, TIMEOUT)
                .unwrap();

        assert_eq!(settings.sink.url, "http://localhost:9200");
        assert_eq!(settings.sink.username, "admin");
        assert_eq!(settings.sink.password, "s3cret");
        assert_eq!(settings.sink.request_timeout, TIMEOUT);
        assert!(settings.source_token.is_none());
    }

    #[test]
    fn test_password_is_required() {
        let result = Settings::from_lookup(lookup(&[]), false, TIMEOUT);

        match result {
            Err(IndexingError::ConfigError(msg)) => assert!(msg.contains(OPENSEARCH_PASSWORD)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_password_is_rejected() {
        let result = Settings::from_lookup(lookup(&[(OPENSEARCH_PASSWORD, "")]), false, TIMEOUT);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_token_required_for_endpoint() {
        let result =
            Settings::from_lookup(lookup(&[(OPENSEARCH_PASSWORD, "s3cret")]), true, TIMEOUT);

        match result {
            Err(IndexingError::ConfigError(msg)) => assert!(msg.contains(SOURCE_API_TOKEN)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(
            lookup(&[
                (OPENSEARCH_URL, "https://search.internal:9200"),
                (OPENSEARCH_USERNAME, "indexer"),
                (OPENSEARCH_PASSWORD, "s3cret"),
                (SOURCE_API_TOKEN, "token"),
            ]),
            true,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(settings.sink.url, "https://search.internal:9200");
        assert_eq!(settings.sink.username, "indexer");
        assert_eq!(settings.source_token.as_deref(), Some("token"));
        assert_eq!(settings.sink.request_timeout, Duration::from_secs(5));

        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("\"token\""));
    }
}
