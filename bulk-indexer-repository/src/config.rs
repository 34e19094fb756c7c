//! Configuration types for the OpenSearch client.

use std::time::Duration;

/// Default OpenSearch URL.
pub const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Configuration for the OpenSearch client.
#[derive(Debug, Clone)]
pub struct OpenSearchConfig {
    /// The OpenSearch server URL (e.g., "http://localhost:9200").
    pub url: String,
    /// Timeout applied to every request. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENSEARCH_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl OpenSearchConfig {
    /// Create a config pointing at the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
