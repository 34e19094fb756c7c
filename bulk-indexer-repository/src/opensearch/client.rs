//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{
        IndicesExistsParts, IndicesForcemergeParts, IndicesGetSettingsParts,
        IndicesPutSettingsParts, IndicesRefreshParts,
    },
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::OpenSearchConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::bulk_body::{bulk_lines, parse_bulk_response, parse_index_settings, settings_body};
use crate::types::{BulkResponse, IndexSettings};
use bulk_indexer_shared::IndexingRequest;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// use bulk_indexer_repository::{OpenSearchClient, OpenSearchConfig, SearchEngineClient};
///
/// let client = OpenSearchClient::new(OpenSearchConfig::new("http://localhost:9200")).await?;
/// let settings = client.get_index_settings("issues").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the configured URL.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(config: OpenSearchConfig) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(url = %config.url, "Created OpenSearch client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Read the body of a failed response for error reporting.
    async fn failure_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    async fn bulk(&self, requests: &[IndexingRequest]) -> Result<BulkResponse, SearchError> {
        if requests.is_empty() {
            return Ok(BulkResponse::default());
        }

        let body: Vec<JsonBody<Value>> = bulk_lines(requests).into_iter().map(JsonBody::new).collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::transport(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let parsed = parse_bulk_response(requests, &json)?;
        if parsed.has_failures() {
            warn!(
                failed = parsed.failures().count(),
                total = requests.len(),
                "Bulk request had rejected documents"
            );
        }
        debug!(count = requests.len(), "Bulk request completed");
        Ok(parsed)
    }

    async fn get_index_settings(&self, index: &str) -> Result<IndexSettings, SearchError> {
        let response = self
            .client
            .indices()
            .get_settings(IndicesGetSettingsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::settings(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::IndexNotFound(index.to_string()));
        }
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            return Err(SearchError::settings(format!(
                "Get settings of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        parse_index_settings(&json)
    }

    async fn put_index_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[index]))
            .body(settings_body(settings))
            .send()
            .await
            .map_err(|e| SearchError::settings(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            return Err(SearchError::settings(format!(
                "Put settings of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        debug!(
            index = %index,
            replicas = ?settings.number_of_replicas,
            refresh_interval = ?settings.refresh_interval,
            "Index settings updated"
        );
        Ok(())
    }

    async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::refresh(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            return Err(SearchError::refresh(format!(
                "Refresh of {} failed with status {}: {}",
                index, status, error_body
            )));
        }
        Ok(())
    }

    async fn force_merge(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .forcemerge(IndicesForcemergeParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::force_merge(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::failure_body(response).await;
            return Err(SearchError::force_merge(format!(
                "Force merge of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index segments merged");
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            other => Err(SearchError::transport(format!(
                "Unexpected status {} checking index {}",
                other, index
            ))),
        }
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(matches!(
            json.get("status").and_then(Value::as_str),
            Some("green") | Some("yellow")
        ))
    }
}
