//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the search engine write
//! path, allowing for different backend implementations (OpenSearch, mocks...).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{BulkResponse, IndexSettings};
use bulk_indexer_shared::IndexingRequest;

/// Abstract interface for the search engine operations used by the bulk
/// indexing pipeline.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: transmissions of a large load
/// run concurrently on several tasks.
///
/// # Error Handling
///
/// An `Err` from [`bulk`](SearchEngineClient::bulk) means the whole
/// transmission failed and none of its documents may be considered written.
/// Rejections of individual documents are reported inside the `Ok` response.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Transmit many writes in a single request.
    ///
    /// The relative order of `requests` is preserved in the transmission and
    /// the returned items follow the same order.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - Per-document outcomes
    /// * `Err(SearchError)` - If the transmission failed as a whole
    async fn bulk(&self, requests: &[IndexingRequest]) -> Result<BulkResponse, SearchError>;

    /// Read the replica count and refresh interval of an index.
    async fn get_index_settings(&self, index: &str) -> Result<IndexSettings, SearchError>;

    /// Write the replica count and refresh interval of an index.
    ///
    /// `None` values reset the setting to the engine default.
    async fn put_index_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchError>;

    /// Make all writes to the index visible to searches.
    async fn refresh(&self, index: &str) -> Result<(), SearchError>;

    /// Consolidate the on-disk segments of the index.
    async fn force_merge(&self, index: &str) -> Result<(), SearchError>;

    /// Check whether the index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
