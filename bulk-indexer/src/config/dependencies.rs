//! Dependency initialization and wiring for the bulk indexer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::config::IndexerSettings;
use crate::IndexingError;
use bulk_indexer_pipeline::{
    BulkIndexer, BulkIndexerConfig, IndexerRegistry, PipelineError, ResilientIndexer, SizeProfile,
    StartupBootstrap,
};
use bulk_indexer_repository::{OpenSearchClient, SearchEngineClient};
use bulk_indexer_shared::IndexingResult;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The search engine every indexer writes to.
    pub search_client: Arc<dyn SearchEngineClient>,
    /// Batching configuration shared by every bulk session.
    pub bulk_config: BulkIndexerConfig,
    /// Indexers notified of domain mutations.
    pub registry: IndexerRegistry,
    bootstrap: StartupBootstrap,
}

impl Dependencies {
    /// Connect to OpenSearch and verify the cluster is usable.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies, with no indexer registered yet
    /// * `Err(IndexingError)` - If the client cannot be created or the cluster is unhealthy
    pub async fn new(settings: &IndexerSettings) -> Result<Self, IndexingError> {
        info!(opensearch_url = %settings.opensearch.url, "Initializing dependencies");

        let search_client = OpenSearchClient::new(settings.opensearch.clone())
            .await
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Ok(Self::with_client(Arc::new(search_client), settings.bulk.clone()))
    }

    /// Wire dependencies around an existing search client.
    pub fn with_client(search_client: Arc<dyn SearchEngineClient>, bulk_config: BulkIndexerConfig) -> Self {
        Self {
            bootstrap: StartupBootstrap::new(search_client.clone()),
            registry: IndexerRegistry::new(),
            search_client,
            bulk_config,
        }
    }

    /// Add an indexer to the registry.
    pub fn register(&mut self, indexer: Arc<dyn ResilientIndexer>) {
        self.registry.register(indexer);
    }

    /// A bulk session on `index` using the shared client and configuration.
    pub fn bulk_indexer(&self, index: &str, profile: SizeProfile) -> BulkIndexer {
        BulkIndexer::with_config(
            self.search_client.clone(),
            index,
            profile,
            self.bulk_config.clone(),
        )
    }

    /// Bulk-load every registered index that does not exist yet.
    ///
    /// Returns the handles of the loads running in the background.
    #[instrument(skip(self))]
    pub async fn bootstrap(
        &self,
    ) -> Result<Vec<JoinHandle<Result<IndexingResult, PipelineError>>>, IndexingError> {
        let background = self.bootstrap.run(self.registry.indexers()).await?;
        info!(background = background.len(), "Startup indexing done");
        Ok(background)
    }
}
