use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::indexer::{StartupIndexer, StartupType};
use bulk_indexer_repository::SearchEngineClient;
use bulk_indexer_shared::{IndexType, IndexingResult};

/// Detects indices that do not exist yet and bulk-loads them.
pub struct StartupBootstrap {
    client: Arc<dyn SearchEngineClient>,
}

impl StartupBootstrap {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self { client }
    }

    /// Declared types whose index is missing from the search engine.
    pub async fn uninitialized_types(
        &self,
        types: &[IndexType],
    ) -> Result<HashSet<IndexType>, PipelineError> {
        let mut missing = HashSet::new();
        for index_type in types {
            if !self.client.index_exists(&index_type.index).await? {
                missing.insert(index_type.clone());
            }
        }
        Ok(missing)
    }

    /// Run the startup load of every indexer with uninitialized types.
    ///
    /// Synchronous indexers run one after the other and their first error is
    /// returned. Asynchronous indexers are spawned; their handles are returned
    /// for the caller to await or detach.
    #[instrument(skip_all, fields(indexers = indexers.len()))]
    pub async fn run<I>(
        &self,
        indexers: &[Arc<I>],
    ) -> Result<Vec<JoinHandle<Result<IndexingResult, PipelineError>>>, PipelineError>
    where
        I: StartupIndexer + ?Sized,
    {
        let mut background = Vec::new();

        for indexer in indexers {
            let uninitialized = self.uninitialized_types(&indexer.index_types()).await?;
            if uninitialized.is_empty() {
                continue;
            }

            let types: Vec<String> = uninitialized.iter().map(ToString::to_string).collect();
            match indexer.startup_type() {
                StartupType::Synchronous => {
                    info!(types = ?types, "Indexing uninitialized types");
                    let result = indexer.index_on_startup(&uninitialized).await?;
                    info!(
                        types = ?types,
                        total = result.total(),
                        success = result.success(),
                        "Startup indexing completed"
                    );
                }
                StartupType::Asynchronous => {
                    info!(types = ?types, "Triggering background indexing of uninitialized types");
                    background.push(indexer.clone().trigger_async_index_on_startup(uninitialized));
                }
            }
        }

        Ok(background)
    }
}
