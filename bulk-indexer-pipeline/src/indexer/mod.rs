//! Capabilities an index must provide to take part in the pipeline.

mod startup;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::errors::PipelineError;
use bulk_indexer_shared::{Cause, IndexType, IndexingResult, RecoveryQueueItem};

pub use startup::StartupBootstrap;

/// How an indexer fills its uninitialized indices on startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartupType {
    /// The bootstrap waits for the load before the service starts.
    #[default]
    Synchronous,
    /// The load runs on a background task.
    Asynchronous,
}

/// Bulk-loads indices from scratch when they do not exist yet.
#[async_trait]
pub trait StartupIndexer: Send + Sync + 'static {
    /// Index/document-type pairs maintained by this indexer.
    fn index_types(&self) -> Vec<IndexType>;

    fn startup_type(&self) -> StartupType {
        StartupType::Synchronous
    }

    /// Fully reindex the given types, normally with a large-profile
    /// [`BulkIndexer`](crate::bulk::BulkIndexer).
    async fn index_on_startup(
        &self,
        uninitialized: &HashSet<IndexType>,
    ) -> Result<IndexingResult, PipelineError>;

    /// Run [`index_on_startup`](Self::index_on_startup) on a spawned task.
    fn trigger_async_index_on_startup(
        self: Arc<Self>,
        uninitialized: HashSet<IndexType>,
    ) -> JoinHandle<Result<IndexingResult, PipelineError>> {
        tokio::spawn(async move { self.index_on_startup(&uninitialized).await })
    }
}

/// Keeps an index in sync with domain mutations through the recovery queue.
///
/// `prepare_for_recovery` runs inside the mutation's transaction and must not
/// touch the search engine. `index` runs only after that transaction has
/// committed, with exactly the rows this indexer prepared.
#[async_trait]
pub trait ResilientIndexer: StartupIndexer {
    fn name(&self) -> &str;

    /// Describe what must be reindexed because of `cause` on `entity_ids`.
    ///
    /// An indexer not concerned by the cause returns no rows.
    fn prepare_for_recovery(&self, cause: Cause, entity_ids: &[String]) -> Vec<RecoveryQueueItem>;

    /// Index the documents described by `items` and retire the rows of the
    /// confirmed ones.
    async fn index(&self, items: Vec<RecoveryQueueItem>) -> Result<IndexingResult, PipelineError>;
}
