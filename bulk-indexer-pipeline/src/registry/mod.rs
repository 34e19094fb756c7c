//! Fan-out of domain mutations to every registered indexer.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::indexer::ResilientIndexer;
use bulk_indexer_repository::StoreSession;
use bulk_indexer_shared::{Cause, IndexType, IndexingResult, RecoveryQueueItem};

/// The set of indexers kept in sync with domain mutations.
///
/// # Example
///
/// ```ignore
/// let registry = IndexerRegistry::new()
///     .with_indexer(issues)
///     .with_indexer(projects);
///
/// let mut session = store.open_session().await?;
/// // ... write the mutation through the same session ...
/// let result = registry
///     .commit_and_index(session.as_mut(), Cause::EntityCreation, &ids)
///     .await?;
/// ```
#[derive(Default)]
pub struct IndexerRegistry {
    indexers: Vec<Arc<dyn ResilientIndexer>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, indexer: Arc<dyn ResilientIndexer>) {
        self.indexers.push(indexer);
    }

    pub fn with_indexer(mut self, indexer: Arc<dyn ResilientIndexer>) -> Self {
        self.register(indexer);
        self
    }

    pub fn indexers(&self) -> &[Arc<dyn ResilientIndexer>] {
        &self.indexers
    }

    /// Queue recovery rows for every indexer, commit the session, then index.
    ///
    /// Rows of all indexers are committed together with whatever the caller
    /// already wrote through `session`. Indexing starts only once that commit
    /// succeeded; if it fails nothing is indexed and the error is returned.
    /// A failing indexer does not prevent the others from running: its rows
    /// stay queued and its items count as failures in the returned result.
    #[instrument(skip(self, session, cause, entity_ids), fields(cause = %cause, entities = entity_ids.len()))]
    pub async fn commit_and_index(
        &self,
        session: &mut dyn StoreSession,
        cause: Cause,
        entity_ids: &[String],
    ) -> Result<IndexingResult, PipelineError> {
        let mut prepared = Vec::with_capacity(self.indexers.len());
        for indexer in &self.indexers {
            let items = indexer.prepare_for_recovery(cause, entity_ids);
            if !items.is_empty() {
                session.insert(&items).await?;
            }
            prepared.push((indexer.clone(), items));
        }

        session.commit().await?;
        debug!(
            rows = prepared.iter().map(|(_, items)| items.len()).sum::<usize>(),
            "Recovery rows committed"
        );

        Ok(self.index_all(prepared).await)
    }

    /// Re-index rows picked up by a recovery sweep.
    ///
    /// Each row goes to the indexer owning its index type. Rows no indexer
    /// owns are left in the store and count as failures.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn index_recovered(&self, items: Vec<RecoveryQueueItem>) -> IndexingResult {
        let mut owners: HashMap<IndexType, usize> = HashMap::new();
        for (position, indexer) in self.indexers.iter().enumerate() {
            for index_type in indexer.index_types() {
                owners.entry(index_type).or_insert(position);
            }
        }

        let mut routed: Vec<Vec<RecoveryQueueItem>> = vec![Vec::new(); self.indexers.len()];
        let mut orphans = 0u64;
        for item in items {
            match owners.get(&item.index_type) {
                Some(&position) => routed[position].push(item),
                None => {
                    error!(
                        item_id = %item.item_id,
                        index_type = %item.index_type,
                        "No indexer owns the index type of recovery row"
                    );
                    orphans += 1;
                }
            }
        }

        let prepared = self.indexers.iter().cloned().zip(routed).collect();
        let mut result = self.index_all(prepared).await;
        result.add(&IndexingResult::failed(orphans));
        result
    }

    async fn index_all(
        &self,
        prepared: Vec<(Arc<dyn ResilientIndexer>, Vec<RecoveryQueueItem>)>,
    ) -> IndexingResult {
        let runs = prepared
            .into_iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(indexer, items)| async move {
                let count = items.len() as u64;
                match indexer.index(items).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(
                            indexer = indexer.name(),
                            error = %e,
                            "Indexer failed, its rows stay queued for recovery"
                        );
                        IndexingResult::failed(count)
                    }
                }
            });

        let mut total = IndexingResult::empty();
        for result in join_all(runs).await {
            total.add(&result);
        }

        info!(
            total = total.total(),
            success = total.success(),
            failures = total.failures(),
            "Indexing completed"
        );
        total
    }
}
