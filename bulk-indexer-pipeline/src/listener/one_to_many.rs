//! All-or-nothing cleanup for rows expanding to many documents.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use bulk_indexer_repository::{RecoveryQueueStore, StoreError};
use bulk_indexer_shared::{IndexingResult, RecoveryQueueItem};

/// Deletes every row of the session, only when every write succeeded.
///
/// Partial success cannot be attributed to a subset of rows, so any failure
/// keeps all of them pending.
pub struct OneToManyListener {
    store: Arc<dyn RecoveryQueueStore>,
    items: Vec<RecoveryQueueItem>,
}

impl OneToManyListener {
    pub fn new(store: Arc<dyn RecoveryQueueStore>, items: Vec<RecoveryQueueItem>) -> Self {
        Self { store, items }
    }

    pub async fn on_finish(&self, result: &IndexingResult) {
        if self.items.is_empty() {
            return;
        }
        if !result.is_success() {
            info!(
                rows = self.items.len(),
                failures = result.failures(),
                "Indexing incomplete, recovery rows stay pending"
            );
            return;
        }

        match self.delete().await {
            Ok(()) => debug!(count = self.items.len(), "Retired recovery rows"),
            Err(e) => error!(
                error = %e,
                count = self.items.len(),
                "Failed to retire recovery rows, they stay pending"
            ),
        }
    }

    async fn delete(&self) -> Result<(), StoreError> {
        let mut session = self.store.open_session().await?;
        session.delete(&self.items).await?;
        session.commit().await
    }
}

impl fmt::Debug for OneToManyListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneToManyListener")
            .field("items", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulk_indexer_repository::{MemoryRecoveryStore, StoreSession};
    use bulk_indexer_shared::IndexType;

    async fn setup(count: usize) -> (MemoryRecoveryStore, OneToManyListener) {
        let store = MemoryRecoveryStore::new();
        let items: Vec<RecoveryQueueItem> = (0..count)
            .map(|i| {
                RecoveryQueueItem::for_key(IndexType::new("issues", "issue"), "project", format!("P{}", i))
            })
            .collect();
        let mut session = store.session();
        session.insert(&items).await.unwrap();
        session.commit().await.unwrap();
        let listener = OneToManyListener::new(Arc::new(store.clone()), items);
        (store, listener)
    }

    #[tokio::test]
    async fn test_single_failure_keeps_every_row() {
        let (store, listener) = setup(4).await;

        listener.on_finish(&IndexingResult::new(120, 119)).await;

        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_full_success_deletes_every_row() {
        let (store, listener) = setup(4).await;

        listener.on_finish(&IndexingResult::new(120, 120)).await;

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_session_counts_as_success() {
        let (store, listener) = setup(2).await;

        listener.on_finish(&IndexingResult::empty()).await;

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
