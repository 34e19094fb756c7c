//! Incremental cleanup for rows mapped to exactly one document.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use bulk_indexer_repository::{RecoveryQueueStore, StoreError};
use bulk_indexer_shared::{DocumentId, RecoveryQueueItem};

/// Deletes recovery rows whose produced document has been acknowledged.
///
/// Several rows may map to the same document (one per failed attempt); one
/// acknowledgment retires all of them.
pub struct OneToOneListener {
    store: Arc<dyn RecoveryQueueStore>,
    items_by_document: HashMap<DocumentId, Vec<RecoveryQueueItem>>,
}

impl OneToOneListener {
    /// Rows without a direct document mapping are never matched.
    pub fn new(store: Arc<dyn RecoveryQueueStore>, items: Vec<RecoveryQueueItem>) -> Self {
        let mut items_by_document: HashMap<DocumentId, Vec<RecoveryQueueItem>> = HashMap::new();
        for item in items {
            match item.produced_document_id() {
                Some(document) => items_by_document.entry(document).or_default().push(item),
                None => warn!(
                    item_id = %item.item_id,
                    doc_id_type = ?item.doc_id_type,
                    "Recovery row has no document mapping and will not be retired"
                ),
            }
        }
        Self {
            store,
            items_by_document,
        }
    }

    pub async fn on_success(&self, documents: &[DocumentId]) {
        let matched: Vec<RecoveryQueueItem> = documents
            .iter()
            .filter_map(|document| self.items_by_document.get(document))
            .flatten()
            .cloned()
            .collect();

        if matched.is_empty() {
            return;
        }

        match self.delete(&matched).await {
            Ok(()) => debug!(count = matched.len(), "Retired recovery rows"),
            Err(e) => error!(
                error = %e,
                count = matched.len(),
                "Failed to retire recovery rows, they stay pending"
            ),
        }
    }

    async fn delete(&self, items: &[RecoveryQueueItem]) -> Result<(), StoreError> {
        let mut session = self.store.open_session().await?;
        session.delete(items).await?;
        session.commit().await
    }
}

impl fmt::Debug for OneToOneListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneToOneListener")
            .field("documents", &self.items_by_document.len())
            .finish()
    }
}
