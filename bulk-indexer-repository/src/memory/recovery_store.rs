//! In-memory recovery queue store.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::interfaces::{RecoveryQueueStore, StoreSession};
use bulk_indexer_shared::RecoveryQueueItem;

/// Recovery queue rows kept in memory.
///
/// Cloning the store yields another handle on the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecoveryStore {
    rows: Arc<RwLock<Vec<RecoveryQueueItem>>>,
}

impl MemoryRecoveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all committed rows, in insertion order.
    pub async fn rows(&self) -> Vec<RecoveryQueueItem> {
        self.rows.read().await.clone()
    }

    /// Open a session with its concrete type.
    pub fn session(&self) -> MemoryStoreSession {
        MemoryStoreSession {
            rows: self.rows.clone(),
            pending_inserts: Vec::new(),
            pending_deletes: HashSet::new(),
        }
    }
}

#[async_trait]
impl RecoveryQueueStore for MemoryRecoveryStore {
    async fn open_session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(self.session()))
    }

    async fn select_for_recovery(
        &self,
        created_before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RecoveryQueueItem>, StoreError> {
        let rows = self.rows.read().await;
        let mut selected: Vec<RecoveryQueueItem> = rows
            .iter()
            .filter(|row| row.created_at < created_before)
            .cloned()
            .collect();
        selected.sort_by_key(|row| row.created_at);
        selected.truncate(limit);
        Ok(selected)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rows.read().await.len())
    }
}

/// A transaction on a [`MemoryRecoveryStore`].
#[derive(Debug)]
pub struct MemoryStoreSession {
    rows: Arc<RwLock<Vec<RecoveryQueueItem>>>,
    pending_inserts: Vec<RecoveryQueueItem>,
    pending_deletes: HashSet<Uuid>,
}

impl MemoryStoreSession {
    /// True when nothing is staged.
    pub fn is_clean(&self) -> bool {
        self.pending_inserts.is_empty() && self.pending_deletes.is_empty()
    }
}

#[async_trait]
impl StoreSession for MemoryStoreSession {
    async fn insert(&mut self, items: &[RecoveryQueueItem]) -> Result<(), StoreError> {
        self.pending_inserts.extend_from_slice(items);
        Ok(())
    }

    async fn delete(&mut self, items: &[RecoveryQueueItem]) -> Result<(), StoreError> {
        self.pending_deletes
            .extend(items.iter().map(|item| item.item_id));
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let inserted = self.pending_inserts.len();
        let deleted = self.pending_deletes.len();

        rows.append(&mut self.pending_inserts);
        if !self.pending_deletes.is_empty() {
            rows.retain(|row| !self.pending_deletes.contains(&row.item_id));
            self.pending_deletes.clear();
        }

        debug!(inserted, deleted, remaining = rows.len(), "Committed recovery queue session");
        Ok(())
    }
}
