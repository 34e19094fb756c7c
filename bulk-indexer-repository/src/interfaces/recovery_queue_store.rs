//! Durable store boundary for recovery-queue rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::StoreError;
use bulk_indexer_shared::RecoveryQueueItem;

/// The durable store holding recovery-queue rows.
///
/// Writes go through a [`StoreSession`]; nothing staged in a session is
/// visible to readers until the session commits.
#[async_trait]
pub trait RecoveryQueueStore: Send + Sync {
    /// Open a new transactional session.
    async fn open_session(&self) -> Result<Box<dyn StoreSession>, StoreError>;

    /// Committed rows created strictly before `created_before`, oldest first,
    /// at most `limit` of them.
    async fn select_for_recovery(
        &self,
        created_before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RecoveryQueueItem>, StoreError>;

    /// Number of committed rows.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// A transaction against the recovery-queue store.
///
/// Dropping a session without committing discards everything it staged.
#[async_trait]
pub trait StoreSession: Send {
    /// Stage the insertion of rows.
    async fn insert(&mut self, items: &[RecoveryQueueItem]) -> Result<(), StoreError>;

    /// Stage the deletion of rows, as a single statement.
    async fn delete(&mut self, items: &[RecoveryQueueItem]) -> Result<(), StoreError>;

    /// Atomically apply everything staged so far.
    ///
    /// The session can be reused for a new transaction afterwards.
    async fn commit(&mut self) -> Result<(), StoreError>;
}
