//! Listeners retiring recovery-queue rows once their documents are indexed.
//!
//! The strategy is chosen by the caller depending on whether it can map each
//! recovery row to exactly one produced document.

mod one_to_many;
mod one_to_one;

use std::sync::Arc;

use bulk_indexer_repository::RecoveryQueueStore;
use bulk_indexer_shared::{DocumentId, IndexingResult, RecoveryQueueItem};

pub use one_to_many::OneToManyListener;
pub use one_to_one::OneToOneListener;

/// Receives the outcome of a bulk session.
///
/// No acknowledgment means "not safe to delete": rows are only removed on
/// explicit evidence of success.
#[derive(Debug)]
pub enum IndexingListener {
    /// Ignores every notification.
    Noop,
    /// Deletes rows as soon as their document is acknowledged.
    OneToOne(OneToOneListener),
    /// Deletes all rows at the end of a fully successful session.
    OneToMany(OneToManyListener),
}

impl IndexingListener {
    pub fn one_to_one(store: Arc<dyn RecoveryQueueStore>, items: Vec<RecoveryQueueItem>) -> Self {
        Self::OneToOne(OneToOneListener::new(store, items))
    }

    pub fn one_to_many(store: Arc<dyn RecoveryQueueStore>, items: Vec<RecoveryQueueItem>) -> Self {
        Self::OneToMany(OneToManyListener::new(store, items))
    }

    /// Called after each transmission with the documents it wrote.
    pub async fn on_success(&self, documents: &[DocumentId]) {
        match self {
            Self::OneToOne(listener) => listener.on_success(documents).await,
            Self::Noop | Self::OneToMany(_) => {}
        }
    }

    /// Called once when the session completes normally.
    pub async fn on_finish(&self, result: &IndexingResult) {
        match self {
            Self::OneToMany(listener) => listener.on_finish(result).await,
            Self::Noop | Self::OneToOne(_) => {}
        }
    }
}

impl Default for IndexingListener {
    fn default() -> Self {
        Self::Noop
    }
}
