//! Recovery queue store error types.

use thiserror::Error;

/// Errors raised by the durable store holding recovery-queue rows.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Rows could not be staged for insertion.
    #[error("Insert error: {0}")]
    InsertError(String),

    /// Rows could not be staged for deletion.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// The transaction could not be committed. Nothing staged was applied.
    #[error("Commit error: {0}")]
    CommitError(String),

    /// Reading rows failed.
    #[error("Query error: {0}")]
    QueryError(String),
}

impl StoreError {
    pub fn insert(msg: impl Into<String>) -> Self {
        Self::InsertError(msg.into())
    }

    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    pub fn commit(msg: impl Into<String>) -> Self {
        Self::CommitError(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }
}
