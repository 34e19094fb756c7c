//! Error types for the bulk indexing pipeline.

use std::time::Duration;

use bulk_indexer_repository::{SearchError, StoreError};
use thiserror::Error;

/// Errors that end an indexing session or a registry call.
///
/// Rejections of single documents and failures of single transmissions are
/// not errors: they are logged and left out of the success count.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// In-flight transmissions did not complete within the drain timeout.
    #[error("Drain timeout: transmissions to {index} still running after {timeout:?}")]
    DrainTimeout { index: String, timeout: Duration },

    /// Index settings could not be read or written around a large load.
    #[error("Settings toggle error: {0}")]
    SettingsToggle(String),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Error from the recovery queue store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Create a drain timeout error.
    pub fn drain_timeout(index: impl Into<String>, timeout: Duration) -> Self {
        Self::DrainTimeout {
            index: index.into(),
            timeout,
        }
    }

    /// Create a settings toggle error.
    pub fn settings_toggle(msg: impl Into<String>) -> Self {
        Self::SettingsToggle(msg.into())
    }
}
