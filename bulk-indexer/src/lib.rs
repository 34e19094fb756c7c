//! # Bulk Indexer
//!
//! Configuration and wiring for running the resilient bulk indexing
//! pipeline: settings from the environment, logging, the OpenSearch client,
//! the indexer registry and the startup bootstrap.

pub mod config;

pub use config::{Dependencies, IndexerSettings, LogFormat};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] bulk_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] bulk_indexer_repository::SearchError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing(format: LogFormat) -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| IndexingError::config(format!("Failed to install tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so both
    // formats are checked in a single test.
    #[test]
    fn test_init_tracing_installs_once() {
        assert!(init_tracing(LogFormat::Json).is_ok());

        assert!(matches!(
            init_tracing(LogFormat::Text),
            Err(IndexingError::ConfigError(_))
        ));
        assert!(matches!(
            init_tracing(LogFormat::Json),
            Err(IndexingError::ConfigError(_))
        ));
    }
}
