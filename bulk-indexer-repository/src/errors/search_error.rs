//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A whole request failed in transit or was rejected as a whole.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Failed to read or write index settings.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// Failed to refresh an index.
    #[error("Refresh error: {0}")]
    RefreshError(String),

    /// Failed to force-merge an index.
    #[error("Force merge error: {0}")]
    ForceMergeError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    /// Create a refresh error.
    pub fn refresh(msg: impl Into<String>) -> Self {
        Self::RefreshError(msg.into())
    }

    /// Create a force merge error.
    pub fn force_merge(msg: impl Into<String>) -> Self {
        Self::ForceMergeError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
