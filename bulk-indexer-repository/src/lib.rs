//! # Bulk Indexer Repository
//!
//! This crate provides the boundaries of the bulk indexing pipeline: the
//! search engine client and the durable recovery queue store. It includes
//! definitions for errors, interfaces, a concrete implementation for
//! OpenSearch and an in-memory recovery queue store.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod types;

pub use config::OpenSearchConfig;
pub use errors::{SearchError, StoreError};
pub use interfaces::{RecoveryQueueStore, SearchEngineClient, StoreSession};
pub use memory::MemoryRecoveryStore;
pub use opensearch::OpenSearchClient;
pub use types::{BulkItemOutcome, BulkResponse, IndexSettings};
