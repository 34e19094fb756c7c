//! # Bulk Indexer Pipeline
//!
//! This crate keeps search indices in sync with domain mutations without
//! losing updates when the search engine misbehaves.
//!
//! ## Architecture
//!
//! 1. **Registry**: asks every indexer what a mutation requires, persists it
//!    as recovery-queue rows in the mutation's transaction, commits, then
//!    calls each indexer
//! 2. **Bulk**: batches writes by byte size and transmits them, with bounded
//!    parallelism and index tuning for large loads
//! 3. **Listener**: deletes recovery-queue rows once their documents are
//!    acknowledged; anything unconfirmed stays queued for the recovery sweep
//! 4. **Indexer**: capabilities an index implements, including startup loads

pub mod bulk;
pub mod errors;
pub mod indexer;
pub mod listener;
pub mod registry;

#[cfg(test)]
mod testing;

pub use bulk::{BulkIndexer, BulkIndexerConfig, SizeProfile};
pub use errors::PipelineError;
pub use indexer::{ResilientIndexer, StartupBootstrap, StartupIndexer, StartupType};
pub use listener::IndexingListener;
pub use registry::IndexerRegistry;
