//! Bulk batcher for the indexing pipeline.
//!
//! Accumulates write requests into byte-bounded batches, transmits them to
//! the search engine and reports per-document acknowledgments to an
//! [`IndexingListener`](crate::listener::IndexingListener).

mod batch;
mod config;
mod indexer;

pub use batch::BulkBatch;
pub use config::{large_load_concurrency, BulkIndexerConfig, SizeProfile};
pub use indexer::BulkIndexer;
