//! # Bulk Indexer Shared
//!
//! Plain data types exchanged between the recovery queue, the bulk batcher
//! and the indexers: index/document identifiers, write requests, recovery
//! rows, indexing results and the domain causes that trigger reindexing.

mod cause;
mod document;
mod recovery;
mod request;
mod result;

pub use cause::Cause;
pub use document::{DocumentId, IndexType};
pub use recovery::RecoveryQueueItem;
pub use request::{IndexingRequest, Operation};
pub use result::IndexingResult;
