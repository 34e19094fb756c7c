//! Byte-bounded accumulation of write requests.

use bulk_indexer_shared::IndexingRequest;

/// Requests awaiting transmission, bounded by accumulated byte size.
///
/// A request that would push the batch past the threshold must be preceded by
/// a flush, so a batch only exceeds the threshold when it holds a single
/// oversized request.
#[derive(Debug)]
pub struct BulkBatch {
    threshold: usize,
    requests: Vec<IndexingRequest>,
    byte_size: usize,
}

impl BulkBatch {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            requests: Vec::new(),
            byte_size: 0,
        }
    }

    /// True when `request` cannot be accepted without first flushing.
    pub fn would_overflow(&self, request: &IndexingRequest) -> bool {
        !self.requests.is_empty() && self.byte_size + request.estimated_size() > self.threshold
    }

    pub fn push(&mut self, request: IndexingRequest) {
        self.byte_size += request.estimated_size();
        self.requests.push(request);
    }

    /// Hand the accumulated requests over and reset to empty.
    pub fn take(&mut self) -> Vec<IndexingRequest> {
        self.byte_size = 0;
        std::mem::take(&mut self.requests)
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }
}
