//! Configuration for the bulk indexer.

use std::time::Duration;

/// Default flush threshold: 1 MiB of accumulated requests.
pub const DEFAULT_FLUSH_BYTE_SIZE: usize = 1024 * 1024;

/// Default bound on the wait for in-flight transmissions in `stop()`.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of primary shards assumed per index.
pub const DEFAULT_ASSUMED_SHARD_COUNT: usize = 5;

/// Operating profile of a bulk session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeProfile {
    /// Incremental indexing: synchronous transmissions, settings untouched.
    Regular,
    /// Full reindex: concurrent transmissions, replicas and periodic refresh
    /// disabled for the duration of the session.
    Large,
}

/// Configuration for the bulk indexer.
#[derive(Debug, Clone)]
pub struct BulkIndexerConfig {
    /// Accumulated request size that triggers a flush, in bytes.
    pub flush_byte_size: usize,
    /// Maximum time `stop()` waits for in-flight transmissions.
    pub drain_timeout: Duration,
    /// Number of shards the engine is assumed to ingest in parallel.
    pub assumed_shard_count: usize,
    /// Number of cores available to this process.
    pub available_cores: usize,
}

impl Default for BulkIndexerConfig {
    fn default() -> Self {
        Self {
            flush_byte_size: DEFAULT_FLUSH_BYTE_SIZE,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            assumed_shard_count: DEFAULT_ASSUMED_SHARD_COUNT,
            available_cores: num_cpus::get(),
        }
    }
}

impl BulkIndexerConfig {
    pub fn with_flush_byte_size(mut self, flush_byte_size: usize) -> Self {
        self.flush_byte_size = flush_byte_size;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub fn with_assumed_shard_count(mut self, assumed_shard_count: usize) -> Self {
        self.assumed_shard_count = assumed_shard_count;
        self
    }

    pub fn with_available_cores(mut self, available_cores: usize) -> Self {
        self.available_cores = available_cores;
        self
    }

    /// Number of transmissions allowed in flight besides the caller's own.
    ///
    /// Zero means batches are transmitted synchronously by the caller.
    pub fn concurrency(&self, profile: SizeProfile) -> usize {
        match profile {
            SizeProfile::Regular => 0,
            SizeProfile::Large => {
                large_load_concurrency(self.available_cores, self.assumed_shard_count)
            }
        }
    }
}

/// `max(1, cores / shards) - 1`: the engine already parallelizes ingestion
/// per shard, so more client-side concurrency only adds load.
pub fn large_load_concurrency(available_cores: usize, assumed_shard_count: usize) -> usize {
    let per_shard = available_cores / assumed_shard_count.max(1);
    per_shard.max(1) - 1
}
