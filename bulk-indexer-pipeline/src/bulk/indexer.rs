//! Bulk indexer implementation.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::bulk::batch::BulkBatch;
use crate::bulk::config::{BulkIndexerConfig, SizeProfile};
use crate::errors::PipelineError;
use crate::listener::IndexingListener;
use bulk_indexer_repository::{IndexSettings, SearchEngineClient};
use bulk_indexer_shared::{IndexingRequest, IndexingResult};

/// Batches write requests and transmits them to the search engine.
///
/// A session is `start()`, any number of `add()`, then `stop()`. In the
/// [`SizeProfile::Large`] profile the target index has its replicas and
/// periodic refresh disabled between `start()` and `stop()`; at most one
/// large session may run per index at a time.
///
/// # Example
///
/// ```ignore
/// let mut bulk = BulkIndexer::new(client, "issues", SizeProfile::Regular)
///     .with_listener(IndexingListener::one_to_one(store, items));
/// bulk.start().await?;
/// for request in requests {
///     bulk.add(request).await;
/// }
/// let result = bulk.stop().await?;
/// ```
pub struct BulkIndexer {
    client: Arc<dyn SearchEngineClient>,
    index: String,
    profile: SizeProfile,
    config: BulkIndexerConfig,
    listener: Arc<IndexingListener>,
    span: Span,
    batch: BulkBatch,
    permits: Option<Arc<Semaphore>>,
    in_flight: Vec<JoinHandle<u64>>,
    total: u64,
    success: u64,
    saved_settings: Option<IndexSettings>,
}

impl BulkIndexer {
    /// Create a bulk indexer for the given target index with default configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>, index: impl Into<String>, profile: SizeProfile) -> Self {
        Self::with_config(client, index, profile, BulkIndexerConfig::default())
    }

    /// Create a bulk indexer with custom configuration.
    pub fn with_config(
        client: Arc<dyn SearchEngineClient>,
        index: impl Into<String>,
        profile: SizeProfile,
        config: BulkIndexerConfig,
    ) -> Self {
        let index = index.into();
        let concurrency = config.concurrency(profile);
        let span = info_span!("bulk_session", index = %index, profile = ?profile);

        Self {
            client,
            profile,
            listener: Arc::new(IndexingListener::Noop),
            span,
            batch: BulkBatch::new(config.flush_byte_size),
            permits: (concurrency > 0).then(|| Arc::new(Semaphore::new(concurrency))),
            in_flight: Vec::new(),
            total: 0,
            success: 0,
            saved_settings: None,
            index,
            config,
        }
    }

    /// Set the listener notified of acknowledgments and of the final result.
    pub fn with_listener(mut self, listener: IndexingListener) -> Self {
        self.listener = Arc::new(listener);
        self
    }

    /// Set the tracing context of the session. `Span::none()` disables it.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn profile(&self) -> SizeProfile {
        self.profile
    }

    /// Number of transmissions allowed in flight besides the caller's own.
    pub fn concurrency(&self) -> usize {
        self.config.concurrency(self.profile)
    }

    /// Begin a session.
    ///
    /// In the large profile, remembers the current replica count and refresh
    /// interval, then disables both. Failing to do so aborts the session.
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        self.total = 0;
        self.success = 0;
        self.batch.take();

        // Settings already toggled by a previous start must not be saved as the originals.
        if self.profile == SizeProfile::Large && self.saved_settings.is_none() {
            let current = self
                .client
                .get_index_settings(&self.index)
                .instrument(self.span.clone())
                .await
                .map_err(|e| {
                    PipelineError::settings_toggle(format!(
                        "Cannot read settings of {}: {}",
                        self.index, e
                    ))
                })?;

            self.client
                .put_index_settings(&self.index, &IndexSettings::bulk_load())
                .instrument(self.span.clone())
                .await
                .map_err(|e| {
                    PipelineError::settings_toggle(format!(
                        "Cannot disable replicas and refresh of {}: {}",
                        self.index, e
                    ))
                })?;

            info!(
                parent: &self.span,
                replicas = ?current.number_of_replicas,
                refresh_interval = ?current.refresh_interval,
                "Replicas and refresh disabled for large load"
            );
            self.saved_settings = Some(current);
        }

        debug!(parent: &self.span, concurrency = self.concurrency(), "Bulk session started");
        Ok(())
    }

    /// Queue a request, flushing the current batch first if the request
    /// would push it past the byte threshold.
    ///
    /// Only waits when every in-flight slot is busy.
    pub async fn add(&mut self, request: IndexingRequest) {
        if self.batch.would_overflow(&request) {
            self.flush().await;
        }
        self.total += 1;
        self.batch.push(request);
    }

    /// Drain the session and return its result.
    ///
    /// Flushes the partial batch and waits for in-flight transmissions, both
    /// within the drain timeout, then refreshes the index and, in the large
    /// profile, force-merges it before restoring the remembered settings.
    pub async fn stop(&mut self) -> Result<IndexingResult, PipelineError> {
        let timeout = self.config.drain_timeout;
        let pending = self.in_flight.len() + usize::from(!self.batch.is_empty());
        let drain = async {
            self.flush().await;
            join_all(std::mem::take(&mut self.in_flight)).await
        };
        let drained = tokio::time::timeout(timeout, drain).await;

        match drained {
            Ok(joined) => {
                for outcome in joined {
                    self.record_joined(outcome);
                }
            }
            Err(_) => {
                // Abandoned transmissions keep running detached.
                self.in_flight.clear();
                error!(
                    parent: &self.span,
                    pending,
                    timeout = ?timeout,
                    "Bulk transmissions did not complete in time"
                );
                if let Err(e) = self.restore_settings().await {
                    error!(parent: &self.span, error = %e, "Failed to restore index settings after drain timeout");
                }
                return Err(PipelineError::drain_timeout(self.index.clone(), timeout));
            }
        }

        let finalized = self.finalize_index().await;
        let restored = self.restore_settings().await;
        finalized?;
        restored?;

        let result = IndexingResult::new(self.total, self.success);
        info!(
            parent: &self.span,
            total = result.total(),
            success = result.success(),
            failures = result.failures(),
            "Bulk session completed"
        );
        self.listener.on_finish(&result).await;
        Ok(result)
    }

    /// Transmit the current batch, inline or on a worker task.
    async fn flush(&mut self) {
        self.reap_finished().await;
        if self.batch.is_empty() {
            return;
        }
        debug!(
            parent: &self.span,
            bytes = self.batch.byte_size(),
            "Flushing batch"
        );
        let requests = self.batch.take();
        let client = self.client.clone();
        let listener = self.listener.clone();

        let Some(permits) = self.permits.clone() else {
            self.success += transmit(client, listener, requests)
                .instrument(self.span.clone())
                .await;
            return;
        };

        match permits.acquire_owned().await {
            Ok(permit) => {
                let task = async move {
                    let acknowledged = transmit(client, listener, requests).await;
                    drop(permit);
                    acknowledged
                };
                self.in_flight
                    .push(tokio::spawn(task.instrument(self.span.clone())));
            }
            Err(_) => {
                warn!(parent: &self.span, "Transmission slots closed, transmitting inline");
                self.success += transmit(client, listener, requests)
                    .instrument(self.span.clone())
                    .await;
            }
        }
    }

    /// Collect the counts of transmissions that already completed.
    async fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|handle| handle.is_finished());
        self.in_flight = running;
        for handle in finished {
            let outcome = handle.await;
            self.record_joined(outcome);
        }
    }

    fn record_joined(&mut self, outcome: Result<u64, tokio::task::JoinError>) {
        match outcome {
            Ok(acknowledged) => self.success += acknowledged,
            Err(e) => error!(parent: &self.span, error = %e, "Bulk transmission task failed"),
        }
    }

    async fn finalize_index(&self) -> Result<(), PipelineError> {
        self.client
            .refresh(&self.index)
            .instrument(self.span.clone())
            .await?;
        if self.profile == SizeProfile::Large {
            // Merge before replicas come back so segments are not merged on each copy.
            self.client
                .force_merge(&self.index)
                .instrument(self.span.clone())
                .await?;
        }
        Ok(())
    }

    async fn restore_settings(&mut self) -> Result<(), PipelineError> {
        let Some(saved) = self.saved_settings.take() else {
            return Ok(());
        };

        self.client
            .put_index_settings(&self.index, &saved)
            .instrument(self.span.clone())
            .await
            .map_err(|e| {
                PipelineError::settings_toggle(format!(
                    "Cannot restore settings of {}: {}",
                    self.index, e
                ))
            })?;

        info!(
            parent: &self.span,
            replicas = ?saved.number_of_replicas,
            refresh_interval = ?saved.refresh_interval,
            "Index settings restored"
        );
        Ok(())
    }
}

/// Send one batch and report its acknowledged documents.
///
/// Returns the number of acknowledged writes; a failed transmission
/// acknowledges nothing.
async fn transmit(
    client: Arc<dyn SearchEngineClient>,
    listener: Arc<IndexingListener>,
    requests: Vec<IndexingRequest>,
) -> u64 {
    let count = requests.len();
    match client.bulk(&requests).await {
        Ok(response) => {
            for failure in response.failures() {
                error!(
                    document = %failure.document,
                    status = failure.status,
                    error = failure.error.as_deref().unwrap_or_default(),
                    "Document rejected by search engine"
                );
            }
            let mut acknowledged = response.acknowledged();
            acknowledged.truncate(count);
            if !acknowledged.is_empty() {
                listener.on_success(&acknowledged).await;
            }
            debug!(count, acknowledged = acknowledged.len(), "Batch transmitted");
            acknowledged.len() as u64
        }
        Err(e) => {
            let first = requests.first().map(|r| r.document_id().to_string());
            error!(
                error = %e,
                count,
                first_document = ?first,
                "Bulk transmission failed, no document acknowledged"
            );
            0
        }
    }
}
