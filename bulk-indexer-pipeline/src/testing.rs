//! Test doubles shared by the pipeline's unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::bulk::{BulkIndexer, BulkIndexerConfig, SizeProfile};
use crate::errors::PipelineError;
use crate::indexer::{ResilientIndexer, StartupIndexer, StartupType};
use crate::listener::IndexingListener;
use bulk_indexer_repository::{
    BulkItemOutcome, BulkResponse, IndexSettings, RecoveryQueueStore, SearchEngineClient,
    SearchError,
};
use bulk_indexer_shared::{
    Cause, DocumentId, IndexType, IndexingRequest, IndexingResult, Operation, RecoveryQueueItem,
};

/// A call received by the fake engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Bulk(usize),
    GetSettings(String),
    PutSettings(String, IndexSettings),
    Refresh(String),
    ForceMerge(String),
}

/// In-memory search engine with failure injection.
pub struct FakeSearchEngine {
    documents: Mutex<BTreeMap<DocumentId, Map<String, Value>>>,
    settings: Mutex<HashMap<String, IndexSettings>>,
    calls: Mutex<Vec<EngineCall>>,
    locked_indices: Mutex<HashSet<String>>,
    rejected_ids: Mutex<HashSet<String>>,
    existing_indices: Mutex<HashSet<String>>,
    bulk_delay: Mutex<Option<Duration>>,
    fail_transport: AtomicBool,
    fail_settings: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSearchEngine {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            settings: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            locked_indices: Mutex::new(HashSet::new()),
            rejected_ids: Mutex::new(HashSet::new()),
            existing_indices: Mutex::new(HashSet::new()),
            bulk_delay: Mutex::new(None),
            fail_transport: AtomicBool::new(false),
            fail_settings: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub async fn set_settings(&self, index: &str, settings: IndexSettings) {
        self.settings.lock().await.insert(index.to_string(), settings);
    }

    pub async fn settings_of(&self, index: &str) -> IndexSettings {
        self.settings.lock().await.get(index).cloned().unwrap_or_default()
    }

    /// Reject every write to the index, like a read-only index.
    pub async fn lock_writes(&self, index: &str) {
        self.locked_indices.lock().await.insert(index.to_string());
    }

    pub async fn unlock_writes(&self, index: &str) {
        self.locked_indices.lock().await.remove(index);
    }

    /// Reject writes of documents with this id.
    pub async fn reject_id(&self, id: &str) {
        self.rejected_ids.lock().await.insert(id.to_string());
    }

    pub async fn create_index(&self, index: &str) {
        self.existing_indices.lock().await.insert(index.to_string());
    }

    pub async fn delay_bulk(&self, delay: Duration) {
        *self.bulk_delay.lock().await = Some(delay);
    }

    pub fn fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    pub fn fail_settings(&self, fail: bool) {
        self.fail_settings.store(fail, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().await.clone()
    }

    pub async fn bulk_calls(&self) -> Vec<usize> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                EngineCall::Bulk(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub async fn document(&self, document: &DocumentId) -> Option<Map<String, Value>> {
        self.documents.lock().await.get(document).cloned()
    }

    pub async fn document_ids(&self, index: &str) -> Vec<String> {
        self.documents
            .lock()
            .await
            .keys()
            .filter(|document| document.index == index)
            .map(|document| document.id.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: EngineCall) {
        self.calls.lock().await.push(call);
    }

    async fn apply(&self, request: &IndexingRequest) -> BulkItemOutcome {
        let document = request.document_id();
        if self.locked_indices.lock().await.contains(&document.index) {
            return BulkItemOutcome::rejected(document, 403, "cluster_block_exception");
        }
        if self.rejected_ids.lock().await.contains(&document.id) {
            return BulkItemOutcome::rejected(document, 400, "mapper_parsing_exception");
        }

        let mut documents = self.documents.lock().await;
        match request.operation() {
            Operation::Upsert => {
                let existed = documents
                    .insert(document.clone(), request.source().cloned().unwrap_or_default())
                    .is_some();
                BulkItemOutcome::applied(document, if existed { 200 } else { 201 })
            }
            Operation::Delete => {
                let existed = documents.remove(&document).is_some();
                BulkItemOutcome::applied(document, if existed { 200 } else { 404 })
            }
        }
    }
}

#[async_trait]
impl SearchEngineClient for FakeSearchEngine {
    async fn bulk(&self, requests: &[IndexingRequest]) -> Result<BulkResponse, SearchError> {
        self.record(EngineCall::Bulk(requests.len())).await;
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.bulk_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_transport.load(Ordering::SeqCst) {
            Err(SearchError::transport("connection reset by peer"))
        } else {
            let mut items = Vec::with_capacity(requests.len());
            for request in requests {
                items.push(self.apply(request).await);
            }
            Ok(BulkResponse::new(items))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get_index_settings(&self, index: &str) -> Result<IndexSettings, SearchError> {
        self.record(EngineCall::GetSettings(index.to_string())).await;
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(SearchError::settings("settings unavailable"));
        }
        Ok(self.settings_of(index).await)
    }

    async fn put_index_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchError> {
        self.record(EngineCall::PutSettings(index.to_string(), settings.clone()))
            .await;
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(SearchError::settings("settings unavailable"));
        }
        self.set_settings(index, settings.clone()).await;
        Ok(())
    }

    async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        self.record(EngineCall::Refresh(index.to_string())).await;
        Ok(())
    }

    async fn force_merge(&self, index: &str) -> Result<(), SearchError> {
        self.record(EngineCall::ForceMerge(index.to_string())).await;
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        Ok(self.existing_indices.lock().await.contains(index))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

pub fn source(name: &str) -> Map<String, Value> {
    match json!({ "name": name }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

pub fn issue_type() -> IndexType {
    IndexType::new("issues", "issue")
}

pub fn project_type() -> IndexType {
    IndexType::new("projects", "project")
}

/// Indexes one issue document per entity id, retiring rows one by one.
pub struct IssueIndexer {
    engine: Arc<FakeSearchEngine>,
    store: Arc<dyn RecoveryQueueStore>,
    config: BulkIndexerConfig,
    startup_type: StartupType,
    pub calls: Mutex<Vec<Vec<RecoveryQueueItem>>>,
    /// Committed row count observed at each `index` call.
    pub committed_rows_seen: Mutex<Vec<usize>>,
}

impl IssueIndexer {
    pub fn new(engine: Arc<FakeSearchEngine>, store: Arc<dyn RecoveryQueueStore>) -> Self {
        Self {
            engine,
            store,
            config: BulkIndexerConfig::default().with_available_cores(20),
            startup_type: StartupType::Synchronous,
            calls: Mutex::new(Vec::new()),
            committed_rows_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn asynchronous(mut self) -> Self {
        self.startup_type = StartupType::Asynchronous;
        self
    }
}

#[async_trait]
impl StartupIndexer for IssueIndexer {
    fn index_types(&self) -> Vec<IndexType> {
        vec![issue_type()]
    }

    fn startup_type(&self) -> StartupType {
        self.startup_type
    }

    async fn index_on_startup(
        &self,
        _uninitialized: &HashSet<IndexType>,
    ) -> Result<IndexingResult, PipelineError> {
        let mut bulk = BulkIndexer::with_config(
            self.engine.clone(),
            "issues",
            SizeProfile::Large,
            self.config.clone(),
        );
        bulk.start().await?;
        for id in ["I1", "I2", "I3"] {
            bulk.add(IndexingRequest::upsert(issue_type(), id, source(id)))
                .await;
        }
        bulk.stop().await
    }
}

#[async_trait]
impl ResilientIndexer for IssueIndexer {
    fn name(&self) -> &str {
        "issues"
    }

    fn prepare_for_recovery(&self, cause: Cause, entity_ids: &[String]) -> Vec<RecoveryQueueItem> {
        match cause {
            Cause::EntityCreation | Cause::EntityDeletion | Cause::EntityTagsUpdate => entity_ids
                .iter()
                .map(|id| RecoveryQueueItem::for_document(issue_type(), id.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    async fn index(&self, items: Vec<RecoveryQueueItem>) -> Result<IndexingResult, PipelineError> {
        self.calls.lock().await.push(items.clone());
        let committed = self.store.count().await.unwrap_or_default();
        self.committed_rows_seen.lock().await.push(committed);
        let mut bulk = BulkIndexer::new(self.engine.clone(), "issues", SizeProfile::Regular)
            .with_listener(IndexingListener::one_to_one(self.store.clone(), items.clone()));
        bulk.start().await?;
        for item in &items {
            bulk.add(IndexingRequest::upsert(
                item.index_type.clone(),
                item.doc_id.clone(),
                source(&item.doc_id),
            ))
            .await;
        }
        bulk.stop().await
    }
}

/// Indexes every document of a project key, retiring rows all at once.
pub struct ProjectIndexer {
    engine: Arc<FakeSearchEngine>,
    store: Arc<dyn RecoveryQueueStore>,
    documents_per_project: usize,
    pub fail: AtomicBool,
}

impl ProjectIndexer {
    pub fn new(
        engine: Arc<FakeSearchEngine>,
        store: Arc<dyn RecoveryQueueStore>,
        documents_per_project: usize,
    ) -> Self {
        Self {
            engine,
            store,
            documents_per_project,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl StartupIndexer for ProjectIndexer {
    fn index_types(&self) -> Vec<IndexType> {
        vec![project_type()]
    }

    async fn index_on_startup(
        &self,
        _uninitialized: &HashSet<IndexType>,
    ) -> Result<IndexingResult, PipelineError> {
        Ok(IndexingResult::empty())
    }
}

#[async_trait]
impl ResilientIndexer for ProjectIndexer {
    fn name(&self) -> &str {
        "projects"
    }

    fn prepare_for_recovery(&self, cause: Cause, entity_ids: &[String]) -> Vec<RecoveryQueueItem> {
        match cause {
            Cause::EntityCreation | Cause::PermissionChange | Cause::MeasureChange => entity_ids
                .iter()
                .map(|id| RecoveryQueueItem::for_key(project_type(), "project", id.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    async fn index(&self, items: Vec<RecoveryQueueItem>) -> Result<IndexingResult, PipelineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PipelineError::settings_toggle("projects index unavailable"));
        }
        let mut bulk = BulkIndexer::new(self.engine.clone(), "projects", SizeProfile::Regular)
            .with_listener(IndexingListener::one_to_many(self.store.clone(), items.clone()));
        bulk.start().await?;
        for item in &items {
            for n in 0..self.documents_per_project {
                let id = format!("{}-{}", item.doc_id, n);
                bulk.add(IndexingRequest::upsert(project_type(), id.clone(), source(&id)))
                    .await;
            }
        }
        bulk.stop().await
    }
}
