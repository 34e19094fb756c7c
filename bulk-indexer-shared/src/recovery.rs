//! Recovery-queue rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{DocumentId, IndexType};

/// A durable indexing obligation, created in the same transaction as the
/// mutation that caused it.
///
/// When `doc_id_type` is `None`, `doc_id` is the id of the single document the
/// row produces. Otherwise `doc_id` is a key of kind `doc_id_type` (a project,
/// a branch...) that expands to an unknown number of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryQueueItem {
    /// Opaque row identifier.
    pub item_id: Uuid,
    /// Index and document type the row must be replayed against.
    pub index_type: IndexType,
    /// Produced document id, or the key expanding to many documents.
    pub doc_id: String,
    /// Kind of key held in `doc_id`, `None` for a direct document id.
    pub doc_id_type: Option<String>,
    /// Routing key used when writing the produced document(s).
    pub doc_routing: Option<String>,
    /// Creation time, used by the recovery sweep to pick old rows.
    pub created_at: DateTime<Utc>,
}

impl RecoveryQueueItem {
    /// Row that produces exactly one document.
    pub fn for_document(index_type: IndexType, doc_id: impl Into<String>) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            index_type,
            doc_id: doc_id.into(),
            doc_id_type: None,
            doc_routing: None,
            created_at: Utc::now(),
        }
    }

    /// Row keyed by `key` of kind `key_type`, producing many documents.
    pub fn for_key(
        index_type: IndexType,
        key_type: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            index_type,
            doc_id: key.into(),
            doc_id_type: Some(key_type.into()),
            doc_routing: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.doc_routing = Some(routing.into());
        self
    }

    /// The document this row produces, when the mapping is one-to-one.
    pub fn produced_document_id(&self) -> Option<DocumentId> {
        match self.doc_id_type {
            None => Some(self.index_type.document(self.doc_id.clone())),
            Some(_) => None,
        }
    }
}
