//! Request and response types exchanged with the search engine.

use bulk_indexer_shared::DocumentId;

/// Outcome of a single write inside a bulk transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemOutcome {
    /// The document the write targeted.
    pub document: DocumentId,
    /// HTTP-like status reported by the engine for this item.
    pub status: u16,
    /// Rejection reason, `None` when the write was applied.
    pub error: Option<String>,
}

impl BulkItemOutcome {
    /// An applied write.
    pub fn applied(document: DocumentId, status: u16) -> Self {
        Self {
            document,
            status,
            error: None,
        }
    }

    /// A write rejected by the engine.
    pub fn rejected(document: DocumentId, status: u16, error: impl Into<String>) -> Self {
        Self {
            document,
            status,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-document outcomes of a bulk transmission that reached the engine.
///
/// Items are in the same order as the submitted requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    pub items: Vec<BulkItemOutcome>,
}

impl BulkResponse {
    pub fn new(items: Vec<BulkItemOutcome>) -> Self {
        Self { items }
    }

    /// Documents whose write was applied.
    pub fn acknowledged(&self) -> Vec<DocumentId> {
        self.items
            .iter()
            .filter(|item| item.is_success())
            .map(|item| item.document.clone())
            .collect()
    }

    /// Items rejected by the engine.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItemOutcome> {
        self.items.iter().filter(|item| !item.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| !item.is_success())
    }
}

/// The index settings toggled for large loads.
///
/// `None` means the setting is not explicitly set on the index. Writing `None`
/// back resets the setting to the engine default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSettings {
    pub number_of_replicas: Option<u32>,
    pub refresh_interval: Option<String>,
}

impl IndexSettings {
    /// Refresh interval value that disables periodic refresh.
    pub const REFRESH_DISABLED: &'static str = "-1";

    pub fn new(number_of_replicas: Option<u32>, refresh_interval: Option<String>) -> Self {
        Self {
            number_of_replicas,
            refresh_interval,
        }
    }

    /// Settings applied during a large load: no replicas, no periodic refresh.
    pub fn bulk_load() -> Self {
        Self {
            number_of_replicas: Some(0),
            refresh_interval: Some(Self::REFRESH_DISABLED.to_string()),
        }
    }
}
