//! Write operations submitted to the bulk batcher.

use serde_json::{Map, Value};

use crate::document::{DocumentId, IndexType};

/// Fixed per-request overhead of the bulk action line, in bytes.
const ACTION_LINE_OVERHEAD: usize = 48;

/// Kind of write performed by an [`IndexingRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create or fully replace the document.
    Upsert,
    /// Remove the document. Removing a missing document is not an error.
    Delete,
}

/// One write operation against the search engine.
///
/// Requests are immutable once constructed. Their estimated wire size is
/// computed up front so the batcher can bound batches by bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexingRequest {
    index_type: IndexType,
    id: String,
    routing: Option<String>,
    operation: Operation,
    source: Option<Map<String, Value>>,
    estimated_size: usize,
}

impl IndexingRequest {
    /// Create an upsert request carrying the document's field map.
    pub fn upsert(index_type: IndexType, id: impl Into<String>, source: Map<String, Value>) -> Self {
        Self::build(index_type, id.into(), None, Operation::Upsert, Some(source))
    }

    /// Create a delete request.
    pub fn delete(index_type: IndexType, id: impl Into<String>) -> Self {
        Self::build(index_type, id.into(), None, Operation::Delete, None)
    }

    /// Return a copy of this request routed with the given key.
    pub fn with_routing(self, routing: impl Into<String>) -> Self {
        Self::build(
            self.index_type,
            self.id,
            Some(routing.into()),
            self.operation,
            self.source,
        )
    }

    fn build(
        index_type: IndexType,
        id: String,
        routing: Option<String>,
        operation: Operation,
        source: Option<Map<String, Value>>,
    ) -> Self {
        let source_size = source
            .as_ref()
            .and_then(|s| serde_json::to_vec(s).ok())
            .map_or(0, |bytes| bytes.len());
        let estimated_size = ACTION_LINE_OVERHEAD
            + index_type.index.len()
            + index_type.doc_type.len()
            + id.len()
            + routing.as_ref().map_or(0, String::len)
            + source_size;

        Self {
            index_type,
            id,
            routing,
            operation,
            source,
            estimated_size,
        }
    }

    pub fn index_type(&self) -> &IndexType {
        &self.index_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn routing(&self) -> Option<&str> {
        self.routing.as_deref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Field map of an upsert; `None` for deletions.
    pub fn source(&self) -> Option<&Map<String, Value>> {
        self.source.as_ref()
    }

    /// Approximate number of bytes this request adds to a bulk transmission.
    pub fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    /// Identifier used to acknowledge this request.
    pub fn document_id(&self) -> DocumentId {
        self.index_type.document(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(name: &str) -> Map<String, Value> {
        match json!({ "name": name }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_upsert_request() {
        let request = IndexingRequest::upsert(IndexType::new("issues", "issue"), "I1", source("a"));

        assert_eq!(request.operation(), Operation::Upsert);
        assert_eq!(request.document_id(), DocumentId::new("issues", "issue", "I1"));
        assert_eq!(request.source().unwrap()["name"], "a");
        assert!(request.routing().is_none());
    }

    #[test]
    fn test_size_grows_with_source() {
        let index_type = IndexType::new("issues", "issue");
        let small = IndexingRequest::upsert(index_type.clone(), "I1", source("a"));
        let large = IndexingRequest::upsert(index_type.clone(), "I1", source(&"a".repeat(500)));
        let delete = IndexingRequest::delete(index_type, "I1");

        assert!(large.estimated_size() >= small.estimated_size() + 499);
        assert!(delete.estimated_size() < small.estimated_size());
        assert!(delete.source().is_none());
    }

    #[test]
    fn test_routing_is_counted() {
        let request = IndexingRequest::delete(IndexType::new("issues", "issue"), "I1");
        let size = request.estimated_size();
        let routed = request.with_routing("P1");

        assert_eq!(routed.routing(), Some("P1"));
        assert_eq!(routed.estimated_size(), size + 2);
    }
}
