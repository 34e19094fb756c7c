//! Index and document identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An index name paired with a document-type discriminator.
///
/// Displayed as `index/type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexType {
    /// Name (or alias) of the index in the search engine.
    pub index: String,
    /// Document-type discriminator inside the index.
    pub doc_type: String,
}

impl IndexType {
    /// Create a new index type.
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }

    /// Identify a document of this type.
    pub fn document(&self, id: impl Into<String>) -> DocumentId {
        DocumentId::new(self.index.clone(), self.doc_type.clone(), id)
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.doc_type)
    }
}

/// The `(index, type, id)` triple identifying a written document.
///
/// Used by the batcher to acknowledge individual writes and by the one-to-one
/// listener to match acknowledgments against recovery-queue rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

impl DocumentId {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.doc_type, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let index_type = IndexType::new("issues", "issue");
        assert_eq!(index_type.to_string(), "issues/issue");
        assert_eq!(index_type.document("I1").to_string(), "issues/issue/I1");
    }

    #[test]
    fn test_document_id_equality_uses_all_fields() {
        let a = DocumentId::new("issues", "issue", "I1");
        assert_eq!(a, IndexType::new("issues", "issue").document("I1"));
        assert_ne!(a, DocumentId::new("issues", "auth", "I1"));
        assert_ne!(a, DocumentId::new("rules", "issue", "I1"));
        assert_ne!(a, DocumentId::new("issues", "issue", "I2"));
    }
}
