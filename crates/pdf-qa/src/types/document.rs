//! Document, page and chunk types with page tracking

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text of a single page, as produced by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub text: String,
}

impl Page {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// An uploaded document after extraction. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded by user
    pub filename: String,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    /// Pages in document order
    pub pages: Vec<Page>,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document from extracted pages
    pub fn new(filename: impl Into<String>, content_hash: String, pages: Vec<Page>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_hash,
            pages,
            uploaded_at: chrono::Utc::now(),
        }
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A bounded, overlapping slice of one page's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content
    pub text: String,
    /// Page where the chunk's first character falls
    pub source_page: u32,
    /// Position of this chunk in document order
    pub sequence_index: u32,
    /// Character offsets within the source page's text
    pub char_start: usize,
    pub char_end: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        text: String,
        source_page: u32,
        sequence_index: u32,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            source_page,
            sequence_index,
            char_start,
            char_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_counts() {
        let doc = Document::new(
            "a.pdf",
            "hash".to_string(),
            vec![Page::new(1, "héllo"), Page::new(2, "")],
        );
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[1].page_number, 2);
        assert_eq!(doc.content_hash, "hash");
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let a = Chunk::new("The sky is blue.".to_string(), 1, 0, 0, 16);
        let b = Chunk::new("The sky is blue.".to_string(), 1, 0, 0, 16);
        assert_ne!(a.id, b.id);
        assert_eq!(a.char_end - a.char_start, 16);
    }
}
