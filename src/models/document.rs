// file: src/models/document.rs
// description: loaded pdf pages and the chunks split from them
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use uuid::Uuid;

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    /// Name of the file as uploaded, not the staged uuid name.
    pub source: String,
    /// 1-based page number.
    pub page: u32,
    pub staged_path: PathBuf,
}

impl SourceDocument {
    pub fn new(content: String, source: String, page: u32, staged_path: PathBuf) -> Self {
        Self {
            content,
            source,
            page,
            staged_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub source: String,
    pub page: u32,
    pub content_hash: String,
}

impl Chunk {
    pub fn new(content: String, source: String, page: u32) -> Self {
        let content_hash = Self::compute_hash(&content);

        Self {
            id: Uuid::new_v4().to_string(),
            content,
            source,
            page,
            content_hash,
        }
    }

    pub fn from_document(content: String, document: &SourceDocument) -> Self {
        Self::new(content, document.source.clone(), document.page)
    }

    pub fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let doc = SourceDocument::new(
            "page text".to_string(),
            "report.pdf".to_string(),
            3,
            PathBuf::from("Temp_Files/abc.pdf"),
        );
        let chunk = Chunk::from_document("page text".to_string(), &doc);

        assert_eq!(chunk.source, "report.pdf");
        assert_eq!(chunk.page, 3);
        assert_eq!(chunk.content_hash.len(), 64);
        assert!(Uuid::parse_str(&chunk.id).is_ok());
    }

    #[test]
    fn test_hash_consistency() {
        let a = Chunk::new("same".to_string(), "a.pdf".to_string(), 1);
        let b = Chunk::new("same".to_string(), "b.pdf".to_string(), 2);
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_char_len_counts_unicode() {
        let chunk = Chunk::new("héllo".to_string(), "a.pdf".to_string(), 1);
        assert_eq!(chunk.char_len(), 5);
    }
}
