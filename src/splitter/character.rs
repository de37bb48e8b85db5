// file: src/splitter/character.rs
// description: separator based text splitter producing size bounded chunks
// reference: internal chunking rules

use crate::config::PipelineConfig;
use crate::error::{RagError, Result};
use crate::models::{Chunk, SourceDocument};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Splits on a separator and greedily merges the pieces back into chunks of
/// at most `chunk_size` characters. A single piece longer than `chunk_size`
/// becomes its own chunk.
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap > chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.separator.clone(), config.chunk_size, config.chunk_overlap)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        // An empty separator splits between every character.
        let splits: Vec<&str> = text
            .split(self.separator.as_str())
            .filter(|s| !s.is_empty())
            .collect();

        self.merge_splits(&splits)
    }

    pub fn split_documents(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .map(move |content| Chunk::from_document(content, doc))
            })
            .collect();

        debug!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let separator_len = char_len(&self.separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joined_len = |current: &VecDeque<&str>| {
                if current.is_empty() { 0 } else { separator_len }
            };

            if total + len + joined_len(&current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }

                    while total > self.chunk_overlap
                        || (total + len + joined_len(&current) > self.chunk_size && total > 0)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        total -= char_len(front) + if current.is_empty() { 0 } else { separator_len };
                    }
                }
            }

            total += len + joined_len(&current);
            current.push_back(split);
        }

        if total > self.chunk_size {
            warn!(
                "Created a chunk of size {}, which is longer than the specified {}",
                total, self.chunk_size
            );
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }

        chunks
    }

    fn join(&self, pieces: &VecDeque<&str>) -> Option<String> {
        let joined = pieces
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_merges_small_paragraphs() {
        let splitter = CharacterTextSplitter::new("\n\n", 20, 0).unwrap();
        let chunks = splitter.split_text("one two\n\nthree\n\nfour five six seven");

        assert_eq!(chunks, vec!["one two\n\nthree", "four five six seven"]);
    }

    #[test]
    fn test_oversized_piece_is_kept_whole() {
        let splitter = CharacterTextSplitter::new("\n\n", 10, 0).unwrap();
        let long = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter.split_text(&format!("short\n\n{}\n\ntail", long));

        assert_eq!(chunks, vec!["short", long, "tail"]);
    }

    #[test]
    fn test_overlap_repeats_trailing_pieces() {
        let splitter = CharacterTextSplitter::new(" ", 7, 3).unwrap();
        let chunks = splitter.split_text("foo bar baz 123");

        assert_eq!(chunks, vec!["foo bar", "bar baz", "baz 123"]);
    }

    #[test]
    fn test_no_empty_chunks() {
        let splitter = CharacterTextSplitter::new("\n\n", 1000, 0).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("\n\n\n\n   \n\n").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let splitter = CharacterTextSplitter::new("\n\n", 1000, 0).unwrap();
        let paragraph = "lorem ipsum dolor sit amet ".repeat(8);
        let text = vec![paragraph.trim(); 40].join("\n\n");

        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));

        let rejoined = chunks.join("\n\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        assert!(CharacterTextSplitter::new("\n\n", 10, 11).is_err());
        assert!(CharacterTextSplitter::new("\n\n", 0, 0).is_err());
    }

    #[test]
    fn test_split_documents_carries_metadata() {
        let splitter = CharacterTextSplitter::new("\n\n", 5, 0).unwrap();
        let docs = vec![SourceDocument::new(
            "alpha\n\nbeta".to_string(),
            "paper.pdf".to_string(),
            2,
            PathBuf::from("Temp_Files/x.pdf"),
        )];

        let chunks = splitter.split_documents(&docs);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.source == "paper.pdf" && c.page == 2));
        assert_eq!(chunks[0].content, "alpha");
        assert_eq!(chunks[1].content, "beta");
    }
}
