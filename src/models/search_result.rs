// file: src/models/search_result.rs
// description: Search result model with similarity scores
// reference: Used for vector similarity search results

use crate::models::Chunk;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,

    /// Similarity score (higher is more similar, typically 0.0-1.0)
    pub score: f32,

    /// Raw distance when the backend reports one (lower is more similar)
    pub distance: Option<f32>,
}

impl RetrievedChunk {
    pub fn new(chunk: Chunk, score: f32, distance: Option<f32>) -> Self {
        Self {
            chunk,
            score,
            distance,
        }
    }

    /// Score derived from an L2 distance.
    pub fn from_distance(chunk: Chunk, distance: f32) -> Self {
        Self::new(chunk, 1.0 / (1.0 + distance), Some(distance))
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let content_preview = if self.chunk.content.chars().count() > max_content_len {
            let truncated: String = self.chunk.content.chars().take(max_content_len).collect();
            format!("{}...", truncated)
        } else {
            self.chunk.content.clone()
        };

        format!(
            "Score: {:.4} | {} (page {})\n{}\n",
            self.score, self.chunk.source, self.chunk.page, content_preview
        )
    }
}
