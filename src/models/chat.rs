// file: src/models/chat.rs
// description: conversation turns and answers returned by the retrieval chain

use crate::models::RetrievedChunk;
use serde::{Deserialize, Serialize};

/// One question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Question actually sent to the retriever after condensing.
    pub standalone_question: String,
    pub sources: Vec<RetrievedChunk>,
}

impl Answer {
    /// Distinct `source (page n)` labels in retrieval order.
    pub fn source_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for result in &self.sources {
            let label = format!("{} (page {})", result.chunk.source, result.chunk.page);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    #[test]
    fn test_source_labels_dedup() {
        let sources = vec![
            RetrievedChunk::new(Chunk::new("a".into(), "x.pdf".into(), 1), 0.9, None),
            RetrievedChunk::new(Chunk::new("b".into(), "x.pdf".into(), 1), 0.8, None),
            RetrievedChunk::new(Chunk::new("c".into(), "y.pdf".into(), 2), 0.7, None),
        ];
        let answer = Answer {
            text: "42".to_string(),
            standalone_question: "q".to_string(),
            sources,
        };

        assert_eq!(answer.source_labels(), vec!["x.pdf (page 1)", "y.pdf (page 2)"]);
    }
}
