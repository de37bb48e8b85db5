// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Please upload the documents.")]
    NoDocuments,

    #[error("Retriever is not initialized. Please submit documents first.")]
    RetrieverNotInitialized,

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PDF extraction failed for {file}: {message}")]
    PdfExtraction { file: String, message: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RagError {
    pub fn file_operation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            source,
        }
    }

    pub fn pdf_extraction(file: impl Into<String>, message: impl ToString) -> Self {
        Self::PdfExtraction {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Errors the user can fix from the prompt, as opposed to backend failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoDocuments | Self::RetrieverNotInitialized | Self::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(RagError::NoDocuments.to_string(), "Please upload the documents.");
        assert_eq!(
            RagError::RetrieverNotInitialized.to_string(),
            "Retriever is not initialized. Please submit documents first."
        );
    }

    #[test]
    fn test_user_error_classification() {
        assert!(RagError::NoDocuments.is_user_error());
        assert!(RagError::Validation("bad".to_string()).is_user_error());
        assert!(!RagError::Llm("down".to_string()).is_user_error());
    }
}
