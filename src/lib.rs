// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

//! Retrieval-augmented question answering over PDF documents.
//!
//! Uploaded PDFs are split into chunks, embedded and stored in a local
//! LanceDB table or a hosted Pinecone index. Questions are condensed against
//! the chat history, answered from the top-k retrieved chunks and recorded
//! in the [`Session`].

pub mod config;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod splitter;
pub mod utils;
pub mod vector_store;

pub use config::{
    Backend, Config, CredentialOverrides, EmbeddingProvider, EmbeddingsConfig, OpenAiConfig,
    PineconeConfig, PipelineConfig, StorageConfig, VectorStoreConfig,
};
pub use embeddings::{Embedder, HashingEmbedder, OpenAiEmbeddings};
pub use error::{RagError, Result};
pub use llm::{ChatMessage, ChatModel, ConversationalRetrievalChain, OpenAiChat, PromptBuilder};
pub use loader::{PdfLoader, StagedFile, StagingArea, TextCleaner};
pub use models::{Answer, ChatTurn, Chunk, RetrievedChunk, SourceDocument};
pub use pipeline::{IngestPipeline, IngestReport, PipelineStats, ProgressTracker};
pub use session::Session;
pub use splitter::CharacterTextSplitter;
pub use utils::{
    HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator, run_health_checks,
};
pub use vector_store::{LocalVectorStore, PineconeStore, Retriever, SchemaManager, VectorStore};
