// file: src/vector_store/mod.rs
// description: vector store backends and the retriever built on them
// reference: internal module structure

pub mod local;
pub mod pinecone;
pub mod retriever;
pub mod schema;

pub use local::LocalVectorStore;
pub use pinecone::PineconeStore;
pub use retriever::Retriever;
pub use schema::SchemaManager;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::models::{Chunk, RetrievedChunk};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store chunks with their embeddings. `embeddings[i]` belongs to `chunks[i]`.
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize>;

    /// At most `k` results, most similar first.
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedChunk>>;

    async fn count(&self) -> Result<usize>;

    async fn clear(&self) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Open the store for `backend`. The local store needs the embedding
/// dimension to build its table schema.
pub async fn open(config: &Config, backend: Backend) -> Result<Arc<dyn VectorStore>> {
    match backend {
        Backend::Local => Ok(Arc::new(
            LocalVectorStore::new(&config.storage, config.embeddings.dimension).await?,
        )),
        Backend::Pinecone => Ok(Arc::new(PineconeStore::new(config)?)),
    }
}
