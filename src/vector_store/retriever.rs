// file: src/vector_store/retriever.rs
// description: top-k similarity retrieval over a vector store

use crate::embeddings::Embedder;
use crate::error::{RagError, Result};
use crate::models::{Chunk, RetrievedChunk};
use crate::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, k: usize) -> Self {
        Self {
            store,
            embedder,
            k: k.max(1),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Embed chunk contents and write them to the store.
    pub async fn index(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        let stored = self.store.add_chunks(chunks, &embeddings).await?;
        info!("Indexed {} chunks into {}", stored, self.store.name());
        Ok(stored)
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let embedding = self.embedder.embed_query(query).await?;
        let results = self.store.similarity_search(&embedding, self.k).await?;
        debug!(
            "Retrieved {} chunks (k = {}) from {}",
            results.len(),
            self.k,
            self.store.name()
        );
        Ok(results)
    }
}
