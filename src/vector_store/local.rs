// file: src/vector_store/local.rs
// description: on-disk LanceDB vector store for document chunks
// reference: https://docs.rs/lancedb

use crate::config::StorageConfig;
use crate::error::{RagError, Result};
use crate::models::{Chunk, RetrievedChunk};
use crate::vector_store::VectorStore;
use crate::vector_store::schema::SchemaManager;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt32Array,
};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LocalVectorStore {
    connection: Connection,
    table_name: String,
    dimension: usize,
}

impl LocalVectorStore {
    pub async fn new(config: &StorageConfig, dimension: usize) -> Result<Self> {
        std::fs::create_dir_all(&config.vector_store_dir)
            .map_err(|e| RagError::file_operation(&config.vector_store_dir, e))?;

        let uri = config.vector_store_dir.to_string_lossy().to_string();
        info!("Connecting to LanceDB at {}", uri);

        let connection = connect(&uri).execute().await.map_err(|e| {
            RagError::VectorStore(format!("Failed to connect to LanceDB: {}", e))
        })?;

        Ok(Self {
            connection,
            table_name: config.table_name.clone(),
            dimension,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn table_exists(&self) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::VectorStore(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == &self.table_name))
    }

    pub async fn get_table(&self) -> Result<Table> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| {
                RagError::VectorStore(format!("Failed to open table {}: {}", self.table_name, e))
            })
    }

    fn create_record_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(RagError::VectorStore(format!(
                "Embedding dimension {} does not match table dimension {}",
                bad.len(),
                self.dimension
            )));
        }

        let schema = SchemaManager::chunks_schema(self.dimension);

        let ids: StringArray = chunks.iter().map(|c| Some(c.id.as_str())).collect();
        let contents: StringArray = chunks.iter().map(|c| Some(c.content.as_str())).collect();
        let sources: StringArray = chunks.iter().map(|c| Some(c.source.as_str())).collect();
        let pages: UInt32Array = chunks.iter().map(|c| Some(c.page)).collect();
        let hashes: StringArray = chunks
            .iter()
            .map(|c| Some(c.content_hash.as_str()))
            .collect();

        let values: Float32Array = embeddings
            .iter()
            .flat_map(|e| e.iter().copied())
            .collect();

        let embedding_list = FixedSizeListArray::try_new(
            SchemaManager::embedding_item_field(),
            self.dimension as i32,
            Arc::new(values),
            None,
        )
        .map_err(|e| RagError::VectorStore(format!("Failed to create embedding array: {}", e)))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(contents),
                Arc::new(sources),
                Arc::new(pages),
                Arc::new(hashes),
                Arc::new(embedding_list),
            ],
        )
        .map_err(|e| RagError::VectorStore(format!("Failed to create record batch: {}", e)))
    }

    fn rows_from_batch(batch: &RecordBatch) -> Result<Vec<RetrievedChunk>> {
        let ids = string_column(batch, "id")?;
        let contents = string_column(batch, "content")?;
        let sources = string_column(batch, "source")?;
        let hashes = string_column(batch, "content_hash")?;
        let pages = batch
            .column_by_name("page")
            .ok_or_else(|| RagError::VectorStore("Missing 'page' column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| RagError::VectorStore("Invalid 'page' column type".to_string()))?;

        // LanceDB returns distance score in a special column
        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let chunk = Chunk {
                id: ids.value(i).to_string(),
                content: contents.value(i).to_string(),
                source: sources.value(i).to_string(),
                page: pages.value(i),
                content_hash: hashes.value(i).to_string(),
            };

            let result = match distances {
                Some(dist) if !dist.is_null(i) => RetrievedChunk::from_distance(chunk, dist.value(i)),
                _ => RetrievedChunk::new(chunk, 1.0, None),
            };
            rows.push(result);
        }

        Ok(rows)
    }
}

fn string_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RagError::VectorStore(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RagError::VectorStore(format!("Invalid '{}' column type", name)))
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::VectorStore(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(0);
        }

        let schema = SchemaManager::chunks_schema(self.dimension);
        let record_batch = self.create_record_batch(chunks, embeddings)?;

        if !self.table_exists().await? {
            self.connection
                .create_table(
                    &self.table_name,
                    RecordBatchIterator::new(vec![Ok(record_batch)], schema),
                )
                .execute()
                .await
                .map_err(|e| RagError::VectorStore(format!("Failed to create table: {}", e)))?;
            info!("Created new table: {}", self.table_name);
        } else {
            let table = self.get_table().await?;
            table
                .add(RecordBatchIterator::new(vec![Ok(record_batch)], schema))
                .execute()
                .await
                .map_err(|e| RagError::VectorStore(format!("Failed to insert chunks: {}", e)))?;
        }

        debug!("Inserted {} chunks into {}", chunks.len(), self.table_name);
        Ok(chunks.len())
    }

    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        if !self.table_exists().await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.get_table().await?;

        debug!("Performing vector search with limit {}", k);

        let mut results_stream = table
            .vector_search(embedding.to_vec())
            .map_err(|e| RagError::VectorStore(format!("Failed to create vector search: {}", e)))?
            .limit(k)
            .execute()
            .await
            .map_err(|e| RagError::VectorStore(format!("Vector search failed: {}", e)))?;

        let mut results = Vec::new();
        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result
                .map_err(|e| RagError::VectorStore(format!("Failed to read result batch: {}", e)))?;
            results.extend(Self::rows_from_batch(&batch)?);
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        debug!("Vector search returned {} results", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        self.get_table()
            .await?
            .count_rows(None)
            .await
            .map_err(|e| RagError::VectorStore(format!("Failed to count rows: {}", e)))
    }

    async fn clear(&self) -> Result<()> {
        if self.table_exists().await? {
            warn!("Dropping table {}", self.table_name);
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| {
                    RagError::VectorStore(format!(
                        "Failed to drop table {}: {}",
                        self.table_name, e
                    ))
                })?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.connection
            .table_names()
            .execute()
            .await
            .map(|_| ())
            .map_err(|e| RagError::VectorStore(format!("LanceDB connection failed: {}", e)))
    }

    fn name(&self) -> &str {
        "lancedb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embeddings::HashingEmbedder;
    use tempfile::TempDir;

    async fn open_store(temp: &TempDir, dimension: usize) -> LocalVectorStore {
        let mut config = Config::default_config();
        config.storage.vector_store_dir = temp.path().join("vector_store");
        LocalVectorStore::new(&config.storage, dimension).await.unwrap()
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("rust ownership and borrowing".to_string(), "rust.pdf".to_string(), 1),
            Chunk::new("pinecone hosted vector index".to_string(), "db.pdf".to_string(), 2),
            Chunk::new("bananas are a yellow fruit".to_string(), "food.pdf".to_string(), 3),
        ]
    }

    #[tokio::test]
    async fn test_empty_store() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp, 8).await;

        assert!(store.ping().await.is_ok());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.similarity_search(&[0.0; 8], 3).await.unwrap().is_empty());
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let temp = TempDir::new().unwrap();
        let embedder = HashingEmbedder::new(256);
        let store = open_store(&temp, 256).await;

        let chunks = sample_chunks();
        let embeddings: Vec<Vec<f32>> = chunks.iter().map(|c| embedder.embed(&c.content)).collect();
        assert_eq!(store.add_chunks(&chunks, &embeddings).await.unwrap(), 3);
        assert_eq!(store.count().await.unwrap(), 3);

        let query = embedder.embed("hosted vector index");
        let results = store.similarity_search(&query, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.source, "db.pdf");
        assert_eq!(results[0].chunk.page, 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[0].distance.is_some());
    }

    #[tokio::test]
    async fn test_append_and_clear() {
        let temp = TempDir::new().unwrap();
        let embedder = HashingEmbedder::new(16);
        let store = open_store(&temp, 16).await;

        for chunk in sample_chunks() {
            let embedding = embedder.embed(&chunk.content);
            store.add_chunks(&[chunk], &[embedding]).await.unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 3);

        let manager = SchemaManager::new(&store);
        assert!(manager.verify_schema().await.unwrap());

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!manager.verify_schema().await.unwrap());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp, 8).await;
        let chunk = Chunk::new("text".to_string(), "a.pdf".to_string(), 1);

        let result = store.add_chunks(&[chunk], &[vec![0.5; 4]]).await;
        assert!(matches!(result, Err(RagError::VectorStore(_))));
    }

    #[tokio::test]
    async fn test_persists_across_connections() {
        let temp = TempDir::new().unwrap();
        let embedder = HashingEmbedder::new(16);
        {
            let store = open_store(&temp, 16).await;
            let chunks = sample_chunks();
            let embeddings: Vec<Vec<f32>> =
                chunks.iter().map(|c| embedder.embed(&c.content)).collect();
            store.add_chunks(&chunks, &embeddings).await.unwrap();
        }

        let reopened = open_store(&temp, 16).await;
        assert_eq!(reopened.count().await.unwrap(), 3);
    }
}
