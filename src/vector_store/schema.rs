// file: src/vector_store/schema.rs
// description: LanceDB schema management for vector storage
// reference: https://docs.rs/lancedb

use crate::error::{RagError, Result};
use crate::vector_store::local::LocalVectorStore;
use arrow_schema::{DataType, Field, FieldRef, Schema};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SchemaManager<'a> {
    store: &'a LocalVectorStore,
}

impl<'a> SchemaManager<'a> {
    pub fn new(store: &'a LocalVectorStore) -> Self {
        Self { store }
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let table_name = self.store.table_name();

        if !self.store.table_exists().await? {
            warn!("Table '{}' does not exist", table_name);
            return Ok(false);
        }

        let table = self.store.get_table().await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| RagError::VectorStore(format!("Failed to read schema: {}", e)))?;

        let expected = Self::chunks_schema(self.store.dimension());
        let missing: Vec<&str> = expected
            .fields()
            .iter()
            .filter(|field| schema.field_with_name(field.name()).is_err())
            .map(|field| field.name().as_str())
            .collect();

        if !missing.is_empty() {
            warn!("Table '{}' is missing columns: {:?}", table_name, missing);
            return Ok(false);
        }

        let expected_embedding = DataType::FixedSizeList(
            Self::embedding_item_field(),
            self.store.dimension() as i32,
        );
        if let Ok(field) = schema.field_with_name("embedding")
            && field.data_type() != &expected_embedding
        {
            warn!(
                "Table '{}' embedding column is {:?}, expected dimension {}",
                table_name,
                field.data_type(),
                self.store.dimension()
            );
            return Ok(false);
        }

        info!("Table '{}' exists with expected schema", table_name);
        Ok(true)
    }

    pub fn embedding_item_field() -> FieldRef {
        Arc::new(Field::new("item", DataType::Float32, true))
    }

    /// Arrow schema of the chunks table.
    pub fn chunks_schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("page", DataType::UInt32, false),
            Field::new("content_hash", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(Self::embedding_item_field(), embedding_dim as i32),
                false,
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema = SchemaManager::chunks_schema(384);
        assert_eq!(schema.fields().len(), 6);

        let embedding_field = schema.field_with_name("embedding").unwrap();
        assert!(matches!(embedding_field.data_type(), DataType::FixedSizeList(_, 384)));
        assert_eq!(
            schema.field_with_name("page").unwrap().data_type(),
            &DataType::UInt32
        );
    }
}
