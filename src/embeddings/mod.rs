// file: src/embeddings/mod.rs
// description: embedding providers behind a common trait
// reference: internal module structure

pub mod hashing;
pub mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbeddings;

use crate::config::{Config, EmbeddingProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

/// Build the embedder selected in the configuration.
pub fn from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embeddings.provider {
        EmbeddingProvider::OpenAi => {
            let api_key = config.require_openai_key()?;
            Ok(Arc::new(OpenAiEmbeddings::new(
                api_key.to_string(),
                &config.openai,
                &config.embeddings,
            )?))
        }
        EmbeddingProvider::Hashing => {
            Ok(Arc::new(HashingEmbedder::new(config.embeddings.dimension)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_requires_key() {
        let config = Config::default_config();
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_hashing_provider_needs_no_key() {
        let mut config = Config::default_config();
        config.embeddings.provider = EmbeddingProvider::Hashing;
        config.embeddings.dimension = 64;

        let embedder = from_config(&config).unwrap();
        assert_eq!(embedder.dimension(), 64);
        assert_eq!(embedder.name(), "hashing");
    }
}
