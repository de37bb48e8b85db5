// file: src/embeddings/hashing.rs
// description: deterministic offline embeddings from hashed word features
// reference: https://docs.rs/sha2

use crate::embeddings::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Bag-of-words feature hashing. Texts sharing words land close together,
/// which is enough for local runs without an embeddings API.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let digest = Sha256::digest(token.as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % self.dimension;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_embedding_deterministic() {
        let embedder = HashingEmbedder::new(128);
        assert_eq!(embedder.embed("same text"), embedder.embed("same text"));
        assert_eq!(embedder.embed("same text").len(), 128);
    }

    #[test]
    fn test_embedding_normalized() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed("vector stores index embeddings");
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-5);
        assert!(embedder.embed("").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed("pinecone hosted index");
        let related = embedder.embed("the hosted pinecone index stores vectors");
        let unrelated = embedder.embed("bananas are yellow fruit");

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_embed_documents_preserves_order() {
        let embedder = HashingEmbedder::new(32);
        let texts = vec!["first".to_string(), "second".to_string()];
        let vectors = embedder.embed_documents(&texts).await.unwrap();

        assert_eq!(vectors[0], embedder.embed("first"));
        assert_eq!(vectors[1], embedder.embed("second"));
    }

    #[test]
    fn test_query_matches_document_embedding() {
        let embedder = HashingEmbedder::new(16);
        let query = tokio_test::block_on(embedder.embed_query("page text")).unwrap();
        assert_eq!(query, embedder.embed("page text"));
    }
}
