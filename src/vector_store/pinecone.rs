// file: src/vector_store/pinecone.rs
// description: hosted Pinecone index accessed through its REST data plane
// reference: https://docs.pinecone.io/reference/api/data-plane

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::models::{Chunk, RetrievedChunk};
use crate::vector_store::VectorStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorMetadata {
    pub text: String,
    pub source: String,
    pub page: u32,
    pub content_hash: String,
}

#[derive(Debug, Serialize)]
struct Vector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorMetadata,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<Vector<'a>>,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: Option<usize>,
}

impl UpsertResponse {
    /// Responses without a count are taken to mean every vector was stored.
    fn stored(&self, sent: usize) -> usize {
        self.upserted_count.unwrap_or(sent)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<VectorMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    delete_all: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

pub struct PineconeStore {
    client: Client,
    host: String,
    api_key: String,
    namespace: String,
    upsert_batch_size: usize,
}

impl PineconeStore {
    pub fn new(config: &Config) -> Result<Self> {
        let (api_key, host) = config.require_pinecone()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai.timeout_secs))
            .build()?;

        info!("Using Pinecone index at {}", host);

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            namespace: config.pinecone.namespace.clone(),
            upsert_batch_size: config.vector_store.upsert_batch_size.max(1),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn post<B: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{}", self.host, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| RagError::VectorStore(format!("Pinecone request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::VectorStore(format!(
                "Pinecone {} failed with status {}: {}",
                path, status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            RagError::VectorStore(format!("Failed to parse Pinecone {} response: {}", path, e))
        })
    }

    async fn describe_index_stats(&self) -> Result<IndexStats> {
        self.post("/describe_index_stats", &serde_json::json!({})).await
    }

    /// One upsert request per `upsert_batch_size` vectors, in chunk order.
    fn upsert_batches<'a>(
        &'a self,
        chunks: &'a [Chunk],
        embeddings: &'a [Vec<f32>],
    ) -> Vec<UpsertRequest<'a>> {
        chunks
            .chunks(self.upsert_batch_size)
            .zip(embeddings.chunks(self.upsert_batch_size))
            .map(|(chunks, embeddings)| UpsertRequest {
                vectors: chunks
                    .iter()
                    .zip(embeddings)
                    .map(|(chunk, values)| Vector {
                        id: &chunk.id,
                        values: values.as_slice(),
                        metadata: VectorMetadata {
                            text: chunk.content.clone(),
                            source: chunk.source.clone(),
                            page: chunk.page,
                            content_hash: chunk.content_hash.clone(),
                        },
                    })
                    .collect(),
                namespace: &self.namespace,
            })
            .collect()
    }

    fn into_results(response: QueryResponse) -> Vec<RetrievedChunk> {
        response
            .matches
            .into_iter()
            .filter_map(|m| match m.metadata {
                Some(meta) => Some(RetrievedChunk::new(
                    Chunk {
                        id: m.id,
                        content: meta.text,
                        source: meta.source,
                        page: meta.page,
                        content_hash: meta.content_hash,
                    },
                    m.score,
                    None,
                )),
                None => {
                    warn!("Pinecone match {} has no metadata, skipping", m.id);
                    None
                }
            })
            .collect()
    }

    fn namespace_count(&self, stats: &IndexStats) -> usize {
        if self.namespace.is_empty() && stats.namespaces.is_empty() {
            return stats.total_vector_count;
        }
        stats
            .namespaces
            .get(&self.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::VectorStore(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut upserted = 0;
        for request in self.upsert_batches(chunks, embeddings) {
            let response: UpsertResponse = self.post("/vectors/upsert", &request).await?;
            upserted += response.stored(request.vectors.len());
        }

        info!("Upserted {} vectors into Pinecone", upserted);
        Ok(upserted)
    }

    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        let request = QueryRequest {
            vector: embedding,
            top_k: k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
        };

        let response: QueryResponse = self.post("/query", &request).await?;
        let mut results = Self::into_results(response);
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        debug!("Pinecone query returned {} results", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let stats = self.describe_index_stats().await?;
        Ok(self.namespace_count(&stats))
    }

    async fn clear(&self) -> Result<()> {
        warn!("Deleting all vectors from Pinecone index {}", self.host);
        let request = DeleteRequest {
            delete_all: true,
            namespace: &self.namespace,
        };
        let _: serde_json::Value = self.post("/vectors/delete", &request).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let stats = self.describe_index_stats().await?;
        if let Some(dimension) = stats.dimension {
            debug!("Pinecone index dimension {}", dimension);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn configured() -> Config {
        let mut config = Config::default_config();
        config.pinecone.api_key = Some("pc-key".to_string());
        config.pinecone.host = Some("https://docs-abc.svc.pinecone.io/".to_string());
        config
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = Config::default_config();
        assert!(matches!(PineconeStore::new(&config), Err(RagError::Config(_))));

        let store = PineconeStore::new(&configured()).unwrap();
        assert_eq!(store.host(), "https://docs-abc.svc.pinecone.io");
    }

    #[test]
    fn test_query_request_wire_format() {
        let vector = [0.1f32, 0.2];
        let request = QueryRequest {
            vector: &vector,
            top_k: 4,
            include_metadata: true,
            include_values: false,
            namespace: "",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "vector": [0.1f32, 0.2f32],
                "topK": 4,
                "includeMetadata": true,
                "includeValues": false
            })
        );
    }

    #[test]
    fn test_upsert_batches_keep_order_and_metadata() {
        let mut config = configured();
        config.pinecone.namespace = "docs".to_string();
        let store = PineconeStore::new(&config).unwrap();

        let chunks: Vec<Chunk> = (0..250)
            .map(|i| Chunk::new(format!("text {}", i), "manual.pdf".to_string(), i as u32 / 10))
            .collect();
        let embeddings: Vec<Vec<f32>> = (0..250).map(|i| vec![i as f32; 3]).collect();

        let batches = store.upsert_batches(&chunks, &embeddings);

        let sizes: Vec<usize> = batches.iter().map(|b| b.vectors.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let sent: Vec<&Vector> = batches.iter().flat_map(|b| b.vectors.iter()).collect();
        for (i, vector) in sent.iter().enumerate() {
            assert_eq!(vector.id, chunks[i].id);
            assert_eq!(vector.values, embeddings[i].as_slice());
            assert_eq!(vector.metadata.text, format!("text {}", i));
            assert_eq!(vector.metadata.page, i as u32 / 10);
            assert_eq!(vector.metadata.content_hash, chunks[i].content_hash);
        }

        let json = serde_json::to_value(&batches[2]).unwrap();
        assert_eq!(json["namespace"], "docs");
        assert_eq!(json["vectors"][49]["metadata"]["text"], "text 249");
        assert_eq!(json["vectors"][49]["metadata"]["source"], "manual.pdf");
    }

    #[test]
    fn test_upsert_count_falls_back_to_batch_size() {
        let counted: UpsertResponse = serde_json::from_str(r#"{"upsertedCount":7}"#).unwrap();
        assert_eq!(counted.stored(10), 7);

        let missing: UpsertResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.stored(10), 10);
    }

    #[test]
    fn test_query_response_parsing() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"matches":[
                {"id":"a","score":0.91,"metadata":{"text":"first","source":"x.pdf","page":1,"content_hash":"h1"}},
                {"id":"b","score":0.42}
            ],"namespace":""}"#,
        )
        .unwrap();

        let results = PineconeStore::into_results(response);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "first");
        assert_eq!(results[0].score, 0.91);
    }

    #[test]
    fn test_namespace_count() {
        let store = PineconeStore::new(&configured()).unwrap();
        let stats: IndexStats = serde_json::from_str(
            r#"{"namespaces":{"":{"vectorCount":12}},"dimension":1536,"totalVectorCount":12}"#,
        )
        .unwrap();
        assert_eq!(store.namespace_count(&stats), 12);

        let empty: IndexStats = serde_json::from_str(r#"{"totalVectorCount":0}"#).unwrap();
        assert_eq!(store.namespace_count(&empty), 0);
    }
}
