// file: src/embeddings/openai.rs
// description: OpenAI compatible embeddings API client
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::{EmbeddingsConfig, OpenAiConfig};
use crate::embeddings::Embedder;
use crate::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

pub struct OpenAiEmbeddings {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OpenAiEmbeddings {
    pub fn new(api_key: String, openai: &OpenAiConfig, config: &EmbeddingsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(openai.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: openai.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        })
    }

    /// One request per `batch_size` texts, in input order.
    fn batch_requests<'a>(&'a self, texts: &'a [String]) -> Vec<EmbeddingRequest<'a>> {
        texts
            .chunks(self.batch_size)
            .map(|input| EmbeddingRequest {
                input,
                model: &self.model,
            })
            .collect()
    }

    async fn send(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        debug!("Requesting {} embeddings from {}", request.input.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to send embeddings request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::Embedding(format!(
                "Embeddings request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            RagError::Embedding(format!("Failed to parse embeddings response: {}", e))
        })?;

        Self::into_ordered(body, request.input.len())
    }

    fn into_ordered(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        if response.data.len() != expected {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, received {}",
                expected,
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for request in self.batch_requests(texts) {
            embeddings.extend(self.send(&request).await?);
        }

        if let Some(first) = embeddings.first()
            && first.len() != self.dimension
        {
            return Err(RagError::Embedding(format!(
                "Model {} returned dimension {}, configured dimension is {}",
                self.model,
                first.len(),
                self.dimension
            )));
        }

        info!("Embedded {} texts with {}", embeddings.len(), self.model);
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let request = EmbeddingRequest {
            input: &input,
            model: &self.model,
        };
        self.send(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("No embedding data returned".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}
