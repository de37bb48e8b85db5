// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RagError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
    pub vector_store: VectorStoreConfig,
    pub embeddings: EmbeddingsConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub tmp_dir: PathBuf,
    pub vector_store_dir: PathBuf,
    pub table_name: String,
    #[serde(default)]
    pub keep_staged_files: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PineconeConfig {
    pub api_key: Option<String>,
    pub environment: Option<String>,
    pub index: Option<String>,
    /// Project id used to derive the index host when `host` is not set.
    pub project_id: Option<String>,
    pub host: Option<String>,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    Pinecone,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Pinecone => write!(f, "pinecone"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreConfig {
    pub backend: Backend,
    pub local_top_k: usize,
    pub remote_top_k: usize,
    pub upsert_batch_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    OpenAi,
    Hashing,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
    pub max_file_size_mb: usize,
}

impl Config {
    /// Built-in defaults, then the TOML file when it exists, then
    /// `RAG_ENGINE__SECTION__KEY` variables (including those from `.env`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| RagError::Config(e.to_string()))?;
        let path = path.unwrap_or(Path::new("config/default.toml"));

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("RAG_ENGINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| RagError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                tmp_dir: PathBuf::from("Temp_Files"),
                vector_store_dir: PathBuf::from("data/vector_store"),
                table_name: "documents".to_string(),
                keep_staged_files: false,
            },
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                chat_model: "gpt-3.5-turbo".to_string(),
                temperature: 0.7,
                timeout_secs: 120,
            },
            pinecone: PineconeConfig::default(),
            vector_store: VectorStoreConfig {
                backend: Backend::Local,
                local_top_k: 7,
                remote_top_k: 4,
                upsert_batch_size: 100,
            },
            embeddings: EmbeddingsConfig {
                provider: EmbeddingProvider::OpenAi,
                model: "text-embedding-ada-002".to_string(),
                dimension: 1536,
                batch_size: 1000,
            },
            pipeline: PipelineConfig {
                chunk_size: 1000,
                chunk_overlap: 0,
                separator: "\n\n".to_string(),
                max_file_size_mb: 50,
            },
        }
    }

    /// Credentials typed on the command line win over file and environment values.
    pub fn apply_overrides(&mut self, overrides: CredentialOverrides) {
        if let Some(key) = overrides.openai_api_key {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = overrides.pinecone_api_key {
            self.pinecone.api_key = Some(key);
        }
        if let Some(env) = overrides.pinecone_env {
            self.pinecone.environment = Some(env);
        }
        if let Some(index) = overrides.pinecone_index {
            self.pinecone.index = Some(index);
        }
    }

    pub fn top_k(&self, backend: Backend) -> usize {
        match backend {
            Backend::Local => self.vector_store.local_top_k,
            Backend::Pinecone => self.vector_store.remote_top_k,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.chunk_overlap > self.pipeline.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                self.pipeline.chunk_overlap, self.pipeline.chunk_size
            )));
        }

        if self.vector_store.local_top_k == 0 || self.vector_store.remote_top_k == 0 {
            return Err(RagError::Config(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.embeddings.batch_size == 0 || self.vector_store.upsert_batch_size == 0 {
            return Err(RagError::Config(
                "batch sizes must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.openai.base_url)
            .map_err(|e| RagError::Config(e.to_string()))?;

        if self.embeddings.dimension == 0 {
            return Err(RagError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Pinecone settings required to reach the hosted index.
    pub fn require_pinecone(&self) -> Result<(&str, String)> {
        let api_key = self
            .pinecone
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RagError::Config("Pinecone API key is not set".to_string()))?;

        if let Some(host) = self.pinecone.host.as_deref().filter(|h| !h.is_empty()) {
            let host = if host.starts_with("http://") || host.starts_with("https://") {
                host.to_string()
            } else {
                format!("https://{}", host)
            };
            return Ok((api_key, host));
        }

        let index = self
            .pinecone
            .index
            .as_deref()
            .filter(|i| !i.is_empty())
            .ok_or_else(|| RagError::Config("Pinecone index name is not set".to_string()))?;
        let environment = self
            .pinecone
            .environment
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| RagError::Config("Pinecone environment is not set".to_string()))?;
        let project = self
            .pinecone
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                RagError::Config(
                    "Pinecone project_id (or an explicit host) is not set".to_string(),
                )
            })?;

        Ok((
            api_key,
            format!("https://{}-{}.svc.{}.pinecone.io", index, project, environment),
        ))
    }

    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RagError::Config("OpenAI API key is not set".to_string()))
    }
}

/// Values entered interactively or passed as flags.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub openai_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
    pub pinecone_env: Option<String>,
    pub pinecone_index: Option<String>,
}
