// file: src/session.rs
// description: one interactive session: backend toggle, retriever and chat history

use crate::config::{Backend, Config};
use crate::embeddings::{self, Embedder};
use crate::error::{RagError, Result};
use crate::llm::{ChatModel, ConversationalRetrievalChain, OpenAiChat};
use crate::loader::{PdfLoader, StagingArea};
use crate::models::{Answer, ChatTurn};
use crate::pipeline::{IngestPipeline, IngestReport, ProgressTracker};
use crate::splitter::CharacterTextSplitter;
use crate::vector_store::{self, Retriever};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Session {
    config: Config,
    backend: Backend,
    embedder: Arc<dyn Embedder>,
    llm: Option<Arc<dyn ChatModel>>,
    retriever: Option<Retriever>,
    messages: Vec<ChatTurn>,
    staging: StagingArea,
    loader: PdfLoader,
    splitter: CharacterTextSplitter,
    show_progress: bool,
}

impl Session {
    /// Build a session from configuration. The chat model is only created
    /// when an OpenAI key is available; indexing does not need it.
    pub fn new(config: Config) -> Result<Self> {
        let embedder = embeddings::from_config(&config)?;
        let llm: Option<Arc<dyn ChatModel>> = match config.require_openai_key() {
            Ok(key) => Some(Arc::new(OpenAiChat::new(key.to_string(), &config.openai)?)),
            Err(_) => None,
        };

        Self::with_services(config, embedder, llm)
    }

    pub fn with_services(
        config: Config,
        embedder: Arc<dyn Embedder>,
        llm: Option<Arc<dyn ChatModel>>,
    ) -> Result<Self> {
        config.validate()?;

        let staging = StagingArea::new(&config.storage.tmp_dir, config.pipeline.max_file_size_mb)?;
        let splitter = CharacterTextSplitter::from_config(&config.pipeline)?;

        Ok(Self {
            backend: config.vector_store.backend,
            config,
            embedder,
            llm,
            retriever: None,
            messages: Vec::new(),
            staging,
            loader: PdfLoader::new(),
            splitter,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Switching backends drops the retriever; it belongs to the old store.
    pub fn set_backend(&mut self, backend: Backend) {
        if backend != self.backend {
            info!("Switching vector store backend to {}", backend);
            self.backend = backend;
            self.retriever = None;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.messages
    }

    async fn build_retriever(&self) -> Result<Retriever> {
        let store = vector_store::open(&self.config, self.backend).await?;
        Ok(Retriever::new(
            store,
            Arc::clone(&self.embedder),
            self.config.top_k(self.backend),
        ))
    }

    /// Index uploaded files and point the session at the resulting store.
    /// On failure the previous retriever stays in place.
    pub async fn process_documents(&mut self, files: &[PathBuf]) -> Result<IngestReport> {
        if files.is_empty() {
            warn!("No documents submitted");
            return Err(RagError::NoDocuments);
        }

        let retriever = self.build_retriever().await?;
        let tracker = if self.show_progress {
            ProgressTracker::new(files.len())
        } else {
            ProgressTracker::hidden(files.len())
        };

        let pipeline = IngestPipeline::new(
            &self.staging,
            &self.loader,
            &self.splitter,
            self.config.storage.keep_staged_files,
        );
        let report = pipeline
            .run(files, &retriever, self.backend, &tracker)
            .await?;

        self.retriever = Some(retriever);
        Ok(report)
    }

    /// Use a store populated by an earlier run. Returns the number of stored
    /// chunks; an empty store leaves the session without a retriever.
    pub async fn attach_existing_index(&mut self) -> Result<usize> {
        let retriever = self.build_retriever().await?;
        let count = retriever.store().count().await?;

        if count == 0 {
            warn!("The {} store has no indexed chunks", self.backend);
            return Ok(0);
        }

        info!("Attached to {} store with {} chunks", self.backend, count);
        self.retriever = Some(retriever);
        Ok(count)
    }

    /// Answer a question using the chat history so far. The turn is recorded
    /// only when an answer comes back.
    pub async fn query(&mut self, question: &str) -> Result<Answer> {
        let retriever = self
            .retriever
            .clone()
            .ok_or(RagError::RetrieverNotInitialized)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::Validation("Question is empty".to_string()));
        }

        let llm = self.llm.clone().ok_or_else(|| {
            RagError::Config("OpenAI API key is not set; cannot answer questions".to_string())
        })?;

        let chain = ConversationalRetrievalChain::new(llm, retriever);
        let answer = chain.ask(question, &self.messages).await?;

        self.messages.push(ChatTurn::new(question, answer.text.clone()));
        Ok(answer)
    }
}
