// file: src/pipeline/ingest.rs
// description: sequential upload -> split -> embed -> store pipeline
// reference: pipeline orchestration

use crate::config::Backend;
use crate::error::{RagError, Result};
use crate::loader::{PdfLoader, StagedFile, StagingArea};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::splitter::CharacterTextSplitter;
use crate::vector_store::Retriever;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub backend: Backend,
    pub files: Vec<String>,
    pub pages: usize,
    pub chunks: usize,
    pub stored: usize,
    pub bytes: u64,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl IngestReport {
    fn from_stats(
        backend: Backend,
        files: Vec<String>,
        stored: usize,
        stats: &PipelineStats,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            backend,
            files,
            pages: stats.pages_loaded,
            chunks: stats.chunks_created,
            stored,
            bytes: stats.total_bytes_processed,
            duration_ms: stats.duration_ms,
            started_at,
        }
    }
}

pub struct IngestPipeline<'a> {
    staging: &'a StagingArea,
    loader: &'a PdfLoader,
    splitter: &'a CharacterTextSplitter,
    keep_staged_files: bool,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(
        staging: &'a StagingArea,
        loader: &'a PdfLoader,
        splitter: &'a CharacterTextSplitter,
        keep_staged_files: bool,
    ) -> Self {
        Self {
            staging,
            loader,
            splitter,
            keep_staged_files,
        }
    }

    /// Index every file into the retriever's store. The first failure aborts
    /// the run; nothing is retried.
    pub async fn run(
        &self,
        files: &[PathBuf],
        retriever: &Retriever,
        backend: Backend,
        tracker: &ProgressTracker,
    ) -> Result<IngestReport> {
        if files.is_empty() {
            return Err(RagError::NoDocuments);
        }

        let started_at = Utc::now();
        info!("Indexing {} files into the {} store", files.len(), backend);

        let mut staged = Vec::with_capacity(files.len());
        let result = self.stage_and_index(files, retriever, tracker, &mut staged).await;

        if !self.keep_staged_files {
            for file in &staged {
                self.staging.remove(file);
            }
        }

        let stored = result.inspect_err(|e| error!("Indexing failed: {}", e))?;
        tracker.finish();

        let names = staged.into_iter().map(|s| s.original_name).collect();
        Ok(IngestReport::from_stats(
            backend,
            names,
            stored,
            &tracker.get_stats(),
            started_at,
        ))
    }

    async fn stage_and_index(
        &self,
        files: &[PathBuf],
        retriever: &Retriever,
        tracker: &ProgressTracker,
        staged: &mut Vec<StagedFile>,
    ) -> Result<usize> {
        let mut documents = Vec::new();

        for path in files {
            tracker.set_message(path.display().to_string());

            let loaded = self.staging.stage(path).and_then(|file| {
                let pages = self.loader.load(&file);
                staged.push(file);
                pages
            });

            match loaded {
                Ok(pages) => {
                    tracker.add_pages(pages.len());
                    if let Some(file) = staged.last() {
                        tracker.add_bytes_processed(file.size);
                    }
                    tracker.inc_files_processed();
                    documents.extend(pages);
                }
                Err(e) => {
                    tracker.inc_files_failed();
                    return Err(e);
                }
            }
        }

        let chunks = self.splitter.split_documents(&documents);
        tracker.add_chunks(chunks.len());

        if chunks.is_empty() {
            return Err(RagError::Validation(
                "No text could be extracted from the uploaded documents".to_string(),
            ));
        }

        tracker.set_message(format!("embedding {} chunks", chunks.len()));
        retriever.index(&chunks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::loader::pdf::tests::build_pdf;
    use crate::vector_store::retriever::tests::FakeStore;
    use crate::vector_store::VectorStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        staging: StagingArea,
        loader: PdfLoader,
        splitter: CharacterTextSplitter,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let staging = StagingArea::new(temp.path().join("Temp_Files"), 10).unwrap();
        Fixture {
            temp,
            staging,
            loader: PdfLoader::new(),
            splitter: CharacterTextSplitter::new("\n\n", 1000, 0).unwrap(),
        }
    }

    fn write_pdf(temp: &TempDir, name: &str, pages: &[&str]) -> PathBuf {
        let path = temp.path().join(name);
        std::fs::write(&path, build_pdf(pages)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_indexes_all_pages() {
        let f = fixture();
        let store = Arc::new(FakeStore::default());
        let retriever = Retriever::new(store.clone(), Arc::new(HashingEmbedder::new(32)), 7);
        let files = vec![
            write_pdf(&f.temp, "one.pdf", &["Page one", "Page two"]),
            write_pdf(&f.temp, "two.pdf", &["Another page"]),
        ];

        let pipeline = IngestPipeline::new(&f.staging, &f.loader, &f.splitter, false);
        let tracker = ProgressTracker::hidden(files.len());
        let report = pipeline
            .run(&files, &retriever, Backend::Local, &tracker)
            .await
            .unwrap();

        assert_eq!(report.files, vec!["one.pdf", "two.pdf"]);
        assert_eq!(report.pages, 3);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.stored, 3);
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(f.staging.clear().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_without_files() {
        let f = fixture();
        let retriever = Retriever::new(
            Arc::new(FakeStore::default()),
            Arc::new(HashingEmbedder::new(8)),
            7,
        );
        let pipeline = IngestPipeline::new(&f.staging, &f.loader, &f.splitter, false);

        let result = pipeline
            .run(&[], &retriever, Backend::Local, &ProgressTracker::hidden(0))
            .await;
        assert!(matches!(result, Err(RagError::NoDocuments)));
    }

    #[tokio::test]
    async fn test_first_bad_file_aborts_and_cleans_up() {
        let f = fixture();
        let store = Arc::new(FakeStore::default());
        let retriever = Retriever::new(store.clone(), Arc::new(HashingEmbedder::new(8)), 7);
        let good = write_pdf(&f.temp, "good.pdf", &["Fine"]);
        let bad = f.temp.path().join("bad.pdf");
        std::fs::write(&bad, b"%PDF-1.4 not really").unwrap();

        let pipeline = IngestPipeline::new(&f.staging, &f.loader, &f.splitter, false);
        let tracker = ProgressTracker::hidden(2);
        let result = pipeline
            .run(&[good, bad], &retriever, Backend::Local, &tracker)
            .await;

        assert!(matches!(result, Err(RagError::PdfExtraction { .. })));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(tracker.get_stats().files_failed, 1);
        assert_eq!(f.staging.clear().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_keep_staged_files() {
        let f = fixture();
        let retriever = Retriever::new(
            Arc::new(FakeStore::default()),
            Arc::new(HashingEmbedder::new(8)),
            7,
        );
        let files = vec![write_pdf(&f.temp, "kept.pdf", &["Kept"])];

        let pipeline = IngestPipeline::new(&f.staging, &f.loader, &f.splitter, true);
        pipeline
            .run(&files, &retriever, Backend::Local, &ProgressTracker::hidden(1))
            .await
            .unwrap();

        assert_eq!(f.staging.clear().unwrap(), 1);
    }
}
