// file: src/pipeline/progress.rs
// description: progress bars and counters for one ingest run
// reference: https://docs.rs/indicatif

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub pages_loaded: usize,
    pub chunks_created: usize,
    pub total_bytes_processed: u64,
    pub duration_ms: u64,
}

/// A files bar plus a one-line page/chunk summary underneath it.
pub struct ProgressTracker {
    files_bar: ProgressBar,
    summary_bar: ProgressBar,
    files_processed: AtomicUsize,
    files_failed: AtomicUsize,
    pages_loaded: AtomicUsize,
    chunks_created: AtomicUsize,
    bytes_processed: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_files: usize) -> Self {
        let multi = MultiProgress::new();
        let files_bar = multi.add(ProgressBar::new(total_files as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} pdfs {msg}")
        {
            files_bar.set_style(style.progress_chars("█▓░"));
        }

        let summary_bar = multi.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::default_bar().template("  {msg}") {
            summary_bar.set_style(style);
        }

        Self::from_bars(files_bar, summary_bar)
    }

    /// Counts without drawing anything.
    pub fn hidden(total_files: usize) -> Self {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let files_bar = multi.add(ProgressBar::new(total_files as u64));
        let summary_bar = multi.add(ProgressBar::new(0));

        Self::from_bars(files_bar, summary_bar)
    }

    fn from_bars(files_bar: ProgressBar, summary_bar: ProgressBar) -> Self {
        Self {
            files_bar,
            summary_bar,
            files_processed: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            pages_loaded: AtomicUsize::new(0),
            chunks_created: AtomicUsize::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_files_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.files_bar.inc(1);
        self.refresh_summary();
    }

    pub fn inc_files_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
        self.files_bar.inc(1);
        self.refresh_summary();
    }

    pub fn add_pages(&self, pages: usize) {
        self.pages_loaded.fetch_add(pages, Ordering::Relaxed);
    }

    pub fn add_chunks(&self, chunks: usize) {
        self.chunks_created.fetch_add(chunks, Ordering::Relaxed);
        self.refresh_summary();
    }

    pub fn add_bytes_processed(&self, bytes: u64) {
        self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_message(&self, message: String) {
        self.files_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.files_bar.finish_with_message("indexed");
        self.summary_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            pages_loaded: self.pages_loaded.load(Ordering::Relaxed),
            chunks_created: self.chunks_created.load(Ordering::Relaxed),
            total_bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            duration_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }

    fn refresh_summary(&self) {
        self.summary_bar.set_message(format!(
            "pages: {} | chunks: {} | failed: {}",
            self.pages_loaded.load(Ordering::Relaxed),
            self.chunks_created.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed)
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if !self.files_bar.is_finished() {
            self.files_bar.abandon();
        }
        self.summary_bar.finish_and_clear();
    }
}
