// file: src/pipeline/mod.rs
// description: ingestion pipeline and progress reporting
// reference: pipeline orchestration

mod ingest;
mod progress;

pub use ingest::{IngestPipeline, IngestReport};
pub use progress::{PipelineStats, ProgressTracker};
