// file: src/utils/health.rs
// description: health checks for configuration, staging and vector stores
// reference: Production observability best practices

use crate::config::{Backend, Config, EmbeddingProvider};
use crate::error::Result;
use crate::vector_store::{self, LocalVectorStore, SchemaManager};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

/// Outcome of checking one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    pub fn new(component: &str, status: HealthStatus, message: Option<String>, took: Duration) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
            response_time_ms: took.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: i64,
    pub version: String,
}

impl HealthReport {
    /// The overall status is the worst status among `checks`.
    pub fn new(checks: Vec<HealthCheck>, version: String) -> Self {
        let worst = |status: HealthStatus| checks.iter().any(|c| c.status == status);
        let overall_status = if worst(HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if worst(HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().timestamp(),
            version,
        }
    }

    pub fn format(&self) -> String {
        let checked_at = chrono::DateTime::from_timestamp(self.timestamp, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut lines = vec![
            format!(
                "{} rag-engine {}: {:?} at {}",
                self.overall_status.icon(),
                self.version,
                self.overall_status,
                checked_at
            ),
            String::new(),
        ];

        for check in &self.checks {
            lines.push(format!(
                "{} {} ({:?}) - {}ms",
                check.status.icon(),
                check.component,
                check.status,
                check.response_time_ms
            ));
            if let Some(msg) = &check.message {
                lines.push(format!("  {}", msg));
            }
        }

        lines.join("\n")
    }
}

/// Check everything a session needs for `backend` without calling the LLM.
pub async fn run_health_checks(config: &Config, backend: Backend) -> HealthReport {
    let mut checks = Vec::new();

    let start = Instant::now();
    checks.push(match config.validate() {
        Ok(()) => HealthCheck::new("configuration", HealthStatus::Healthy, None, start.elapsed()),
        Err(e) => HealthCheck::new(
            "configuration",
            HealthStatus::Unhealthy,
            Some(e.to_string()),
            start.elapsed(),
        ),
    });

    let start = Instant::now();
    let (status, message) = match config.require_openai_key() {
        Ok(_) => (HealthStatus::Healthy, None),
        Err(e) if config.embeddings.provider == EmbeddingProvider::Hashing => (
            HealthStatus::Degraded,
            Some(format!("{} (indexing works offline, questions will fail)", e)),
        ),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };
    checks.push(HealthCheck::new("openai credentials", status, message, start.elapsed()));

    let start = Instant::now();
    let (status, message) = match std::fs::create_dir_all(&config.storage.tmp_dir) {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => (
            HealthStatus::Unhealthy,
            Some(format!("{}: {}", config.storage.tmp_dir.display(), e)),
        ),
    };
    checks.push(HealthCheck::new("staging directory", status, message, start.elapsed()));

    checks.push(check_vector_store(config, backend).await);

    HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string())
}

/// Unreachable store or a local table built for another embedding size is
/// unhealthy; an empty store is degraded.
async fn check_vector_store(config: &Config, backend: Backend) -> HealthCheck {
    let component = format!("{} vector store", backend);
    let start = Instant::now();
    let check = |status: HealthStatus, message: String| {
        HealthCheck::new(&component, status, Some(message), start.elapsed())
    };

    let store = match vector_store::open(config, backend).await {
        Ok(store) => store,
        Err(e) => return check(HealthStatus::Unhealthy, e.to_string()),
    };
    if let Err(e) = store.ping().await {
        return check(HealthStatus::Unhealthy, e.to_string());
    }

    let count = match store.count().await {
        Ok(0) => {
            return check(
                HealthStatus::Degraded,
                "reachable but empty; ingest documents first".to_string(),
            );
        }
        Ok(count) => count,
        Err(e) => return check(HealthStatus::Degraded, e.to_string()),
    };

    if backend == Backend::Local {
        match local_schema_matches(config).await {
            Ok(true) => {}
            Ok(false) => {
                return check(
                    HealthStatus::Unhealthy,
                    format!(
                        "table '{}' was not built for {}-dimensional embeddings; run `reset` and ingest again",
                        config.storage.table_name, config.embeddings.dimension
                    ),
                );
            }
            Err(e) => return check(HealthStatus::Unhealthy, e.to_string()),
        }
    }

    check(HealthStatus::Healthy, format!("{} chunks indexed", count))
}

async fn local_schema_matches(config: &Config) -> Result<bool> {
    let store = LocalVectorStore::new(&config.storage, config.embeddings.dimension).await?;
    SchemaManager::new(&store).verify_schema().await
}

/// Logs the start and end of a long-running operation.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn warn_if_slow(&self, threshold: Duration) {
        let elapsed = self.start.elapsed();
        if elapsed > threshold {
            warn!(
                "Slow operation [{}] took {:.2}s (threshold: {:.2}s)",
                self.operation,
                elapsed.as_secs_f64(),
                threshold.as_secs_f64()
            );
        }
    }

    pub fn finish(self) {
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            self.start.elapsed().as_secs_f64()
        );
    }
}
