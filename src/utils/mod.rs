// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod health;
pub mod logging;
pub mod validation;

pub use health::{HealthCheck, HealthReport, HealthStatus, OperationTimer, run_health_checks};
pub use validation::Validator;
