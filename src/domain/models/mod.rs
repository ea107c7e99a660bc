//! Domain models: pure data, no I/O.

pub mod action;
pub mod config;
pub mod endpoint;
pub mod policy;
pub mod schema;
pub mod verdict;

pub use action::MutationAction;
pub use config::{Config, LearningConfig, LoggingConfig, RunnerConfig, StorageConfig};
pub use endpoint::Endpoint;
pub use policy::{ActionValues, PolicyTable};
pub use schema::{PayloadSchema, SchemaField};
pub use verdict::{
    ExecutionSummary, FailureRecord, ProbeReport, ProcessOutcome, RunClassification, RunStatus,
    RunVerdict,
};
