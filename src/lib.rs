//! Fuzzloop - Adaptive API Fuzz Prober
//!
//! Fuzzloop probes discovered API endpoints with externally generated test
//! programs, classifies each run's output into a structured verdict, scores
//! the verdict with a reward signal, and feeds the reward into a persistent
//! per-endpoint epsilon-greedy policy over payload mutation strategies.
//! Strategies that expose real defects (server crashes, unhandled errors) are
//! favored over time; strategies that fail to execute at all are strongly
//! discouraged.
//!
//! # Architecture
//!
//! The crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, errors, and collaborator ports
//! - **Service Layer** (`services`): The adaptive execution loop
//! - **Infrastructure Layer** (`infrastructure`): File storage, process
//!   execution, and configuration
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use fuzzloop::domain::models::{Endpoint, LearningConfig, PayloadSchema};
//! use fuzzloop::domain::ports::{NullHistorySink, StaticArtifact};
//! use fuzzloop::infrastructure::{JsonPolicyStore, TestRunner};
//! use fuzzloop::services::{MutationPolicy, RunCoordinator};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(JsonPolicyStore::new("storage/q_table.json"));
//! let policy = Arc::new(MutationPolicy::load(store, LearningConfig::default()).await?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, Endpoint, ExecutionSummary, FailureRecord, LearningConfig, MutationAction,
    PayloadSchema, PolicyTable, ProbeReport, ProcessOutcome, RunClassification, RunStatus,
    RunVerdict,
};
pub use domain::ports::{
    ArtifactGenerator, PolicyRepository, RunHistorySink, TestExecutor, TestRun,
};
pub use infrastructure::{ConfigError, ConfigLoader, JsonPolicyStore, TestRunner};
pub use services::{MutationPolicy, RunCoordinator};
