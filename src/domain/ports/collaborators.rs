//! Ports for the external collaborators this core composes with.
//!
//! Test generation, self-healing, and long-term run history live outside
//! this crate. These traits are the seams; the null/static implementations
//! here let the coordinator run without any of them wired up.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::models::{Endpoint, MutationAction, ProbeReport};

/// Materializes a runnable test artifact for one probe.
///
/// Implemented upstream by the generative test-writer; given the endpoint,
/// the chosen mutation strategy, and the mutated payload, it returns the path
/// of a test program the runner can invoke.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Produce (or refresh) the test artifact for this probe.
    async fn materialize(
        &self,
        endpoint: &Endpoint,
        action: MutationAction,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<PathBuf>;
}

/// Receives each completed probe for long-term history.
///
/// History persistence is a collaborator concern; this core only hands the
/// report over. Sink failures must not fail the probe.
#[async_trait]
pub trait RunHistorySink: Send + Sync {
    /// Append one completed probe to history.
    async fn record(&self, report: &ProbeReport) -> anyhow::Result<()>;
}

/// Generator that always returns a fixed, pre-materialized artifact path.
///
/// Used by the CLI, where the operator points at an existing test file, and
/// by integration tests.
pub struct StaticArtifact {
    path: PathBuf,
}

impl StaticArtifact {
    /// Wrap an existing artifact path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArtifactGenerator for StaticArtifact {
    async fn materialize(
        &self,
        _endpoint: &Endpoint,
        _action: MutationAction,
        _payload: &serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<PathBuf> {
        Ok(self.path.clone())
    }
}

/// History sink that discards every report.
pub struct NullHistorySink;

#[async_trait]
impl RunHistorySink for NullHistorySink {
    async fn record(&self, _report: &ProbeReport) -> anyhow::Result<()> {
        Ok(())
    }
}
