use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::models::ProcessOutcome;

/// The result of one bounded external test-process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    /// The tagged process outcome.
    pub outcome: ProcessOutcome,
    /// Where the harness was asked to write its structured report. The file
    /// may legitimately be absent (harness without report support).
    pub report_path: PathBuf,
}

/// Port for bounded external test-process execution.
///
/// Implementations never return an error: every boundary case is a tagged
/// [`ProcessOutcome`] variant so downstream classification is deterministic.
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// Execute the test artifact under the configured timeout.
    async fn run(&self, artifact: &Path) -> TestRun;
}
