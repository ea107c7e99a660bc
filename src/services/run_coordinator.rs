//! One atomic "probe an endpoint" operation.
//!
//! The coordinator walks a single run through
//! `choose action → mutate payload → materialize artifact → execute → parse →
//! score → update policy → record history` and always returns a complete
//! [`ProbeReport`]; internal faults are logged and folded into the verdict,
//! never propagated to the caller.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::models::{
    Endpoint, MutationAction, PayloadSchema, ProbeReport, ProcessOutcome, RunClassification,
    RunStatus, RunVerdict,
};
use crate::domain::ports::{ArtifactGenerator, RunHistorySink, TestExecutor};
use crate::services::mutation_policy::MutationPolicy;
use crate::services::{payload_mutator, result_parser, reward_model};

/// Reward for runs that short-circuit before producing a usable test signal.
///
/// Deliberately neutral rather than the −10.0 collection-error penalty: a
/// timeout or launch failure says nothing about the mutation strategy, and
/// the historical behavior this preserves never penalized these paths. The
/// short-circuit paths also skip the policy update entirely.
const SHORT_CIRCUIT_REWARD: f64 = 0.0;

/// Composes the policy, mutator, runner, parser, and reward model into one
/// synchronous probe operation.
pub struct RunCoordinator {
    policy: Arc<MutationPolicy>,
    generator: Arc<dyn ArtifactGenerator>,
    runner: Arc<dyn TestExecutor>,
    history: Arc<dyn RunHistorySink>,
}

impl RunCoordinator {
    /// Wire up a coordinator from its collaborators.
    pub fn new(
        policy: Arc<MutationPolicy>,
        generator: Arc<dyn ArtifactGenerator>,
        runner: Arc<dyn TestExecutor>,
        history: Arc<dyn RunHistorySink>,
    ) -> Self {
        Self {
            policy,
            generator,
            runner,
            history,
        }
    }

    /// Probe one endpoint: exactly one policy update occurs per completed
    /// run, and none on the short-circuit paths (missing artifact, timeout,
    /// launch failure).
    pub async fn probe(&self, endpoint: &Endpoint, schema: &PayloadSchema) -> ProbeReport {
        let action = self.policy.choose_action(endpoint).await;
        let payload =
            payload_mutator::generate_mutation_payload(schema, action, &mut StdRng::from_entropy());

        tracing::info!(endpoint = %endpoint, action = %action, "Probing endpoint");

        let artifact = match self.generator.materialize(endpoint, action, &payload).await {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(endpoint = %endpoint, error = %err, "Artifact generation failed");
                let verdict = RunVerdict::short_circuit(
                    RunClassification::ArtifactMissing,
                    err.to_string(),
                );
                return self.finish_short_circuit(endpoint, action, verdict).await;
            }
        };

        let run = self.runner.run(&artifact).await;
        let (exit_code, raw_output) = match run.outcome {
            ProcessOutcome::Completed { exit_code, output } => (exit_code, output),
            ProcessOutcome::ArtifactMissing => {
                tracing::warn!(artifact = %artifact.display(), "Test artifact not found");
                let verdict = RunVerdict::short_circuit(
                    RunClassification::ArtifactMissing,
                    "Test artifact does not exist".to_string(),
                );
                return self.finish_short_circuit(endpoint, action, verdict).await;
            }
            ProcessOutcome::TimedOut { timeout_secs } => {
                tracing::warn!(endpoint = %endpoint, timeout_secs, "Test run timed out");
                let verdict = RunVerdict::short_circuit(
                    RunClassification::ProcessFailure,
                    format!("Timed out after {timeout_secs}s"),
                );
                return self.finish_short_circuit(endpoint, action, verdict).await;
            }
            ProcessOutcome::LaunchFailed { reason } => {
                tracing::warn!(endpoint = %endpoint, reason = %reason, "Test process launch failed");
                let verdict =
                    RunVerdict::short_circuit(RunClassification::ProcessFailure, reason);
                return self.finish_short_circuit(endpoint, action, verdict).await;
            }
        };

        let parsed = result_parser::parse_summary(&raw_output);
        let failures = result_parser::parse_structured_report(&run.report_path).await;
        // The report path is unique per run; remove it so the results dir
        // does not accumulate.
        let _ = tokio::fs::remove_file(&run.report_path).await;

        let reward = reward_model::compute(&parsed.summary, parsed.classification, &raw_output);

        let status = if parsed.classification != RunClassification::Normal
            || parsed.summary.error > 0
        {
            RunStatus::Error
        } else if exit_code == Some(0) {
            RunStatus::Success
        } else {
            RunStatus::Failure
        };

        let q_value = match self.policy.update(endpoint, action, reward).await {
            Ok(q) => Some(q),
            Err(err) => {
                // The in-memory update took effect; only persistence failed.
                tracing::error!(endpoint = %endpoint, error = %err, "Policy persist failed");
                None
            }
        };

        let report = ProbeReport {
            endpoint: endpoint.clone(),
            action,
            verdict: RunVerdict {
                status,
                summary: parsed.summary,
                classification: parsed.classification,
                failures,
                raw_output,
            },
            reward,
            q_value,
        };
        self.record_history(&report).await;

        tracing::info!(
            endpoint = %endpoint,
            action = %action,
            status = %report.verdict.status,
            reward,
            "Probe complete"
        );
        report
    }

    /// Terminal path for runs with no usable test signal: fixed neutral
    /// reward, no policy update.
    async fn finish_short_circuit(
        &self,
        endpoint: &Endpoint,
        action: MutationAction,
        verdict: RunVerdict,
    ) -> ProbeReport {
        let report = ProbeReport {
            endpoint: endpoint.clone(),
            action,
            verdict,
            reward: SHORT_CIRCUIT_REWARD,
            q_value: None,
        };
        self.record_history(&report).await;
        report
    }

    async fn record_history(&self, report: &ProbeReport) {
        if let Err(err) = self.history.record(report).await {
            tracing::warn!(error = %err, "History sink rejected probe report");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::error::PolicyError;
    use crate::domain::models::{
        ExecutionSummary, LearningConfig, MutationAction, PolicyTable,
    };
    use crate::domain::ports::{NullHistorySink, PolicyRepository, StaticArtifact, TestRun};

    struct MemoryRepository(std::sync::Mutex<Option<PolicyTable>>);

    #[async_trait]
    impl PolicyRepository for MemoryRepository {
        async fn load(&self) -> Result<PolicyTable, PolicyError> {
            Ok(self.0.lock().unwrap().clone().unwrap_or_default())
        }

        async fn save(&self, table: &PolicyTable) -> Result<(), PolicyError> {
            *self.0.lock().unwrap() = Some(table.clone());
            Ok(())
        }
    }

    /// Executor that replays a canned outcome.
    struct FakeExecutor(ProcessOutcome);

    #[async_trait]
    impl TestExecutor for FakeExecutor {
        async fn run(&self, _artifact: &Path) -> TestRun {
            TestRun {
                outcome: self.0.clone(),
                report_path: PathBuf::from("/nonexistent/report.json"),
            }
        }
    }

    async fn coordinator(outcome: ProcessOutcome) -> (RunCoordinator, Arc<MutationPolicy>) {
        let repo = Arc::new(MemoryRepository(std::sync::Mutex::new(None)));
        let params = LearningConfig {
            exploration_rate: 0.0,
            ..LearningConfig::default()
        };
        let policy = Arc::new(MutationPolicy::load(repo, params).await.unwrap());
        let coordinator = RunCoordinator::new(
            policy.clone(),
            Arc::new(StaticArtifact::new("/tmp/test_artifact.py")),
            Arc::new(FakeExecutor(outcome)),
            Arc::new(NullHistorySink),
        );
        (coordinator, policy)
    }

    #[tokio::test]
    async fn completed_run_updates_policy_and_scores() {
        let outcome = ProcessOutcome::Completed {
            exit_code: Some(0),
            output: "3 passed in 0.2s".to_string(),
        };
        let (coordinator, policy) = coordinator(outcome).await;
        let endpoint = Endpoint::new("/api/users");

        let report = coordinator.probe(&endpoint, &PayloadSchema::new()).await;

        assert_eq!(report.verdict.status, RunStatus::Success);
        assert_eq!(
            report.verdict.summary,
            ExecutionSummary {
                passed: 3,
                failed: 0,
                error: 0
            }
        );
        assert!((report.reward - 3.0).abs() < f64::EPSILON);
        assert!(report.q_value.is_some());

        let table = policy.snapshot().await;
        assert!(table.value(&endpoint, report.action) > 0.0);
    }

    #[tokio::test]
    async fn timeout_short_circuits_without_policy_update() {
        let (coordinator, policy) =
            coordinator(ProcessOutcome::TimedOut { timeout_secs: 60 }).await;
        let endpoint = Endpoint::new("/api/users");

        let report = coordinator.probe(&endpoint, &PayloadSchema::new()).await;

        assert_eq!(report.verdict.status, RunStatus::Error);
        assert_eq!(
            report.verdict.classification,
            RunClassification::ProcessFailure
        );
        assert!((report.reward - 0.0).abs() < f64::EPSILON);
        assert!(report.q_value.is_none());

        // No update: the endpoint's values are still all zero.
        let table = policy.snapshot().await;
        for action in MutationAction::ALL {
            assert_eq!(table.value(&endpoint, action), 0.0);
        }
    }

    #[tokio::test]
    async fn missing_artifact_short_circuits() {
        let (coordinator, _policy) = coordinator(ProcessOutcome::ArtifactMissing).await;
        let report = coordinator
            .probe(&Endpoint::new("/api/users"), &PayloadSchema::new())
            .await;

        assert_eq!(
            report.verdict.classification,
            RunClassification::ArtifactMissing
        );
        assert_eq!(report.verdict.summary, ExecutionSummary::single_error());
        assert!(report.q_value.is_none());
    }

    #[tokio::test]
    async fn collection_error_scores_heavy_penalty() {
        let outcome = ProcessOutcome::Completed {
            exit_code: Some(2),
            output: "ModuleNotFoundError: No module named 'flask'".to_string(),
        };
        let (coordinator, _policy) = coordinator(outcome).await;
        let report = coordinator
            .probe(&Endpoint::new("/api/users"), &PayloadSchema::new())
            .await;

        assert_eq!(report.verdict.status, RunStatus::Error);
        assert_eq!(
            report.verdict.classification,
            RunClassification::CollectionError
        );
        assert!((report.reward - -10.0).abs() < f64::EPSILON);
        // A completed run always updates the policy, even on heavy penalty.
        assert!(report.q_value.is_some());
    }

    #[tokio::test]
    async fn unparsable_output_scores_ambiguity_penalty() {
        let outcome = ProcessOutcome::Completed {
            exit_code: Some(1),
            output: "segfault or some such nonsense".to_string(),
        };
        let (coordinator, _policy) = coordinator(outcome).await;
        let report = coordinator
            .probe(&Endpoint::new("/api/users"), &PayloadSchema::new())
            .await;

        assert_eq!(
            report.verdict.classification,
            RunClassification::ParseAmbiguity
        );
        assert_eq!(report.verdict.summary.error, 1);
        assert!((report.reward - -5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn crash_marker_rewards_the_chosen_action() {
        let outcome = ProcessOutcome::Completed {
            exit_code: Some(1),
            output: "3 passed, 1 failed\nHTTP/1.1 500 Internal Server Error".to_string(),
        };
        let (coordinator, _policy) = coordinator(outcome).await;
        let report = coordinator
            .probe(&Endpoint::new("/api/users"), &PayloadSchema::new())
            .await;

        assert_eq!(report.verdict.status, RunStatus::Failure);
        assert!((report.reward - 8.0).abs() < f64::EPSILON);
    }
}
