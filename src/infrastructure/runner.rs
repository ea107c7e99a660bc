//! Bounded external test-process execution.
//!
//! Spawns the configured test program against an artifact, captures combined
//! stdout/stderr, and asks the harness to write a structured report to a
//! per-run unique path. Every boundary case maps to a tagged
//! [`ProcessOutcome`] rather than an error.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

use crate::domain::models::{ProcessOutcome, RunnerConfig, StorageConfig};
use crate::domain::ports::{TestExecutor, TestRun};

/// Process-spawning implementation of [`TestExecutor`].
pub struct TestRunner {
    config: RunnerConfig,
    results_dir: PathBuf,
}

impl TestRunner {
    /// Create a runner from configuration.
    pub fn new(config: RunnerConfig, storage: &StorageConfig) -> Self {
        Self {
            config,
            results_dir: PathBuf::from(&storage.results_dir),
        }
    }

    /// A report path no concurrent run can collide with.
    fn fresh_report_path(&self) -> PathBuf {
        self.results_dir.join(format!("report-{}.json", Uuid::new_v4()))
    }

    fn build_command(&self, artifact: &Path, report_path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(format!(
                "{}={}",
                self.config.report_flag,
                report_path.display()
            ))
            .arg(artifact)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Backstop: reap the child if the run future is cancelled.
            .kill_on_drop(true);
        cmd
    }

    async fn execute(&self, artifact: &Path, report_path: &Path) -> ProcessOutcome {
        if tokio::fs::create_dir_all(&self.results_dir).await.is_err() {
            return ProcessOutcome::LaunchFailed {
                reason: format!(
                    "Could not create results directory {}",
                    self.results_dir.display()
                ),
            };
        }

        let mut child = match self.build_command(artifact, report_path).spawn() {
            Ok(child) => child,
            Err(err) => {
                return ProcessOutcome::LaunchFailed {
                    reason: format!("Failed to spawn {}: {err}", self.config.program),
                }
            }
        };

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill().await;
            return ProcessOutcome::LaunchFailed {
                reason: "Failed to capture stdout".to_string(),
            };
        };
        let Some(mut stderr) = child.stderr.take() else {
            let _ = child.kill().await;
            return ProcessOutcome::LaunchFailed {
                reason: "Failed to capture stderr".to_string(),
            };
        };

        let duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(duration, async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            // Drain both pipes before waiting so a chatty process cannot
            // deadlock on a full pipe buffer.
            let (out_read, err_read) =
                tokio::join!(stdout.read_to_end(&mut out), stderr.read_to_end(&mut err));
            out_read?;
            err_read?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((out, err, status))
        })
        .await;

        match result {
            Ok(Ok((out, err, status))) => {
                let mut output = String::from_utf8_lossy(&out).into_owned();
                let stderr_text = String::from_utf8_lossy(&err);
                if !stderr_text.is_empty() {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                    output.push_str(&stderr_text);
                }
                ProcessOutcome::Completed {
                    exit_code: status.code(),
                    output,
                }
            }
            Ok(Err(err)) => {
                // The child may still be running; do not leave it unbounded.
                let _ = child.kill().await;
                ProcessOutcome::LaunchFailed {
                    reason: format!("I/O failure while communicating with test process: {err}"),
                }
            }
            Err(_) => {
                // Timeout: kill the process and discard partial output.
                let _ = child.kill().await;
                ProcessOutcome::TimedOut {
                    timeout_secs: self.config.timeout_secs,
                }
            }
        }
    }
}

#[async_trait]
impl TestExecutor for TestRunner {
    async fn run(&self, artifact: &Path) -> TestRun {
        let report_path = self.fresh_report_path();

        if !artifact.exists() {
            tracing::warn!(artifact = %artifact.display(), "Test artifact does not exist");
            return TestRun {
                outcome: ProcessOutcome::ArtifactMissing,
                report_path,
            };
        }

        tracing::info!(
            artifact = %artifact.display(),
            program = %self.config.program,
            timeout_secs = self.config.timeout_secs,
            "Executing test artifact"
        );

        let outcome = self.execute(artifact, &report_path).await;
        if let ProcessOutcome::Completed { exit_code, output } = &outcome {
            tracing::info!(
                exit_code = ?exit_code,
                output_len = output.len(),
                "Test process finished"
            );
        }
        TestRun {
            outcome,
            report_path,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &Path) -> StorageConfig {
        StorageConfig {
            policy_path: dir.join("q_table.json").display().to_string(),
            results_dir: dir.join("results").display().to_string(),
        }
    }

    /// Runner whose "test program" is `echo`: it just prints its arguments,
    /// which is enough to exercise spawn, capture, and completion.
    fn echo_runner(dir: &Path, first_args: Vec<String>) -> TestRunner {
        TestRunner::new(
            RunnerConfig {
                program: "echo".to_string(),
                args: first_args,
                report_flag: "--report-json".to_string(),
                timeout_secs: 10,
            },
            &storage(dir),
        )
    }

    #[tokio::test]
    async fn missing_artifact_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let runner = echo_runner(dir.path(), vec![]);
        let run = runner.run(Path::new("/no/such/test_file.py")).await;
        assert_eq!(run.outcome, ProcessOutcome::ArtifactMissing);
    }

    #[tokio::test]
    async fn completed_run_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_api.py");
        tokio::fs::write(&artifact, b"# placeholder").await.unwrap();

        let runner = echo_runner(dir.path(), vec!["2".to_string(), "passed,".to_string()]);
        let run = runner.run(&artifact).await;

        match run.outcome {
            ProcessOutcome::Completed { exit_code, output } => {
                assert_eq!(exit_code, Some(0));
                assert!(output.contains("2 passed,"));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn report_paths_are_unique_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_api.py");
        tokio::fs::write(&artifact, b"# placeholder").await.unwrap();

        let runner = echo_runner(dir.path(), vec![]);
        let first = runner.run(&artifact).await;
        let second = runner.run(&artifact).await;
        assert_ne!(first.report_path, second.report_path);
    }

    #[tokio::test]
    async fn unknown_program_is_launch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_api.py");
        tokio::fs::write(&artifact, b"# placeholder").await.unwrap();

        let runner = TestRunner::new(
            RunnerConfig {
                program: "/definitely/not/a/real/binary".to_string(),
                args: vec![],
                report_flag: "--report-json".to_string(),
                timeout_secs: 10,
            },
            &storage(dir.path()),
        );
        let run = runner.run(&artifact).await;
        assert!(matches!(run.outcome, ProcessOutcome::LaunchFailed { .. }));
    }

    #[tokio::test]
    async fn slow_process_times_out_and_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_api.py");
        tokio::fs::write(&artifact, b"# placeholder").await.unwrap();

        // `sh -c "sleep 5"` ignores the extra report/artifact arguments.
        let runner = TestRunner::new(
            RunnerConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "sleep 5".to_string()],
                report_flag: "--report-json".to_string(),
                timeout_secs: 1,
            },
            &storage(dir.path()),
        );

        let started = std::time::Instant::now();
        let run = runner.run(&artifact).await;
        assert_eq!(run.outcome, ProcessOutcome::TimedOut { timeout_secs: 1 });
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }

    #[tokio::test]
    async fn killed_child_does_not_outlive_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("test_api.py");
        tokio::fs::write(&artifact, b"# placeholder").await.unwrap();
        let pid_file = dir.path().join("child.pid");

        let runner = TestRunner::new(
            RunnerConfig {
                program: "sh".to_string(),
                args: vec![
                    "-c".to_string(),
                    format!("echo $$ > {}; sleep 30", pid_file.display()),
                ],
                report_flag: "--report-json".to_string(),
                timeout_secs: 1,
            },
            &storage(dir.path()),
        );

        let run = runner.run(&artifact).await;
        assert_eq!(run.outcome, ProcessOutcome::TimedOut { timeout_secs: 1 });

        // kill() reaps the child, so its /proc entry must be gone.
        let pid = tokio::fs::read_to_string(&pid_file).await.unwrap();
        assert!(!Path::new(&format!("/proc/{}", pid.trim())).exists());
    }
}
