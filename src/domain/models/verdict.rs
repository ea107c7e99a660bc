//! Typed run outcomes: process outcomes, execution summaries, and verdicts.
//!
//! The external test process used to be classified through a generic
//! catch-all; here every boundary case is a tagged variant so reward
//! computation and classification react deterministically.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::MutationAction;
use super::endpoint::Endpoint;

// ---------------------------------------------------------------------------
// ProcessOutcome
// ---------------------------------------------------------------------------

/// The tagged outcome of one external test-process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process ran to completion within the timeout.
    Completed {
        /// Exit code, if the process was not killed by a signal.
        exit_code: Option<i32>,
        /// Combined stdout and stderr text.
        output: String,
    },
    /// The process exceeded the wall-clock timeout and was killed; partial
    /// output is discarded.
    TimedOut {
        /// The timeout that expired, in seconds.
        timeout_secs: u64,
    },
    /// The process could not be spawned or its pipes could not be read.
    LaunchFailed {
        /// Human-readable launch failure description.
        reason: String,
    },
    /// The test artifact does not exist; nothing was spawned.
    ArtifactMissing,
}

// ---------------------------------------------------------------------------
// ExecutionSummary
// ---------------------------------------------------------------------------

/// Aggregate pass/fail/error counts for one run.
///
/// `error > 0` means the run is treated as not having meaningfully executed
/// tests, regardless of the other counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Tests that passed.
    pub passed: u32,
    /// Tests that failed an assertion.
    pub failed: u32,
    /// Environment-level errors (collection failures, import errors).
    pub error: u32,
}

impl ExecutionSummary {
    /// A summary representing a single environment-level error.
    pub const fn single_error() -> Self {
        Self {
            passed: 0,
            failed: 0,
            error: 1,
        }
    }

    /// Total observed test activity.
    ///
    /// Counts come from untrusted process output, so the sum saturates
    /// rather than overflowing.
    pub const fn total(&self) -> u32 {
        self.passed
            .saturating_add(self.failed)
            .saturating_add(self.error)
    }
}

// ---------------------------------------------------------------------------
// FailureRecord
// ---------------------------------------------------------------------------

/// One failure or error marker extracted from the structured report.
///
/// A single test case can contribute two records: one for its failure marker
/// and one for its error marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Test identifier as reported by the harness.
    pub test_name: String,
    /// Source file the test lives in, when reported.
    pub file: Option<String>,
    /// Line number within the source file, when reported.
    pub line: Option<u32>,
    /// Short failure message.
    pub message: Option<String>,
    /// Long-form trace text.
    pub trace: Option<String>,
}

// ---------------------------------------------------------------------------
// RunStatus and RunClassification
// ---------------------------------------------------------------------------

/// Overall status of one probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The test process exited 0.
    Success,
    /// The test process exited non-zero but produced a usable signal.
    Failure,
    /// No usable test signal (environment error, timeout, launch failure).
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Success => "success",
            RunStatus::Failure => "failure",
            RunStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// How the run's output was classified; drives reward computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunClassification {
    /// Counts were parsed normally (possibly all zero on empty output).
    Normal,
    /// The environment failed before any test executed: syntax error, missing
    /// module, or zero items collected.
    CollectionError,
    /// Zero parsed total despite non-empty output; the parser likely missed
    /// something and the run must not score as "zero activity, zero penalty".
    ParseAmbiguity,
    /// The test artifact was not found; nothing ran.
    ArtifactMissing,
    /// The process timed out or could not be launched.
    ProcessFailure,
}

// ---------------------------------------------------------------------------
// RunVerdict and ProbeReport
// ---------------------------------------------------------------------------

/// The structured verdict for one probe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunVerdict {
    /// Overall run status.
    pub status: RunStatus,
    /// Aggregate counts (text summary wins for aggregates).
    pub summary: ExecutionSummary,
    /// Output classification, for deterministic reward handling.
    pub classification: RunClassification,
    /// Per-test detail from the structured report (report wins for detail).
    pub failures: Vec<FailureRecord>,
    /// Raw combined stdout/stderr text.
    pub raw_output: String,
}

impl RunVerdict {
    /// An error verdict with no per-test detail, for short-circuit paths.
    pub fn short_circuit(classification: RunClassification, raw_output: String) -> Self {
        Self {
            status: RunStatus::Error,
            summary: ExecutionSummary::single_error(),
            classification,
            failures: Vec::new(),
            raw_output,
        }
    }
}

/// Everything one coordinator invocation returns: the verdict, the action
/// taken, the reward it earned, and the post-update Q-value when a policy
/// update occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// The endpoint that was probed.
    pub endpoint: Endpoint,
    /// The mutation strategy the policy chose for this run.
    pub action: MutationAction,
    /// The structured verdict.
    pub verdict: RunVerdict,
    /// The scalar reward fed to (or withheld from) the policy update.
    pub reward: f64,
    /// The updated Q-value at (endpoint, action); `None` on short-circuit
    /// paths where no policy update occurs.
    pub q_value: Option<f64>,
}
