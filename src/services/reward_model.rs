//! Reward computation: turning a verdict into the scalar the policy learns
//! from.
//!
//! The reward shape encodes the system's true objective: mutation strategies
//! that provoke a backend crash score above strategies that merely fail
//! assertions, and a suite that did not genuinely execute is worse than any
//! number of ordinary failures.

use crate::domain::models::{ExecutionSummary, RunClassification};

/// Reward per passing test.
const REWARD_PER_PASS: f64 = 1.0;

/// Penalty per failing test.
const PENALTY_PER_FAIL: f64 = -5.0;

/// Bonus when the output carries the server-crash marker.
const CRASH_BONUS: f64 = 10.0;

/// Fixed penalty when the environment failed before tests executed.
const COLLECTION_ERROR_PENALTY: f64 = -10.0;

/// Fixed penalty when the parser could not account for non-empty output.
/// Weaker than [`COLLECTION_ERROR_PENALTY`]: confidence that this is a real
/// collection failure is lower.
const AMBIGUITY_PENALTY: f64 = -5.0;

/// Literal marker that the backend crashed while serving a request.
const CRASH_MARKER: &str = "500 Internal Server Error";

/// Compute the reward for one parsed run.
///
/// Precedence:
/// 1. [`RunClassification::ParseAmbiguity`] ⇒ fixed −5.0, superseding the
///    count-based computation entirely.
/// 2. Any `error` count ⇒ fixed −10.0, ignoring passed/failed.
/// 3. Otherwise `passed·1.0 + failed·(−5.0)`, plus +10.0 when the raw text
///    contains the crash marker.
pub fn compute(
    summary: &ExecutionSummary,
    classification: RunClassification,
    raw_output: &str,
) -> f64 {
    if classification == RunClassification::ParseAmbiguity {
        return AMBIGUITY_PENALTY;
    }
    if summary.error > 0 {
        return COLLECTION_ERROR_PENALTY;
    }

    let mut reward =
        f64::from(summary.passed) * REWARD_PER_PASS + f64::from(summary.failed) * PENALTY_PER_FAIL;
    if raw_output.contains(CRASH_MARKER) {
        reward += CRASH_BONUS;
    }
    reward
}
