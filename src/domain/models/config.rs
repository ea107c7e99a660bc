//! Configuration models.
//!
//! Loaded by `infrastructure::config::ConfigLoader` via hierarchical merging
//! (defaults → project yaml → local yaml → environment). All fields have
//! defaults so a bare checkout runs without any config file.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bandit hyperparameters.
    pub learning: LearningConfig,
    /// External test-process execution settings.
    pub runner: RunnerConfig,
    /// Durable storage locations.
    pub storage: StorageConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Epsilon-greedy / Bellman update hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Exploration rate ε: probability of trying a uniformly random action.
    pub exploration_rate: f64,
    /// Learning rate α.
    pub learning_rate: f64,
    /// Discount factor γ.
    pub discount_factor: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            exploration_rate: 0.3,
            learning_rate: 0.1,
            discount_factor: 0.9,
        }
    }
}

/// External test-process execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// The test program to execute (e.g. `"pytest"`).
    pub program: String,
    /// Arguments passed before the report flag and artifact path.
    pub args: Vec<String>,
    /// Flag used to request the structured report; the per-run report path is
    /// appended as the flag's value (`<flag>=<path>`).
    pub report_flag: String,
    /// Wall-clock timeout for one run, in seconds.
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "pytest".to_string(),
            args: vec!["-v".to_string(), "-rP".to_string()],
            report_flag: "--report-json".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Durable storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the persisted policy table.
    pub policy_path: String,
    /// Directory structured reports are written into (one unique file per
    /// run).
    pub results_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            policy_path: "storage/q_table.json".to_string(),
            results_dir: "storage/results".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, or error.
    pub level: String,
    /// Log format: json or pretty.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
