use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid exploration_rate: {0}. Must be within [0.0, 1.0]")]
    InvalidExplorationRate(f64),

    #[error("Invalid learning_rate: {0}. Must be within (0.0, 1.0]")]
    InvalidLearningRate(f64),

    #[error("Invalid discount_factor: {0}. Must be within [0.0, 1.0)")]
    InvalidDiscountFactor(f64),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Runner program cannot be empty")]
    EmptyRunnerProgram,

    #[error("Policy store path cannot be empty")]
    EmptyPolicyPath,

    #[error("Results directory cannot be empty")]
    EmptyResultsDir,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .fuzzloop/config.yaml (project config)
    /// 3. .fuzzloop/local.yaml (project local overrides, optional)
    /// 4. Environment variables (FUZZLOOP_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.fuzzloop/) so multiple
    /// projects on one machine learn independent policies.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".fuzzloop/config.yaml"))
            .merge(Yaml::file(".fuzzloop/local.yaml"))
            .merge(Env::prefixed("FUZZLOOP_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let learning = &config.learning;
        if !(0.0..=1.0).contains(&learning.exploration_rate) {
            return Err(ConfigError::InvalidExplorationRate(
                learning.exploration_rate,
            ));
        }
        if !(learning.learning_rate > 0.0 && learning.learning_rate <= 1.0) {
            return Err(ConfigError::InvalidLearningRate(learning.learning_rate));
        }
        if !(0.0..1.0).contains(&learning.discount_factor) {
            return Err(ConfigError::InvalidDiscountFactor(learning.discount_factor));
        }

        if config.runner.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.runner.timeout_secs));
        }
        if config.runner.program.is_empty() {
            return Err(ConfigError::EmptyRunnerProgram);
        }

        if config.storage.policy_path.is_empty() {
            return Err(ConfigError::EmptyPolicyPath);
        }
        if config.storage.results_dir.is_empty() {
            return Err(ConfigError::EmptyResultsDir);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
