//! Infrastructure layer: file storage, process execution, config loading.

pub mod config;
pub mod policy_file;
pub mod runner;

pub use config::{ConfigError, ConfigLoader};
pub use policy_file::JsonPolicyStore;
pub use runner::TestRunner;
