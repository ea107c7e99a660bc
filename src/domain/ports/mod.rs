//! Ports: trait seams between the core and its collaborators.

pub mod collaborators;
pub mod policy_repository;
pub mod test_executor;

pub use collaborators::{ArtifactGenerator, NullHistorySink, RunHistorySink, StaticArtifact};
pub use policy_repository::PolicyRepository;
pub use test_executor::{TestExecutor, TestRun};
