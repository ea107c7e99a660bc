//! Service layer: the adaptive execution loop.

pub mod mutation_policy;
pub mod payload_mutator;
pub mod result_parser;
pub mod reward_model;
pub mod run_coordinator;

pub use mutation_policy::MutationPolicy;
pub use payload_mutator::generate_mutation_payload;
pub use result_parser::{parse_structured_report, parse_summary, ParsedSummary};
pub use run_coordinator::RunCoordinator;
