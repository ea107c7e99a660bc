//! Domain layer: pure models, errors, and collaborator ports.

pub mod error;
pub mod models;
pub mod ports;

pub use error::PolicyError;
