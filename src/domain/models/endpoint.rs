//! Endpoint identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized API path; the unit of policy state.
///
/// Normalization keeps the policy table keyed consistently regardless of how
/// the caller spells the path: surrounding whitespace is trimmed, a leading
/// `/` is ensured, and a trailing `/` is stripped (except for the root path
/// itself).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from a raw path, applying normalization.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let mut path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Endpoint(path)
    }

    /// The normalized path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(raw: &str) -> Self {
        Endpoint::new(raw)
    }
}
