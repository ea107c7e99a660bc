//! Mutation actions the prober can apply to a request payload.
//!
//! The action set is closed and fixed for the system's lifetime: the learned
//! policy table is keyed by these five variants, so adding or reordering
//! variants invalidates persisted state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A mutation strategy applied to a test payload to probe a specific failure
/// class.
///
/// Declaration order is the canonical order: it is used for deterministic
/// tie-breaking during exploitation and for stable serialization of policy
/// tables. See [`MutationAction::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    /// Run the test as generated (happy path).
    Standard,
    /// Send null values for required fields.
    NullInjection,
    /// Send a SQL metacharacter string (`' OR '1'='1`).
    SqlInjection,
    /// Send a very large string (10,000 characters).
    Overflow,
    /// Send a number where a string is expected.
    TypeMismatch,
}

impl MutationAction {
    /// All actions in canonical declaration order.
    ///
    /// Exploitation tie-breaks resolve to the first maximum in this slice,
    /// never to incidental map iteration order.
    pub const ALL: [MutationAction; 5] = [
        MutationAction::Standard,
        MutationAction::NullInjection,
        MutationAction::SqlInjection,
        MutationAction::Overflow,
        MutationAction::TypeMismatch,
    ];

    /// The snake_case name used in persisted policy tables and CLI output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Standard => "standard",
            MutationAction::NullInjection => "null_injection",
            MutationAction::SqlInjection => "sql_injection",
            MutationAction::Overflow => "overflow",
            MutationAction::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(MutationAction::Standard),
            "null_injection" => Ok(MutationAction::NullInjection),
            "sql_injection" => Ok(MutationAction::SqlInjection),
            "overflow" => Ok(MutationAction::Overflow),
            "type_mismatch" => Ok(MutationAction::TypeMismatch),
            other => Err(format!("unknown mutation action: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_stable() {
        let names: Vec<&str> = MutationAction::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "standard",
                "null_injection",
                "sql_injection",
                "overflow",
                "type_mismatch"
            ]
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&MutationAction::SqlInjection).unwrap(),
            "\"sql_injection\""
        );
        let action: MutationAction = serde_json::from_str("\"type_mismatch\"").unwrap();
        assert_eq!(action, MutationAction::TypeMismatch);
    }

    #[test]
    fn from_str_round_trips_every_action() {
        for action in MutationAction::ALL {
            assert_eq!(action.as_str().parse::<MutationAction>(), Ok(action));
        }
        assert!("drop_table".parse::<MutationAction>().is_err());
    }
}
