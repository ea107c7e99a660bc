//! The learned policy table: endpoint → action → Q-value.
//!
//! The table is the only durable state in the system. It is loaded once at
//! startup, mutated at most once per completed probe, and written through to
//! disk after every mutation. Invariant: once an endpoint has been visited,
//! its sub-map contains *all five* actions (initialized to 0.0 at first
//! sight); it is never partially populated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::MutationAction;
use super::endpoint::Endpoint;

/// Learned Q-values for every action at a single endpoint.
pub type ActionValues = BTreeMap<MutationAction, f64>;

/// Durable mapping of endpoint path → action → learned value.
///
/// Backed by `BTreeMap` so serialization order is deterministic and saved
/// tables diff cleanly between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTable {
    entries: BTreeMap<String, ActionValues>,
}

impl PolicyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of endpoints the table has seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has seen no endpoints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ensure the endpoint exists with all five actions present, initializing
    /// any missing action to 0.0, and return its value sub-map.
    ///
    /// This upholds the never-partially-populated invariant even when a table
    /// persisted by an older build is missing actions.
    pub fn ensure_endpoint(&mut self, endpoint: &Endpoint) -> &mut ActionValues {
        let values = self.entries.entry(endpoint.as_str().to_string()).or_default();
        for action in MutationAction::ALL {
            values.entry(action).or_insert(0.0);
        }
        values
    }

    /// The value sub-map for an endpoint, if it has been visited.
    pub fn values_for(&self, endpoint: &Endpoint) -> Option<&ActionValues> {
        self.entries.get(endpoint.as_str())
    }

    /// The current Q-value at `(endpoint, action)`, or 0.0 if unseen.
    pub fn value(&self, endpoint: &Endpoint, action: MutationAction) -> f64 {
        self.entries
            .get(endpoint.as_str())
            .and_then(|values| values.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// The highest-valued action for an endpoint, ties broken by the first
    /// maximum in [`MutationAction::ALL`] declaration order.
    ///
    /// Returns [`MutationAction::Standard`] for an unseen endpoint (all-zero
    /// values tie, and `Standard` is first in canonical order).
    pub fn best_action(&self, endpoint: &Endpoint) -> MutationAction {
        let Some(values) = self.entries.get(endpoint.as_str()) else {
            return MutationAction::Standard;
        };
        let mut best = MutationAction::ALL[0];
        let mut best_value = values.get(&best).copied().unwrap_or(0.0);
        for action in &MutationAction::ALL[1..] {
            let value = values.get(action).copied().unwrap_or(0.0);
            // Strict comparison keeps the earliest action on ties.
            if value > best_value {
                best = *action;
                best_value = value;
            }
        }
        best
    }

    /// The maximum Q-value currently recorded for an endpoint (0.0 if unseen).
    pub fn max_value(&self, endpoint: &Endpoint) -> f64 {
        self.entries
            .get(endpoint.as_str())
            .map(|values| values.values().copied().fold(f64::NEG_INFINITY, f64::max))
            .filter(|max| max.is_finite())
            .unwrap_or(0.0)
    }

    /// Overwrite the value at `(endpoint, action)`, initializing the endpoint
    /// sub-map if needed.
    pub fn set_value(&mut self, endpoint: &Endpoint, action: MutationAction, value: f64) {
        self.ensure_endpoint(endpoint).insert(action, value);
    }

    /// Remove one endpoint's learned values. Returns whether it was present.
    pub fn remove_endpoint(&mut self, endpoint: &Endpoint) -> bool {
        self.entries.remove(endpoint.as_str()).is_some()
    }

    /// Iterate endpoints and their value sub-maps in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionValues)> {
        self.entries.iter().map(|(path, values)| (path.as_str(), values))
    }

    /// Approximate equality within a tolerance, for round-trip checks.
    pub fn approx_eq(&self, other: &PolicyTable, tolerance: f64) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries.iter().all(|(path, values)| {
            other.entries.get(path).is_some_and(|other_values| {
                values.len() == other_values.len()
                    && values.iter().all(|(action, value)| {
                        other_values
                            .get(action)
                            .is_some_and(|other_value| (value - other_value).abs() <= tolerance)
                    })
            })
        })
    }
}
