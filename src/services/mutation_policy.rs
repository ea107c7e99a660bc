//! Epsilon-greedy action selection and Bellman-style value updates.
//!
//! The policy is a stationary per-endpoint bandit: each probe is one
//! "episode", and the "next state" of the Bellman update is the same
//! endpoint's current value table. State lives behind a single mutex so the
//! read-modify-write of an update (and its write-through persist) can never
//! lose a concurrent write.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::domain::error::PolicyError;
use crate::domain::models::{Endpoint, LearningConfig, MutationAction, PolicyTable};
use crate::domain::ports::PolicyRepository;

// ---------------------------------------------------------------------------
// MutationPolicy
// ---------------------------------------------------------------------------

/// The learned mutation policy over [`PolicyTable`] state.
///
/// Loaded once at startup; every update is persisted synchronously through
/// the repository before the call returns (write-through, no batching).
pub struct MutationPolicy {
    params: LearningConfig,
    repository: Arc<dyn PolicyRepository>,
    state: Mutex<PolicyState>,
}

/// Mutable state guarded by the policy mutex: the table and the RNG used for
/// exploration. Keeping the RNG under the same lock makes selection
/// reproducible under a fixed seed even with concurrent callers.
struct PolicyState {
    table: PolicyTable,
    rng: StdRng,
}

impl MutationPolicy {
    /// Load the persisted table (or start empty) and build a policy over it.
    pub async fn load(
        repository: Arc<dyn PolicyRepository>,
        params: LearningConfig,
    ) -> Result<Self, PolicyError> {
        let table = repository.load().await?;
        tracing::info!(
            endpoints = table.len(),
            exploration_rate = params.exploration_rate,
            "Loaded policy table"
        );
        Ok(Self {
            params,
            repository,
            state: Mutex::new(PolicyState {
                table,
                rng: StdRng::from_entropy(),
            }),
        })
    }

    /// Like [`load`](Self::load), but with a deterministic RNG seed.
    pub async fn load_with_seed(
        repository: Arc<dyn PolicyRepository>,
        params: LearningConfig,
        seed: u64,
    ) -> Result<Self, PolicyError> {
        let table = repository.load().await?;
        Ok(Self {
            params,
            repository,
            state: Mutex::new(PolicyState {
                table,
                rng: StdRng::seed_from_u64(seed),
            }),
        })
    }

    /// Choose the next mutation action for an endpoint.
    ///
    /// An unseen endpoint is initialized with all five actions at 0.0. With
    /// probability ε a uniformly random action is returned (exploration);
    /// otherwise the highest-valued action, ties broken by canonical
    /// declaration order (exploitation).
    pub async fn choose_action(&self, endpoint: &Endpoint) -> MutationAction {
        let mut state = self.state.lock().await;
        state.table.ensure_endpoint(endpoint);

        let explore = state.rng.gen::<f64>() < self.params.exploration_rate;
        let action = if explore {
            let index = state.rng.gen_range(0..MutationAction::ALL.len());
            MutationAction::ALL[index]
        } else {
            state.table.best_action(endpoint)
        };

        tracing::debug!(
            endpoint = %endpoint,
            action = %action,
            explore,
            "Chose mutation action"
        );
        action
    }

    /// Apply the Bellman update for one observed reward and persist.
    ///
    /// `Q(e,a) ← Q(e,a) + α·(reward + γ·max_a' Q(e,a') − Q(e,a))`, where the
    /// max is taken over this endpoint's current values. Only the `(e,a)`
    /// entry changes. Returns the new Q-value.
    pub async fn update(
        &self,
        endpoint: &Endpoint,
        action: MutationAction,
        reward: f64,
    ) -> Result<f64, PolicyError> {
        let mut state = self.state.lock().await;
        state.table.ensure_endpoint(endpoint);

        let current_q = state.table.value(endpoint, action);
        let max_future_q = state.table.max_value(endpoint);
        let new_q = current_q
            + self.params.learning_rate
                * (reward + self.params.discount_factor * max_future_q - current_q);
        state.table.set_value(endpoint, action, new_q);

        // Write-through while still holding the lock, so a concurrent update
        // cannot interleave between the table mutation and the persist.
        self.repository.save(&state.table).await?;

        tracing::info!(
            endpoint = %endpoint,
            action = %action,
            reward,
            q_value = new_q,
            "Policy updated"
        );
        Ok(new_q)
    }

    /// A copy of the current table, for inspection.
    pub async fn snapshot(&self) -> PolicyTable {
        self.state.lock().await.table.clone()
    }

    /// Forget learned values, for one endpoint or the whole table, and
    /// persist the result.
    pub async fn reset(&self, endpoint: Option<&Endpoint>) -> Result<(), PolicyError> {
        let mut state = self.state.lock().await;
        match endpoint {
            Some(endpoint) => {
                if !state.table.remove_endpoint(endpoint) {
                    return Err(PolicyError::EndpointNotFound(endpoint.to_string()));
                }
                tracing::info!(endpoint = %endpoint, "Reset endpoint policy");
            }
            None => {
                state.table = PolicyTable::new();
                tracing::info!("Reset entire policy table");
            }
        }
        self.repository.save(&state.table).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
