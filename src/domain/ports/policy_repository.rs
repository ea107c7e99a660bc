use async_trait::async_trait;

use crate::domain::error::PolicyError;
use crate::domain::models::PolicyTable;

/// Repository port for durable policy-table persistence.
///
/// Implementations must guarantee that `load(save(table))` reproduces an
/// equal table (within floating-point tolerance) and that a crash mid-save
/// cannot leave a truncated table behind.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Load the persisted table; a missing store yields an empty table.
    async fn load(&self) -> Result<PolicyTable, PolicyError>;

    /// Persist the whole table, replacing any previous contents atomically.
    async fn save(&self, table: &PolicyTable) -> Result<(), PolicyError>;
}
