//! JSON-file policy store.
//!
//! Persists the policy table as pretty-printed JSON mapping endpoint path →
//! action name → value. Saves write to a sibling temp file and rename into
//! place, so a crash mid-write can never leave a truncated table.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::error::PolicyError;
use crate::domain::models::PolicyTable;
use crate::domain::ports::PolicyRepository;

/// File-backed implementation of [`PolicyRepository`].
pub struct JsonPolicyStore {
    path: PathBuf,
}

impl JsonPolicyStore {
    /// Create a store over the given file path. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store's file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map_or_else(
            || std::ffi::OsString::from("policy"),
            std::ffi::OsStr::to_os_string,
        );
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PolicyRepository for JsonPolicyStore {
    async fn load(&self) -> Result<PolicyTable, PolicyError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No policy store yet, starting empty");
                return Ok(PolicyTable::new());
            }
            Err(err) => {
                return Err(PolicyError::StoreRead {
                    path: self.path.display().to_string(),
                    source: err,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|err| PolicyError::StoreFormat {
            path: self.path.display().to_string(),
            source: err,
        })
    }

    async fn save(&self, table: &PolicyTable) -> Result<(), PolicyError> {
        let write_err = |err| PolicyError::StoreWrite {
            path: self.path.display().to_string(),
            source: err,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }

        // serde_json only fails here on non-string map keys or failing
        // Serialize impls; the table has neither.
        let json = serde_json::to_string_pretty(table).map_err(|err| PolicyError::StoreFormat {
            path: self.path.display().to_string(),
            source: err,
        })?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json.as_bytes())
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&temp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}
