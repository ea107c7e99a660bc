use thiserror::Error;

/// Domain-level errors for policy persistence and maintenance.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read policy store at {path}: {source}")]
    StoreRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write policy store at {path}: {source}")]
    StoreWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy store at {path} is not valid JSON: {source}")]
    StoreFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Endpoint not found in policy table: {0}")]
    EndpointNotFound(String),
}
