//! Storage error types

/// Errors raised by an [`ObjectStore`](crate::ObjectStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for '{key}' failed: {source}")]
    Http {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for '{key}'")]
    Status { key: String, status: u16 },

    #[error("invalid object metadata for '{key}': {source}")]
    Metadata {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// True when the object simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(key.to_string())
        } else {
            StoreError::Io {
                key: key.to_string(),
                source,
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
