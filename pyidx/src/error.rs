//! Error types for configuration and publishing

use pyidx_core::IndexError;
use pyidx_store::StoreError;
use std::path::PathBuf;

/// Problems loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml_ng::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything that can abort a publish.
///
/// Index fetch and parse failures are deliberately absent: a missing or
/// unreadable index falls back to an empty one instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("failed to read {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{} and {} would both be stored as '{filename}'",
        first.display(),
        second.display()
    )]
    ConflictingFilename {
        filename: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("not a recognised distribution filename: {0}")]
    UnrecognizedDistribution(PathBuf),

    #[error("no distributions found for '{0}'")]
    NoDistributions(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("refusing to store an index that is not bound to a package directory")]
    UnboundIndex,
}

pub type PublishResult<T> = Result<T, PublishError>;
