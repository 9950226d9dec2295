//! # Object Storage Backends
//!
//! The publisher talks to storage through [`ObjectStore`]: fetch the bytes at
//! a key, or store bytes at a key with content headers and an access policy.
//! Keys are `/`-separated; a key ending in `/` names the directory-style
//! object that bucket-root listings are served from.
//!
//! ## Backends
//!
//! - [`LocalStore`]: a directory tree standing in for a bucket
//! - [`HttpStore`]: blocking GET/PUT against an S3-compatible endpoint
//! - [`MemoryStore`]: an in-process map, for tests and embedding
//! - [`DryRunStore`]: reads through to another store, keeps writes in memory
//!
//! No backend offers conditional writes. Two publishers updating the same key
//! at once race, and the last write wins.

pub mod dry_run;
pub mod error;
pub mod http;
pub mod local;
pub mod memory;

pub use dry_run::DryRunStore;
pub use error::{StoreError, StoreResult};
pub use http::{HttpStore, HttpStoreConfig};
pub use local::LocalStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

/// Headers and policy attached to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutOptions {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Canned ACL, e.g. `private` or `public-read`
    pub acl: String,
}

impl PutOptions {
    pub fn new(content_type: impl Into<String>, acl: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: None,
            acl: acl.into(),
        }
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }
}

/// Raw byte storage addressed by key.
pub trait ObjectStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Bytes stored at `key`, or [`StoreError::NotFound`].
    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Replace whatever is stored at `key` in a single write.
    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        (**self).fetch(key)
    }

    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()> {
        (**self).store(key, body, options)
    }
}

/// Reject keys that could escape a store root or that no bucket accepts.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.split('/').any(|segment| segment == "..");
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
