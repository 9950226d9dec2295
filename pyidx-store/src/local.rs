//! Filesystem-backed store
//!
//! Each key maps to a file under the store root. A key ending in `/` maps to
//! [`DIRECTORY_OBJECT`] inside that directory. Every object gets a JSON sidecar
//! next to it recording the headers it was stored with, so the tree can be
//! synced to a real bucket or served by a static file server later.

use crate::{validate_key, ObjectStore, PutOptions, StoreError, StoreResult};
use pyidx_core::sha256_hex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name standing in for a directory-style (`.../`) object.
pub const DIRECTORY_OBJECT: &str = ".index";

/// Sidecar suffix for object metadata.
pub const METADATA_SUFFIX: &str = ".meta.json";

const TEMP_SUFFIX: &str = ".tmp";

// Segments the store writes itself; an object stored under one of these
// names would clobber an index, a sidecar or an in-flight write.
fn is_reserved(segment: &str) -> bool {
    segment == DIRECTORY_OBJECT
        || segment.ends_with(METADATA_SUFFIX)
        || segment.ends_with(TEMP_SUFFIX)
}

/// Metadata persisted beside every stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(flatten)]
    pub options: PutOptions,
    pub size: u64,
    pub sha256: String,
}

/// A directory tree laid out like a bucket.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `key`.
    ///
    /// Keys naming the store's own files (`.index`, sidecars, temp files)
    /// are rejected as [`StoreError::InvalidKey`].
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        if key.split('/').any(is_reserved) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        let mut path = self.root.clone();
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            match segment {
                "" if last => path.push(DIRECTORY_OBJECT),
                "" | "." => {}
                _ => path.push(segment),
            }
        }
        Ok(path)
    }

    fn metadata_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }

    /// Metadata recorded by the last `store` at `key`.
    pub fn metadata(&self, key: &str) -> StoreResult<ObjectMetadata> {
        let path = Self::metadata_path(&self.path_for(key)?);
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::io(key, e))?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Metadata {
            key: key.to_string(),
            source,
        })
    }

    // Write to a sibling temp file, then rename over the target.
    fn write_atomic(key: &str, path: &Path, content: &[u8]) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(key, e))?;
            debug!(parent = %parent.display(), "Ensured parent directory");
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(TEMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).map_err(|e| StoreError::io(key, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::io(key, e)
        })
    }
}

impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            debug!(key = %key, path = %path.display(), "Object not found");
            return Err(StoreError::NotFound(key.to_string()));
        }
        fs::read(&path).map_err(|e| StoreError::io(key, e))
    }

    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()> {
        let path = self.path_for(key)?;

        let metadata = ObjectMetadata {
            options: options.clone(),
            size: body.len() as u64,
            sha256: sha256_hex(body),
        };
        let sidecar = serde_json::to_vec_pretty(&metadata).map_err(|source| {
            StoreError::Metadata {
                key: key.to_string(),
                source,
            }
        })?;

        Self::write_atomic(key, &path, body)?;
        Self::write_atomic(key, &Self::metadata_path(&path), &sidecar)?;

        info!(
            key = %key,
            path = %path.display(),
            size = body.len(),
            "Object stored"
        );
        Ok(())
    }
}
