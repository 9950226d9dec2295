//! Bucket layout for package indexes and artifacts
//!
//! ```text
//! [prefix/]<dir>/                 package index (or <dir>/index.html)
//! [prefix/]<dir>/<filename>       artifact
//! [prefix/]                       root index (or [prefix/]index.html)
//! ```
//!
//! Reading an index never fails. A missing object, a backend error or bytes
//! that are not UTF-8 all yield an empty [`Index`], which is what a first
//! publish needs.

use crate::error::{PublishError, PublishResult};
use pyidx_core::{Artifact, Index, Package};
use pyidx_store::{ObjectStore, PutOptions, StoreError};
use tracing::{debug, info, warn};

/// Cache policy for indexes, which change on every publish.
pub const INDEX_CACHE_CONTROL: &str = "public, must-revalidate, proxy-revalidate, max-age=0";

/// Object name used for indexes when the bucket is served as a static website.
pub const STATIC_INDEX_NAME: &str = "index.html";

const INDEX_CONTENT_TYPE: &str = "text/html";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOptions {
    pub prefix: Option<String>,
    pub acl: String,
    pub static_website: bool,
}

pub struct Storage<S> {
    store: S,
    prefix: String,
    acl: String,
    index_name: &'static str,
}

impl<S: ObjectStore> Storage<S> {
    pub fn new(store: S, options: StorageOptions) -> Self {
        let prefix = options
            .prefix
            .as_deref()
            .map(|p| p.trim_matches('/').to_string())
            .unwrap_or_default();
        let index_name = if options.static_website {
            STATIC_INDEX_NAME
        } else {
            ""
        };
        Self {
            store,
            prefix,
            acl: options.acl,
            index_name,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn key(&self, relative: &str) -> String {
        if self.prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{relative}", self.prefix)
        }
    }

    pub fn index_key(&self, directory: &str) -> String {
        self.key(&format!("{directory}/{}", self.index_name))
    }

    pub fn artifact_key(&self, directory: &str, filename: &str) -> String {
        self.key(&format!("{directory}/{filename}"))
    }

    /// Key of the listing of every package directory.
    ///
    /// `None` when there is no prefix and indexes are directory objects,
    /// since the bucket root itself has no key.
    pub fn root_index_key(&self) -> Option<String> {
        match (self.prefix.is_empty(), self.index_name.is_empty()) {
            (true, true) => None,
            (true, false) => Some(self.index_name.to_string()),
            (false, _) => Some(format!("{}/{}", self.prefix, self.index_name)),
        }
    }

    pub fn get_index(&self, package: &Package) -> Index {
        self.fetch_index(&package.directory())
    }

    /// The stored index for `directory`, or an empty one.
    pub fn fetch_index(&self, directory: &str) -> Index {
        self.read_index(&self.index_key(directory))
    }

    pub fn get_root_index(&self) -> Option<Index> {
        self.root_index_key().map(|key| self.read_index(&key))
    }

    fn read_index(&self, key: &str) -> Index {
        let bytes = match self.store.fetch(key) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => {
                debug!(key = %key, "No index stored yet, starting empty");
                return Index::empty();
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to fetch index, starting empty");
                return Index::empty();
            }
        };

        match String::from_utf8(bytes) {
            Ok(html) => Index::parse(&html),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored index is not UTF-8, starting empty");
                Index::empty()
            }
        }
    }

    fn index_options(&self) -> PutOptions {
        PutOptions::new(INDEX_CONTENT_TYPE, &self.acl).with_cache_control(INDEX_CACHE_CONTROL)
    }

    /// Store an index under the directory it is bound to.
    pub fn put_index(&self, index: &Index) -> PublishResult<String> {
        let directory = index.directory().ok_or(PublishError::UnboundIndex)?;
        let key = self.index_key(directory);
        self.store
            .store(&key, index.to_html().as_bytes(), &self.index_options())?;
        info!(key = %key, links = index.len(), "Stored index");
        Ok(key)
    }

    /// Returns the key written, or `None` when there is no root key.
    pub fn put_root_index(&self, root: &Index) -> PublishResult<Option<String>> {
        let Some(key) = self.root_index_key() else {
            return Ok(None);
        };
        self.store
            .store(&key, root.to_html().as_bytes(), &self.index_options())?;
        info!(key = %key, directories = root.len(), "Stored root index");
        Ok(Some(key))
    }

    pub fn put_artifact(
        &self,
        package: &Package,
        artifact: &Artifact,
        body: &[u8],
    ) -> PublishResult<String> {
        let filename = artifact.filename();
        let key = self.artifact_key(&package.directory(), &filename);
        let options = PutOptions::new(content_type_for(&filename), &self.acl);
        self.store.store(&key, body, &options)?;
        info!(key = %key, size = body.len(), "Uploaded artifact");
        Ok(key)
    }
}

/// Content type for an artifact filename.
pub fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        "application/x-gzip"
    } else if lower.ends_with(".whl") || lower.ends_with(".zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}
