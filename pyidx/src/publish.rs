//! # Publishing
//!
//! One publish updates one package directory:
//!
//! 1. read and hash every artifact (an unreadable file aborts before any write)
//! 2. fetch the stored index, or start empty
//! 3. merge the package into it
//! 4. upload artifacts the index did not already list (all of them with `force`)
//! 5. store the index
//! 6. list the directory in the root index if it is not there yet
//!
//! The merge happens before any upload so a package that does not belong in
//! the fetched index is rejected without leaving orphaned artifacts behind.

use crate::error::{PublishError, PublishResult};
use crate::storage::Storage;
use pyidx_core::{sha256_hex, Artifact, Package};
use pyidx_store::ObjectStore;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    /// Re-upload artifacts the index already lists
    pub force: bool,
    /// Keep the root index listing up to date
    pub root_index: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            force: false,
            root_index: true,
        }
    }
}

/// What a publish did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub package: String,
    pub directory: String,
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
    pub index_key: String,
    /// Links listed in the index after the publish
    pub links: usize,
    /// False when the stored index already listed everything
    pub index_changed: bool,
    pub root_index_updated: bool,
}

pub struct Publisher<S> {
    storage: Storage<S>,
    options: PublishOptions,
}

impl<S: ObjectStore> Publisher<S> {
    pub fn new(storage: Storage<S>, options: PublishOptions) -> Self {
        Self { storage, options }
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn into_storage(self) -> Storage<S> {
        self.storage
    }

    pub fn publish(&self, package: &Package) -> PublishResult<PublishReport> {
        let directory = package.directory();
        info!(package = %package.name, directory = %directory, files = package.files.len(), "Publishing");

        let hashed = unique_filenames(read_artifacts(package)?)?;
        let digests = Package {
            name: package.name.clone(),
            files: hashed
                .iter()
                .map(|(artifact, _)| artifact.clone())
                .collect(),
        };

        let mut index = self.storage.get_index(package);
        let before = index.clone();
        let listed: Vec<bool> = digests
            .files
            .iter()
            .map(|artifact| index.contains(&artifact.filename()))
            .collect();

        index.add_package(&digests)?;

        let mut uploaded = Vec::new();
        let mut skipped = Vec::new();
        for ((artifact, body), already_listed) in hashed.iter().zip(listed) {
            let filename = artifact.filename();
            if already_listed && !self.options.force {
                debug!(file = %filename, "Already listed, skipping upload");
                skipped.push(filename);
                continue;
            }
            self.storage.put_artifact(package, artifact, body)?;
            if already_listed {
                index.set_sha256(&filename, artifact.sha256.as_deref());
            }
            uploaded.push(filename);
        }

        let index_changed = index != before;
        let index_key = if index.directory().is_some() {
            self.storage.put_index(&index)?
        } else {
            self.storage.index_key(&directory)
        };

        let root_index_updated = self.options.root_index && self.update_root_index(&directory)?;

        info!(
            package = %package.name,
            uploaded = uploaded.len(),
            skipped = skipped.len(),
            "Published"
        );

        Ok(PublishReport {
            package: package.name.clone(),
            directory,
            uploaded,
            skipped,
            index_key,
            links: index.len(),
            index_changed,
            root_index_updated,
        })
    }

    fn update_root_index(&self, directory: &str) -> PublishResult<bool> {
        let Some(mut root) = self.storage.get_root_index() else {
            debug!("No root index key for this layout");
            return Ok(false);
        };
        if !root.add_directory(directory) {
            return Ok(false);
        }
        Ok(self.storage.put_root_index(&root)?.is_some())
    }

    /// Publish several packages in order, stopping at the first failure.
    pub fn publish_all(&self, packages: &[Package]) -> PublishResult<Vec<PublishReport>> {
        packages.iter().map(|package| self.publish(package)).collect()
    }
}

fn read_artifacts(package: &Package) -> PublishResult<Vec<(Artifact, Vec<u8>)>> {
    package
        .files
        .iter()
        .map(|artifact| {
            let body = std::fs::read(&artifact.path).map_err(|source| {
                PublishError::ReadArtifact {
                    path: artifact.path.clone(),
                    source,
                }
            })?;
            let hashed = artifact.clone().with_sha256(sha256_hex(&body));
            Ok((hashed, body))
        })
        .collect()
}

// Files sharing a basename share a storage key. Identical copies are uploaded
// once; differing contents are rejected before anything is written.
fn unique_filenames(hashed: Vec<(Artifact, Vec<u8>)>) -> PublishResult<Vec<(Artifact, Vec<u8>)>> {
    let mut unique: Vec<(Artifact, Vec<u8>)> = Vec::with_capacity(hashed.len());
    for (artifact, body) in hashed {
        let filename = artifact.filename();
        match unique.iter().find(|(kept, _)| kept.filename() == filename) {
            Some((kept, _)) if kept.sha256 == artifact.sha256 => {
                debug!(file = %filename, path = %artifact.path.display(), "Duplicate file, uploading once");
            }
            Some((kept, _)) => {
                return Err(PublishError::ConflictingFilename {
                    filename,
                    first: kept.path.clone(),
                    second: artifact.path,
                });
            }
            None => unique.push((artifact, body)),
        }
    }
    Ok(unique)
}
