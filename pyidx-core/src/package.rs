//! Publish units: a project name plus the artifact files to upload

use crate::normalize::normalize_name;
use std::path::{Path, PathBuf};

/// One local artifact file belonging to a [`Package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Hex SHA256 of the file contents, once the publisher has read them
    pub sha256: Option<String>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// The basename this artifact is published under.
    ///
    /// Falls back to the whole path for paths without a final component.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Artifact {
    fn from(path: PathBuf) -> Self {
        Artifact::new(path)
    }
}

impl From<&str> for Artifact {
    fn from(path: &str) -> Self {
        Artifact::new(path)
    }
}

impl From<&Path> for Artifact {
    fn from(path: &Path) -> Self {
        Artifact::new(path)
    }
}

/// A named publish unit and the files that make it up.
///
/// Pure value object: nothing here touches the filesystem. The storage
/// namespace is [`Package::directory`], which depends on the name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub files: Vec<Artifact>,
}

impl Package {
    pub fn new<I, A>(name: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Artifact>,
    {
        Self {
            name: name.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Storage key segment for this package, stable across publishes.
    pub fn directory(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Basenames of every artifact, in file order.
    pub fn filenames(&self) -> impl Iterator<Item = String> + '_ {
        self.files.iter().map(Artifact::filename)
    }
}
