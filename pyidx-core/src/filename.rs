//! Distribution filename parsing
//!
//! Extracts the project name and version encoded in wheel and source
//! distribution filenames. The version becomes the release key an index groups
//! links under, and the name decides which index directory a file belongs to.

use crate::normalize::normalize_name;
use serde::Serialize;
use std::fmt;

/// Source distribution archive suffixes, longest first.
pub const SDIST_EXTENSIONS: &[&str] = &[".tar.gz", ".tar.bz2", ".zip"];

/// Wheel suffix.
pub const WHEEL_EXTENSION: &str = ".whl";

/// Every suffix a publishable distribution may carry.
pub const DIST_EXTENSIONS: &[&str] = &[".whl", ".tar.gz", ".tar.bz2", ".zip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistKind {
    Wheel,
    Sdist,
}

impl fmt::Display for DistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistKind::Wheel => write!(f, "wheel"),
            DistKind::Sdist => write!(f, "sdist"),
        }
    }
}

/// A parsed distribution filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistFilename {
    /// Project name as spelled in the filename
    pub name: String,
    /// Version string
    pub version: String,
    pub kind: DistKind,
}

impl DistFilename {
    /// Parse a bare filename (no directory components).
    ///
    /// Returns `None` for anything that is not a wheel or source distribution
    /// with a recognisable `{name}-{version}` stem.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pyidx_core::filename::DistFilename;
    /// let dist = DistFilename::parse("requests-2.28.0-py3-none-any.whl").unwrap();
    /// assert_eq!(dist.name, "requests");
    /// assert_eq!(dist.version, "2.28.0");
    /// ```
    pub fn parse(filename: &str) -> Option<Self> {
        if let Some(stem) = filename.strip_suffix(WHEEL_EXTENSION) {
            return Self::parse_wheel(stem);
        }

        SDIST_EXTENSIONS
            .iter()
            .find_map(|ext| filename.strip_suffix(ext))
            .and_then(Self::parse_sdist)
    }

    // {name}-{version}(-{build tag})?-{python tag}-{abi tag}-{platform tag}
    fn parse_wheel(stem: &str) -> Option<Self> {
        let parts: Vec<&str> = stem.split('-').collect();
        if !(5..=6).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self {
            name: parts[0].to_string(),
            version: parts[1].to_string(),
            kind: DistKind::Wheel,
        })
    }

    fn parse_sdist(stem: &str) -> Option<Self> {
        // Find the last dash that separates name from version
        let dash_pos = stem.rfind('-')?;
        let (name, version) = (&stem[..dash_pos], &stem[dash_pos + 1..]);
        let looks_like_version = version
            .strip_prefix('v')
            .unwrap_or(version)
            .starts_with(|c: char| c.is_ascii_digit());
        if name.is_empty() || !looks_like_version {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
            kind: DistKind::Sdist,
        })
    }

    /// The PEP 503 form of [`DistFilename::name`].
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// The key an index groups a file under: its version when the filename is a
/// recognisable distribution, otherwise the filename itself.
pub fn release_key(filename: &str) -> String {
    DistFilename::parse(filename)
        .map(|dist| dist.version)
        .unwrap_or_else(|| filename.to_string())
}

/// Returns true when `filename` ends in a publishable distribution suffix.
pub fn has_dist_extension(filename: &str) -> bool {
    DIST_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}
