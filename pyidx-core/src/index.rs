//! # Package Index Model
//!
//! An [`Index`] is the in-memory form of the HTML page that lists every
//! published file for one package directory. It is built fresh for each
//! publish: parsed from whatever the bucket currently holds (or started
//! empty), merged with exactly one [`Package`], rendered, and dropped.
//!
//! ## Ordering
//!
//! Links keep insertion order: a file added later always renders after
//! every file already listed, even when it belongs to an older release.
//! Parsing rebuilds that order from document order, so
//! `Index::parse(&index.to_html()) == index` for every index this module
//! can construct. [`Index::releases`] groups the same links by release key
//! (the version parsed from the filename) for display.
//!
//! ## Merging
//!
//! Merges only ever add. A filename that is already listed keeps its
//! existing link, which makes re-publishing the same files a no-op.
//!
//! ## Ownership
//!
//! An index serves a single package directory. The first non-empty merge
//! binds it to that directory and later merges from a different directory
//! are rejected with [`IndexError::ForeignPackage`].

use crate::digest::is_sha256_hex;
use crate::filename::release_key;
use crate::html::{escape, percent_decode, scan_anchors, RawAnchor};
use crate::package::Package;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("package directory '{found}' cannot be merged into the index for '{expected}'")]
    ForeignPackage { expected: String, found: String },
}

/// One listed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Bare filename, relative to the index's own location. Directory
    /// entries (root index) carry a trailing `/`.
    pub filename: String,
    /// Visible anchor text
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Link {
    /// Whitespace in the label is collapsed to single spaces; an empty label
    /// falls back to the filename.
    pub fn new(filename: impl Into<String>, label: impl AsRef<str>) -> Self {
        let filename = filename.into();
        let label = label
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let label = if label.is_empty() {
            filename.clone()
        } else {
            label
        };
        Self {
            filename,
            label,
            sha256: None,
        }
    }

    /// Attach a digest. Anything that is not 64 hex characters is dropped.
    pub fn with_sha256(mut self, sha256: Option<impl AsRef<str>>) -> Self {
        self.sha256 = sha256
            .map(|s| s.as_ref().to_ascii_lowercase())
            .filter(|s| is_sha256_hex(s));
        self
    }

    pub fn is_directory(&self) -> bool {
        self.filename.ends_with('/')
    }

    /// The `href` value, before HTML attribute escaping.
    pub fn href(&self) -> String {
        let (name, slash) = match self.filename.strip_suffix('/') {
            Some(dir) => (dir, "/"),
            None => (self.filename.as_str(), ""),
        };
        let mut href = encode_segment(name);
        href.push_str(slash);
        if let Some(sha256) = &self.sha256 {
            let _ = write!(href, "#sha256={sha256}");
        }
        href
    }

    fn from_anchor(anchor: RawAnchor) -> Option<Self> {
        let href = anchor.href?;

        let (target, fragment) = match href.split_once('#') {
            Some((target, fragment)) => (target, Some(fragment)),
            None => (href.as_str(), None),
        };
        let target = target.split_once('?').map_or(target, |(path, _)| path);

        // mailto:, javascript: and friends name no file
        if let Some((scheme, rest)) = target.split_once(':') {
            if !scheme.contains('/') && !rest.starts_with("//") {
                return None;
            }
        }

        let is_directory = target.ends_with('/');
        let segment = target.trim_end_matches('/').rsplit('/').next()?;
        let segment = percent_decode(segment);
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }

        let filename = if is_directory {
            format!("{segment}/")
        } else {
            segment
        };

        let sha256 = fragment.and_then(|f| f.strip_prefix("sha256="));
        Some(Link::new(filename, &anchor.text).with_sha256(sha256))
    }
}

// Percent-encode everything outside a conservative filename-safe set so the
// href survives fragment, query and path splitting on the way back in.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() || "-._~+!$()*,;=@".contains(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Ordered listing of the files published for one package directory.
#[derive(Debug, Clone, Default)]
pub struct Index {
    directory: Option<String>,
    links: IndexMap<String, Link>,
}

impl PartialEq for Index {
    // The owner binding is not part of the rendered listing, so it does not
    // take part in equality. Order does.
    fn eq(&self, other: &Self) -> bool {
        self.links.len() == other.links.len() && self.links.values().eq(other.links.values())
    }
}

#[derive(Serialize)]
struct IndexListing<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<&'a str>,
    releases: IndexMap<String, Vec<&'a Link>>,
}

impl Serialize for Index {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        IndexListing {
            directory: self.directory(),
            releases: self.releases(),
        }
        .serialize(serializer)
    }
}

impl Eq for Index {}

impl Index {
    /// An index with no links, bound to no directory.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild an index from previously stored HTML.
    ///
    /// Never fails: anything that is not a recognisable anchor with a
    /// filename-like `href` is ignored, so empty, whitespace-only or garbage
    /// input yields an empty index. Repeated filenames keep their first link.
    pub fn parse(html: &str) -> Self {
        let mut index = Self::empty();
        for link in scan_anchors(html).into_iter().filter_map(Link::from_anchor) {
            index.add_link(link);
        }
        index
    }

    /// The package directory this index is bound to, if any.
    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.links.contains_key(filename)
    }

    /// Links grouped by release key. Releases appear in the order their
    /// first file was listed, and links keep stored order within a release.
    pub fn releases(&self) -> IndexMap<String, Vec<&Link>> {
        let mut releases: IndexMap<String, Vec<&Link>> = IndexMap::new();
        for link in self.links.values() {
            releases
                .entry(release_key(&link.filename))
                .or_default()
                .push(link);
        }
        releases
    }

    /// Every link, in stored order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Append a single link after every link already listed.
    ///
    /// Returns false, leaving the index untouched, when the filename is
    /// already listed or is not a usable filename.
    pub fn add_link(&mut self, link: Link) -> bool {
        let bare = link.filename.trim_end_matches('/');
        if bare.is_empty() || bare == "." || bare == ".." || self.contains(&link.filename) {
            return false;
        }

        self.links.insert(link.filename.clone(), link);
        true
    }

    /// List a package directory, as the root index does.
    pub fn add_directory(&mut self, directory: &str) -> bool {
        self.add_link(Link::new(format!("{directory}/"), directory))
    }

    /// Merge one package's files into the index.
    ///
    /// Returns how many links were added. A package without files changes
    /// nothing, not even the directory binding.
    pub fn add_package(&mut self, package: &Package) -> Result<usize, IndexError> {
        if package.is_empty() {
            return Ok(0);
        }

        let directory = package.directory();
        match &self.directory {
            Some(expected) if *expected != directory => {
                return Err(IndexError::ForeignPackage {
                    expected: expected.clone(),
                    found: directory,
                });
            }
            Some(_) => {}
            None => self.directory = Some(directory),
        }

        let mut added = 0;
        for artifact in &package.files {
            let filename = artifact.filename();
            let link = Link::new(filename.clone(), &filename)
                .with_sha256(artifact.sha256.as_deref());
            if self.add_link(link) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Replace the digest on an existing link, as a forced re-upload does.
    ///
    /// Returns true when the listed digest changed.
    pub fn set_sha256(&mut self, filename: &str, sha256: Option<&str>) -> bool {
        let Some(link) = self.links.get_mut(filename) else {
            return false;
        };
        let updated = link.clone().with_sha256(sha256);
        if updated.sha256 == link.sha256 {
            return false;
        }
        link.sha256 = updated.sha256;
        true
    }

    /// Render the index as a complete HTML document.
    ///
    /// Deterministic: equal state renders to identical bytes.
    pub fn to_html(&self) -> String {
        let title = match &self.directory {
            Some(directory) => format!("Links for {}", escape(directory)),
            None => "Package Index".to_string(),
        };

        let mut html = format!(
            r#"<!DOCTYPE html>
<html>
  <head><title>{title}</title></head>
  <body>
    <h1>{title}</h1>
"#
        );

        for link in self.links() {
            let _ = writeln!(
                html,
                r#"    <a href="{}">{}</a><br/>"#,
                escape(&link.href()),
                escape(&link.label)
            );
        }

        html.push_str("  </body>\n</html>\n");
        html
    }
}
