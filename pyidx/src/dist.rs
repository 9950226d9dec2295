//! Turning command-line inputs into packages
//!
//! Inputs may name files, directories (scanned one level deep for
//! distribution archives) or glob patterns. Files are then grouped into one
//! [`Package`] per normalised project name.

use crate::error::{PublishError, PublishResult};
use glob::glob;
use indexmap::IndexMap;
use pyidx_core::{has_dist_extension, DistFilename, Package};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expand inputs into distribution paths, first occurrence first.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> PublishResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let found = if input.is_dir() {
            scan_directory(input)?
        } else if input.exists() {
            vec![input.to_path_buf()]
        } else {
            expand_pattern(input)?
        };

        if found.is_empty() {
            return Err(PublishError::NoDistributions(input.display().to_string()));
        }
        debug!(input = %input.display(), matches = found.len(), "Expanded input");

        for path in found {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

fn scan_directory(dir: &Path) -> PublishResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| PublishError::ReadArtifact {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| has_dist_extension(&name.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn expand_pattern(pattern: &Path) -> PublishResult<Vec<PathBuf>> {
    let pattern = pattern.to_string_lossy().to_string();
    let matches = glob(&pattern).map_err(|source| PublishError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    Ok(matches.flatten().filter(|path| path.is_file()).collect())
}

/// Group distribution files by project, in first-seen order.
///
/// Every file must have a recognisable wheel or sdist filename, since that
/// is where the project name comes from.
pub fn group_distributions<P: AsRef<Path>>(paths: &[P]) -> PublishResult<Vec<Package>> {
    let mut groups: IndexMap<String, Package> = IndexMap::new();

    for path in paths {
        let path = path.as_ref();
        let dist = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(DistFilename::parse)
            .ok_or_else(|| PublishError::UnrecognizedDistribution(path.to_path_buf()))?;

        groups
            .entry(dist.normalized_name())
            .or_insert_with(|| Package::new(dist.name.clone(), Vec::<PathBuf>::new()))
            .files
            .push(path.into());
    }

    Ok(groups.into_values().collect())
}
