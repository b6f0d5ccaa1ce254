use std::collections::BTreeMap;
use anyhow::{Context, Result};
use walkdir::WalkDir;
use crate::paths::{VendorPaths, STAGING_SUFFIX};

/// Aggregate record of fully installed library versions: library name →
/// descending (lexical) version list. A `BTreeMap` keeps libraries in
/// ascending name order.
pub type LocalIndex = BTreeMap<String, Vec<String>>;

/// Rescans the vendor tree and rewrites the index file.
///
/// Only library directories that carry a cache entry file are counted.
/// Version directories with the staging suffix are skipped; a staging
/// directory is never a completed install. The result is always a full
/// snapshot, never an incremental patch.
///
/// # Errors
/// Returns an error on filesystem failures while scanning or writing.
pub fn rebuild_local_index(paths: &VendorPaths) -> Result<LocalIndex> {
    let mut index = LocalIndex::new();
    if paths.root().is_dir() {
        for entry in WalkDir::new(paths.root()).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let library = entry.file_name().to_string_lossy().to_string();
            if !paths.info_file(&library).exists() {
                continue;
            }
            let mut versions = Vec::new();
            for version_entry in WalkDir::new(entry.path()).min_depth(1).max_depth(1) {
                let version_entry = version_entry?;
                if !version_entry.file_type().is_dir() {
                    continue;
                }
                let version = version_entry.file_name().to_string_lossy().to_string();
                if version.ends_with(STAGING_SUFFIX) {
                    continue;
                }
                versions.push(version);
            }
            if versions.is_empty() {
                continue;
            }
            versions.sort();
            versions.reverse();
            index.insert(library, versions);
        }
    }

    paths.ensure_root()?;
    let index_file = paths.index_file();
    let content = serde_json::to_string_pretty(&index)?;
    std::fs::write(&index_file, content)
        .with_context(|| format!("Could not write index file {index_file:?}"))?;
    Ok(index)
}

/// Loads the local-library index, rebuilding it first when the file is
/// missing or a refresh is forced. Returns `None` when the index is empty
/// or unreadable.
pub fn local_libs(paths: &VendorPaths, force_refresh: bool) -> Option<LocalIndex> {
    let index_file = paths.index_file();
    if force_refresh || !index_file.exists() {
        rebuild_local_index(paths).ok()?;
    }
    let content = std::fs::read_to_string(&index_file).ok()?;
    let index: LocalIndex = serde_json::from_str(&content).ok()?;
    if index.is_empty() { None } else { Some(index) }
}
