use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use crate::cache::MetadataCache;
use crate::index::rebuild_local_index;
use crate::paths::VendorPaths;

/// Upper bound of files fetched per call; the rest is deferred to the next
/// call, which resumes by skipping files already present in staging.
pub const MAX_FILES_PER_BATCH: usize = 50;

/// Outcome of one [`download_version`] call.
///
/// `Incomplete` is a structured pending state, not a failure: the caller
/// decides whether and when to call again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The version directory already exists; nothing was done.
    AlreadyInstalled,
    /// Every asset file is in place and the staging directory was promoted.
    Completed,
    /// `missing` of `total` asset files are still absent after this batch.
    Incomplete { missing: usize, total: usize },
}

struct DownloadJob {
    url: String,
    dest: PathBuf,
}

/// Materializes the complete file set of one library version into the
/// vendor tree.
///
/// Downloads go into a staging directory (`<version>_in_progress`); the
/// staging directory is renamed to the final version directory only once
/// every expected file is confirmed present. That rename is the sole commit
/// point — an interrupted run leaves a staging directory, never a partial
/// install. Up to [`MAX_FILES_PER_BATCH`] missing files are fetched in one
/// parallel batch; call again to resume when the outcome is `Incomplete`.
///
/// # Errors
/// Returns an error when the asset list cannot be resolved or on filesystem
/// failures. Failed individual transfers are not errors; they show up as a
/// still-missing file in the `Incomplete` count.
pub fn download_version(
    cache: &mut MetadataCache,
    library: &str,
    version: &str,
    force: bool,
) -> Result<DownloadOutcome> {
    let final_dir = cache.paths().version_dir(library, version);
    if final_dir.is_dir() && !force {
        return Ok(DownloadOutcome::AlreadyInstalled);
    }

    let files = cache
        .asset_files(library, Some(version))
        .ok_or_else(|| anyhow!("No assets found for {library}@{version}"))?;
    let total = files.len();

    // make the library visible to index readers before the download finishes
    cache.persist_metadata(library)?;
    rebuild_local_index(cache.paths())?;

    let staging = cache.paths().staging_dir(library, version);
    fs::create_dir_all(&staging)
        .with_context(|| format!("Could not create staging dir {staging:?}"))?;

    let mut jobs = Vec::new();
    for file in &files {
        let dest = staging.join(file);
        let present = fs::metadata(&dest).map(|m| m.len() > 0).unwrap_or(false);
        if present {
            continue;
        }
        if jobs.len() < MAX_FILES_PER_BATCH {
            jobs.push(DownloadJob {
                url: format!("{}/{}/{}/{}", cache.cdn_url(), library, version, file),
                dest,
            });
        }
    }

    for (job, result) in jobs.iter().zip(fetch_batch(cache.client(), &jobs)) {
        if let Err(err) = result {
            eprintln!("warning: download failed for {}: {err}", job.url);
        }
    }

    let missing = files.iter().filter(|file| !staging.join(file).exists()).count();
    if missing > 0 {
        return Ok(DownloadOutcome::Incomplete { missing, total });
    }

    if final_dir.is_dir() {
        fs::remove_dir_all(&final_dir)
            .with_context(|| format!("Could not remove stale dir {final_dir:?}"))?;
    }
    fs::rename(&staging, &final_dir)
        .with_context(|| format!("Could not promote {staging:?} to {final_dir:?}"))?;
    rebuild_local_index(cache.paths())?;
    Ok(DownloadOutcome::Completed)
}

/// Fetches all jobs concurrently, one thread per job, and blocks until the
/// whole batch has finished. Per-job success or failure is captured in the
/// returned vector, index-aligned with `jobs`.
fn fetch_batch(client: &Client, jobs: &[DownloadJob]) -> Vec<Result<()>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .iter()
            .map(|job| {
                let client = client.clone();
                scope.spawn(move || fetch_asset(&client, job))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("Download thread panicked")))
            })
            .collect()
    })
}

fn fetch_asset(client: &Client, job: &DownloadJob) -> Result<()> {
    if let Some(parent) = job.dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let response = client.get(&job.url).send()?.error_for_status()?;
    let body = response.bytes()?;
    fs::write(&job.dest, &body)?;
    Ok(())
}

/// Recursively removes one installed version.
///
/// If it was the last version of the library, the cache entry file is
/// removed as well and the now-empty library directory is dropped on a
/// best-effort basis. The local index is refreshed even when a removal
/// fails, so it never reports files that are already gone.
///
/// Returns true iff the version directory no longer exists.
pub fn delete_version(paths: &VendorPaths, library: &str, version: &str) -> Result<bool> {
    let version_dir = paths.version_dir(library, version);
    let removal = remove_version_files(paths, library, &version_dir);
    rebuild_local_index(paths)?;
    removal?;
    Ok(!version_dir.is_dir())
}

fn remove_version_files(paths: &VendorPaths, library: &str, version_dir: &Path) -> Result<()> {
    if version_dir.is_dir() {
        fs::remove_dir_all(version_dir)
            .with_context(|| format!("Could not remove {version_dir:?}"))?;
    }

    let library_dir = paths.library_dir(library);
    let has_versions = library_dir.is_dir()
        && fs::read_dir(&library_dir)?
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.path().is_dir());
    if !has_versions {
        let info_file = paths.info_file(library);
        if info_file.exists() {
            fs::remove_file(&info_file)
                .with_context(|| format!("Could not remove cache entry {info_file:?}"))?;
        }
        let _ = fs::remove_dir(&library_dir);
    }
    Ok(())
}
