use std::path::{Path, PathBuf};
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

/// Suffix of a staging directory holding a partial download.
/// A directory carrying this suffix is never a completed install.
pub const STAGING_SUFFIX: &str = "_in_progress";

/// File name of the per-library metadata cache entry.
pub const INFO_FILE: &str = ".info_cdnvend.json";

/// File name of the aggregate local-library index.
pub const INDEX_FILE: &str = ".info_all_libs_cdnvend.json";

/// Path helpers for the local vendor tree.
///
/// The tree is laid out as `<root>/<library>/<version>/<asset files...>`,
/// with the metadata cache entry next to the version directories and the
/// aggregate index at the root.
#[derive(Debug, Clone)]
pub struct VendorPaths {
    root: PathBuf,
}

impl VendorPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the vendor root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Returns the directory of a library, e.g. `<root>/jquery`.
    pub fn library_dir(&self, library: &str) -> PathBuf {
        self.root.join(library)
    }

    /// Returns the install directory of one library version,
    /// e.g. `<root>/jquery/3.6.0`.
    pub fn version_dir(&self, library: &str, version: &str) -> PathBuf {
        self.library_dir(library).join(version)
    }

    /// Returns the staging directory for a version download,
    /// e.g. `<root>/jquery/3.6.0_in_progress`.
    pub fn staging_dir(&self, library: &str, version: &str) -> PathBuf {
        self.library_dir(library).join(format!("{version}{STAGING_SUFFIX}"))
    }

    /// Returns the path of a library's metadata cache entry file.
    pub fn info_file(&self, library: &str) -> PathBuf {
        self.library_dir(library).join(INFO_FILE)
    }

    /// Returns the path of the aggregate local-library index file.
    pub fn index_file(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
}

/// Returns the default vendor root inside the user's data directory.
pub fn default_vendor_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "cdnvend", "cdnvend")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.data_dir().join("vendor"))
}
