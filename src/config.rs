use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::paths::default_vendor_dir;

/// Represents the contents of a `cdnvend.toml` file.
///
/// All fields have working defaults, so a missing config file is not an
/// error; `init` writes one for users who want to pin the vendor directory
/// or point at a different registry.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Root of the local vendor tree. Defaults to a per-user data directory.
    pub vendor_dir: Option<PathBuf>,
    /// Base URL of the package registry API.
    pub api_url: String,
    /// Base URL the asset files are downloaded from.
    pub cdn_url: String,
    /// Maximum age of a metadata cache entry, in seconds.
    pub ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor_dir: None,
            api_url: "https://api.cdnjs.com".to_string(),
            cdn_url: "https://cdnjs.cloudflare.com/ajax/libs".to_string(),
            ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Loads a `Config` from a file path.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| e.into())
    }

    /// Loads the config file if it exists, falling back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
        if path.as_ref().exists() {
            Config::load(&path).unwrap_or_default()
        } else {
            Config::default()
        }
    }

    /// Saves the `Config` to the given file path in pretty TOML format.
    ///
    /// # Errors
    /// Returns an error if the file can't be written or serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Returns the configured vendor root, or the per-user default.
    pub fn resolve_vendor_dir(&self) -> Result<PathBuf> {
        match &self.vendor_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_vendor_dir(),
        }
    }
}
