use std::collections::HashMap;
use std::time::Duration;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use crate::config::Config;
use crate::metadata::{Author, LibraryMetadata, SearchResults};
use crate::paths::VendorPaths;

/// Metadata cache for registry libraries.
///
/// Resolution order for [`get_metadata`]: the in-memory map (at most one
/// fetch per library per process run), then the on-disk cache entry if it is
/// younger than the TTL, then a single remote request to the registry API.
/// Remote and not-found failures degrade to `None`; only filesystem errors
/// on explicit writes surface as errors.
///
/// [`get_metadata`]: MetadataCache::get_metadata
pub struct MetadataCache {
    paths: VendorPaths,
    api_url: String,
    cdn_url: String,
    ttl: Duration,
    client: Client,
    libs: HashMap<String, LibraryMetadata>,
}

impl MetadataCache {
    /// Builds a cache over the vendor tree described by `config`.
    ///
    /// # Errors
    /// Returns an error if the vendor root cannot be resolved or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let vendor_dir = config.resolve_vendor_dir()?;
        let client = Client::builder()
            .user_agent(concat!("cdnvend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            paths: VendorPaths::new(vendor_dir),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            cdn_url: config.cdn_url.trim_end_matches('/').to_string(),
            ttl: Duration::from_secs(config.ttl_secs),
            client,
            libs: HashMap::new(),
        })
    }

    pub fn paths(&self) -> &VendorPaths {
        &self.paths
    }

    pub fn cdn_url(&self) -> &str {
        &self.cdn_url
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the metadata of a library, fetching it at most once.
    ///
    /// With `force_refresh` the on-disk entry is ignored and the registry is
    /// asked again even if the library is already in memory. A freshly
    /// fetched document is persisted to the cache entry file only when the
    /// library is already installed locally, so metadata of libraries the
    /// user never downloads does not accumulate on disk.
    ///
    /// Returns `None` when neither cache nor registry yields a document
    /// (unknown library, network failure, malformed response). No retries.
    /// A forced refresh discards the in-memory entry up front, so a failed
    /// refetch does not silently fall back to the discarded document.
    pub fn get_metadata(&mut self, library: &str, force_refresh: bool) -> Option<&LibraryMetadata> {
        if force_refresh {
            self.invalidate(library);
        }
        if !self.libs.contains_key(library) {
            let mut meta = if force_refresh { None } else { self.load_cache_entry(library) };
            let mut fetched_remote = false;
            if meta.is_none() {
                meta = self.fetch_remote(library);
                fetched_remote = meta.is_some();
            }
            let meta = meta?;
            if fetched_remote && self.is_installed_locally(library, None) {
                if let Err(err) = self.write_cache_entry(library, &meta) {
                    eprintln!("warning: could not write cache entry for {library}: {err}");
                }
            }
            self.libs.insert(library.to_string(), meta);
        }
        self.libs.get(library)
    }

    /// Stores a metadata document directly in the in-memory map.
    pub fn put(&mut self, library: &str, meta: LibraryMetadata) {
        self.libs.insert(library.to_string(), meta);
    }

    /// Drops the in-memory entry of a library, forcing the next
    /// [`get_metadata`](Self::get_metadata) to go back to disk or registry.
    pub fn invalidate(&mut self, library: &str) {
        self.libs.remove(library);
    }

    /// Returns the relative asset file paths of a library version.
    ///
    /// Without an explicit version the latest published version is used.
    /// Matching is an exact string comparison; there is no semver ordering.
    pub fn asset_files(&mut self, library: &str, version: Option<&str>) -> Option<Vec<String>> {
        let version = match version {
            Some(version) => version.to_string(),
            None => self.latest_version(library)?,
        };
        self.get_metadata(library, false)?
            .asset_files(&version)
            .map(|files| files.to_vec())
    }

    /// Returns the latest published version of a library.
    pub fn latest_version(&mut self, library: &str) -> Option<String> {
        self.get_metadata(library, false)?
            .latest_version()
            .map(str::to_string)
    }

    /// Returns up to `max` published versions of a library, in API order.
    pub fn versions(&mut self, library: &str, max: Option<usize>) -> Vec<String> {
        self.get_metadata(library, false)
            .map(|meta| meta.versions(max))
            .unwrap_or_default()
    }

    pub fn author(&mut self, library: &str) -> Option<Author> {
        self.get_metadata(library, false)?.author.clone()
    }

    pub fn description(&mut self, library: &str) -> Option<String> {
        self.get_metadata(library, false)?.description.clone()
    }

    pub fn filename(&mut self, library: &str) -> Option<String> {
        self.get_metadata(library, false)?.filename.clone()
    }

    pub fn homepage(&mut self, library: &str) -> Option<String> {
        self.get_metadata(library, false)?.homepage.clone()
    }

    pub fn keywords(&mut self, library: &str) -> Vec<String> {
        self.get_metadata(library, false)
            .map(|meta| meta.keywords.clone())
            .unwrap_or_default()
    }

    pub fn licenses(&mut self, library: &str) -> Vec<String> {
        self.get_metadata(library, false)
            .map(|meta| meta.licenses.clone())
            .unwrap_or_default()
    }

    pub fn library_name(&mut self, library: &str) -> Option<String> {
        let name = &self.get_metadata(library, false)?.name;
        if name.is_empty() { None } else { Some(name.clone()) }
    }

    /// Checks whether a library (or one specific version of it) has been
    /// downloaded into the vendor tree. Directory presence only; contents
    /// are not validated.
    pub fn is_installed_locally(&self, library: &str, version: Option<&str>) -> bool {
        match version {
            Some(version) => self.paths.version_dir(library, version).is_dir(),
            None => self.paths.library_dir(library).is_dir(),
        }
    }

    /// Searches the registry for libraries matching `query`.
    ///
    /// One remote request, no local caching.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response can't be decoded.
    pub fn search(&self, query: &str) -> Result<SearchResults> {
        let url = format!("{}/libraries/", self.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[("search", query), ("fields", "version,description")])
            .send()?
            .error_for_status()?;
        response
            .json::<SearchResults>()
            .with_context(|| format!("Malformed search response for '{query}'"))
    }

    /// Writes the in-memory metadata of a library to its cache entry file.
    pub(crate) fn persist_metadata(&self, library: &str) -> Result<()> {
        let meta = self
            .libs
            .get(library)
            .with_context(|| format!("No metadata loaded for {library}"))?;
        self.write_cache_entry(library, meta)
    }

    fn write_cache_entry(&self, library: &str, meta: &LibraryMetadata) -> Result<()> {
        let info_file = self.paths.info_file(library);
        if let Some(parent) = info_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create library dir {parent:?}"))?;
        }
        let content = serde_json::to_string(meta)?;
        std::fs::write(&info_file, content)
            .with_context(|| format!("Could not write cache entry {info_file:?}"))?;
        Ok(())
    }

    /// Reads the on-disk cache entry if it is younger than the TTL.
    fn load_cache_entry(&self, library: &str) -> Option<LibraryMetadata> {
        let info_file = self.paths.info_file(library);
        let modified = std::fs::metadata(&info_file).and_then(|m| m.modified()).ok()?;
        let age = modified.elapsed().unwrap_or(Duration::MAX);
        if age >= self.ttl {
            return None;
        }
        let content = std::fs::read_to_string(&info_file).ok()?;
        match serde_json::from_str::<LibraryMetadata>(&content) {
            Ok(meta) => Some(meta.normalize()),
            Err(err) => {
                eprintln!("warning: unreadable cache entry {info_file:?}: {err}");
                None
            }
        }
    }

    /// Issues the single registry request for a library document.
    fn fetch_remote(&self, library: &str) -> Option<LibraryMetadata> {
        let url = format!("{}/libraries/{}", self.api_url, library);
        let response = match self.client.get(&url).send().and_then(|r| r.error_for_status()) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("warning: could not fetch {library} from registry: {err}");
                return None;
            }
        };
        match response.json::<LibraryMetadata>() {
            Ok(meta) => Some(meta.normalize()),
            Err(err) => {
                eprintln!("warning: malformed registry response for {library}: {err}");
                None
            }
        }
    }
}
