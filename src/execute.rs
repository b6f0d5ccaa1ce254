use anyhow::{bail, Result};
use colored::Colorize;
use cdnvend::cache::MetadataCache;
use cdnvend::config::Config;
use cdnvend::downloader::{delete_version, download_version, DownloadOutcome};
use cdnvend::index::{local_libs, rebuild_local_index};
use crate::cli::{CdnvendCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let mut config = Config::load_or_default(std::env::current_dir()?.join("cdnvend.toml"));
    if let Some(vendor_dir) = &cli.vendor_dir {
        config.vendor_dir = Some(vendor_dir.clone());
    }
    match cli.command {
        CdnvendCommand::Init => {
            execute_init(&config)
        }
        CdnvendCommand::Search { query } => {
            execute_search(&config, &query)
        }
        CdnvendCommand::Info { library, refresh } => {
            execute_info(&config, &library, refresh)
        }
        CdnvendCommand::Versions { library, max } => {
            execute_versions(&config, &library, max)
        }
        CdnvendCommand::Assets { library_at_version } => {
            execute_assets(&config, &library_at_version)
        }
        CdnvendCommand::Download { library_at_version, force } => {
            execute_download(&config, &library_at_version, force)
        }
        CdnvendCommand::Delete { library_at_version } => {
            execute_delete(&config, &library_at_version)
        }
        CdnvendCommand::List => {
            execute_list(&config)
        }
        CdnvendCommand::Refresh => {
            execute_refresh(&config)
        }
    }
}

fn extract_name_at_version(library_at_version: &str) -> (String, Option<String>) {
    match library_at_version.split_once('@') {
        Some((name, version)) => (name.to_string(), Some(version.to_string())),
        None => (library_at_version.to_string(), None),
    }
}

pub fn execute_init(config: &Config) -> Result<()> {
    let path = std::env::current_dir()?.join("cdnvend.toml");
    config.save(&path)?;
    let vendor_dir = config.resolve_vendor_dir()?;
    std::fs::create_dir_all(&vendor_dir)?;
    println!("Wrote {}", path.display());
    println!("Vendor directory: {}", vendor_dir.display());
    Ok(())
}

pub fn execute_search(config: &Config, query: &str) -> Result<()> {
    let cache = MetadataCache::new(config)?;
    let found = cache.search(query)?;
    if found.results.is_empty() {
        println!("No libraries found for '{query}'");
        return Ok(());
    }
    for hit in &found.results {
        match &hit.version {
            Some(version) => println!("{}@{}", hit.name.bold(), version),
            None => println!("{}", hit.name.bold()),
        }
        if let Some(description) = &hit.description {
            println!("  {description}");
        }
    }
    println!("{} of {} shown", found.results.len(), found.total);
    Ok(())
}

pub fn execute_info(config: &Config, library: &str, refresh: bool) -> Result<()> {
    let mut cache = MetadataCache::new(config)?;
    if cache.get_metadata(library, refresh).is_none() {
        bail!("No metadata found for '{library}'");
    }
    println!("{}", cache.library_name(library).unwrap_or_else(|| library.to_string()).bold());
    if let Some(version) = cache.latest_version(library) {
        println!("  latest:      {version}");
    }
    if let Some(description) = cache.description(library) {
        println!("  description: {description}");
    }
    if let Some(author) = cache.author(library) {
        match &author.url {
            Some(url) => println!("  author:      {}; {url}", author.name),
            None => println!("  author:      {}", author.name),
        }
    }
    if let Some(homepage) = cache.homepage(library) {
        println!("  homepage:    {homepage}");
    }
    if let Some(filename) = cache.filename(library) {
        println!("  filename:    {filename}");
    }
    let keywords = cache.keywords(library);
    if !keywords.is_empty() {
        println!("  keywords:    {}", keywords.join(", "));
    }
    let licenses = cache.licenses(library);
    if !licenses.is_empty() {
        println!("  licenses:    {}", licenses.join(", "));
    }
    match cache.is_installed_locally(library, None) {
        true => println!("  {}", "installed locally".green()),
        false => println!("  {}", "not installed".yellow()),
    }
    Ok(())
}

pub fn execute_versions(config: &Config, library: &str, max: Option<usize>) -> Result<()> {
    let mut cache = MetadataCache::new(config)?;
    let versions = cache.versions(library, max);
    if versions.is_empty() {
        bail!("No versions found for '{library}'");
    }
    for version in versions {
        match cache.is_installed_locally(library, Some(&version)) {
            true => println!("{library}@{version} {}", "(installed)".green()),
            false => println!("{library}@{version}"),
        }
    }
    Ok(())
}

pub fn execute_assets(config: &Config, library_at_version: &str) -> Result<()> {
    let (library, version) = extract_name_at_version(library_at_version);
    let mut cache = MetadataCache::new(config)?;
    let files = cache
        .asset_files(&library, version.as_deref())
        .ok_or(anyhow::anyhow!("No assets found for '{library_at_version}'"))?;
    for file in files {
        println!("{file}");
    }
    Ok(())
}

pub fn execute_download(config: &Config, library_at_version: &str, force: bool) -> Result<()> {
    let (library, version) = extract_name_at_version(library_at_version);
    let mut cache = MetadataCache::new(config)?;
    let version = match version {
        Some(version) => version,
        None => cache
            .latest_version(&library)
            .ok_or(anyhow::anyhow!("Could not resolve latest version of '{library}'"))?,
    };
    match download_version(&mut cache, &library, &version, force)? {
        DownloadOutcome::AlreadyInstalled => {
            println!("{library}@{version} {}", "is already installed".yellow());
        }
        DownloadOutcome::Completed => {
            println!("{library}@{version} {}", "installed".green());
        }
        DownloadOutcome::Incomplete { missing, total } => {
            let done = total - missing;
            let percent = done * 100 / total;
            println!("{library}@{version}: {done} of {total} files downloaded ({percent}%)");
            println!("{}", "Download incomplete. Run the same command again to resume.".yellow());
        }
    }
    Ok(())
}

pub fn execute_delete(config: &Config, library_at_version: &str) -> Result<()> {
    let (library, version) = extract_name_at_version(library_at_version);
    let version = match version {
        Some(version) => version,
        None => bail!("Expected <name>@<version>, got '{library_at_version}'"),
    };
    let cache = MetadataCache::new(config)?;
    match delete_version(cache.paths(), &library, &version)? {
        true => println!("{library}@{version} {}", "removed".green()),
        false => bail!("Could not remove {library}@{version}"),
    }
    Ok(())
}

pub fn execute_list(config: &Config) -> Result<()> {
    let cache = MetadataCache::new(config)?;
    let index = match local_libs(cache.paths(), false) {
        Some(index) => index,
        None => {
            println!("No libraries installed");
            return Ok(());
        }
    };
    for (library, versions) in &index {
        println!("{}: {}", library.bold(), versions.join(", "));
    }
    Ok(())
}

pub fn execute_refresh(config: &Config) -> Result<()> {
    let cache = MetadataCache::new(config)?;
    let index = rebuild_local_index(cache.paths())?;
    println!("Indexed {} libraries", index.len());
    Ok(())
}
