use tempfile::TempDir;
use cdnvend::cache::MetadataCache;
use cdnvend::config::Config;
use cdnvend::downloader::{delete_version, download_version, DownloadOutcome};
use cdnvend::index::local_libs;
use cdnvend::metadata::{AssetVersion, LibraryMetadata};

fn setup_cache(dir: &TempDir) -> MetadataCache {
    let mut config = Config::default();
    config.vendor_dir = Some(dir.path().to_path_buf());
    // closed port: any network access fails fast instead of hitting cdnjs
    config.api_url = "http://127.0.0.1:9".to_string();
    config.cdn_url = "http://127.0.0.1:9".to_string();
    MetadataCache::new(&config).unwrap()
}

fn jquery_metadata() -> LibraryMetadata {
    LibraryMetadata {
        name: "jquery".to_string(),
        version: Some("3.6.0".to_string()),
        description: Some("JavaScript library for DOM operations".to_string()),
        assets: vec![
            AssetVersion {
                version: "3.6.0".to_string(),
                files: vec!["jquery.js".to_string(), "jquery.min.js".to_string()],
            },
            AssetVersion {
                version: "3.5.1".to_string(),
                files: vec!["jquery.js".to_string()],
            },
        ],
        ..Default::default()
    }
}

fn stage_all_files(cache: &MetadataCache, library: &str, version: &str, files: &[&str]) {
    let staging = cache.paths().staging_dir(library, version);
    for file in files {
        let dest = staging.join(file);
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(dest, "content").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_promotes_and_indexes() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        cache.put("jquery", jquery_metadata());
        stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js", "jquery.min.js"]);

        let outcome = download_version(&mut cache, "jquery", "3.6.0", false).unwrap();
        assert_eq!(outcome, DownloadOutcome::Completed);

        assert!(cache.is_installed_locally("jquery", Some("3.6.0")));
        assert!(dir.path().join("jquery/3.6.0/jquery.min.js").exists());
        assert!(!cache.paths().staging_dir("jquery", "3.6.0").exists());

        let index = local_libs(cache.paths(), true).unwrap();
        assert_eq!(index["jquery"], vec!["3.6.0"]);
    }

    #[test]
    fn test_incomplete_download_keeps_staging_and_counts() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        cache.put("jquery", jquery_metadata());
        stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js"]);

        let outcome = download_version(&mut cache, "jquery", "3.6.0", false).unwrap();
        assert_eq!(outcome, DownloadOutcome::Incomplete { missing: 1, total: 2 });
        assert!(!cache.is_installed_locally("jquery", Some("3.6.0")));
        assert!(cache.paths().staging_dir("jquery", "3.6.0").join("jquery.js").exists());

        // the metadata was persisted before the download, so the library is
        // already visible as known
        assert!(cache.paths().info_file("jquery").exists());
    }

    #[test]
    fn test_repeated_download_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        cache.put("jquery", jquery_metadata());
        stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js", "jquery.min.js"]);

        assert_eq!(
            download_version(&mut cache, "jquery", "3.6.0", false).unwrap(),
            DownloadOutcome::Completed
        );
        assert_eq!(
            download_version(&mut cache, "jquery", "3.6.0", false).unwrap(),
            DownloadOutcome::AlreadyInstalled
        );
    }

    #[test]
    fn test_nested_asset_paths_are_created() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        let meta = LibraryMetadata {
            name: "bootstrap".to_string(),
            version: Some("5.2.0".to_string()),
            assets: vec![AssetVersion {
                version: "5.2.0".to_string(),
                files: vec!["css/bootstrap.min.css".to_string(), "js/bootstrap.min.js".to_string()],
            }],
            ..Default::default()
        };
        cache.put("bootstrap", meta);
        stage_all_files(&cache, "bootstrap", "5.2.0", &["css/bootstrap.min.css", "js/bootstrap.min.js"]);

        let outcome = download_version(&mut cache, "bootstrap", "5.2.0", false).unwrap();
        assert_eq!(outcome, DownloadOutcome::Completed);
        assert!(dir.path().join("bootstrap/5.2.0/css/bootstrap.min.css").exists());
    }

    #[test]
    fn test_delete_last_version_forgets_library() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        cache.put("jquery", jquery_metadata());
        stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js", "jquery.min.js"]);
        download_version(&mut cache, "jquery", "3.6.0", false).unwrap();

        assert!(delete_version(cache.paths(), "jquery", "3.6.0").unwrap());
        assert!(!cache.paths().info_file("jquery").exists());
        assert!(local_libs(cache.paths(), true).is_none());
    }

    #[test]
    fn test_two_versions_listed_descending() {
        let dir = TempDir::new().unwrap();
        let mut cache = setup_cache(&dir);
        cache.put("jquery", jquery_metadata());
        stage_all_files(&cache, "jquery", "3.5.1", &["jquery.js"]);
        download_version(&mut cache, "jquery", "3.5.1", false).unwrap();
        stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js", "jquery.min.js"]);
        download_version(&mut cache, "jquery", "3.6.0", false).unwrap();

        let index = local_libs(cache.paths(), false).unwrap();
        assert_eq!(index["jquery"], vec!["3.6.0", "3.5.1"]);
    }

    #[test]
    fn test_cache_entry_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = setup_cache(&dir);
            cache.put("jquery", jquery_metadata());
            stage_all_files(&cache, "jquery", "3.6.0", &["jquery.js", "jquery.min.js"]);
            download_version(&mut cache, "jquery", "3.6.0", false).unwrap();
        }

        // a second process run reads the persisted entry, no registry needed
        let mut cache = setup_cache(&dir);
        assert_eq!(cache.latest_version("jquery"), Some("3.6.0".to_string()));
        assert_eq!(
            cache.description("jquery"),
            Some("JavaScript library for DOM operations".to_string())
        );
        assert_eq!(
            cache.asset_files("jquery", None).unwrap(),
            vec!["jquery.js".to_string(), "jquery.min.js".to_string()]
        );
    }
}
