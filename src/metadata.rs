use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one library as served by the registry API.
///
/// This is the canonical shape: the registry response is normalized once at
/// decode time (string-or-object `author`, the mixed `license`/`licenses`
/// fields), so downstream code never branches on the wire shape. Every field
/// except `name` may be absent in the response and defaults to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryMetadata {
    /// The registry name of the library.
    #[serde(default)]
    pub name: String,
    /// The latest published version.
    #[serde(default)]
    pub version: Option<String>,
    /// The canonical main file of the library, e.g. `jquery.min.js`.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "de_author")]
    pub author: Option<Author>,
    /// Older registry entries use a `licenses` list, newer ones a single
    /// `license`. Both are folded into `licenses` by [`normalize`].
    ///
    /// [`normalize`]: LibraryMetadata::normalize
    #[serde(default, deserialize_with = "de_licenses", skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    /// Raw `license` field of the response; empty after [`normalize`].
    ///
    /// [`normalize`]: LibraryMetadata::normalize
    #[serde(
        default,
        rename = "license",
        deserialize_with = "de_licenses",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub license: Vec<String>,
    /// All published versions with their file lists, in API order.
    #[serde(default)]
    pub assets: Vec<AssetVersion>,
}

/// One published version of a library and its relative asset file paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Author of a library; the registry serves either a plain name string or
/// an object with `name` and `url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl LibraryMetadata {
    /// Folds the legacy `license` field into `licenses`.
    ///
    /// Call once right after decoding; afterwards `licenses` is the single
    /// source of truth.
    pub fn normalize(mut self) -> Self {
        self.licenses.append(&mut self.license);
        self
    }

    /// Returns the latest published version, if the registry reported one.
    pub fn latest_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the relative asset file paths of one version.
    ///
    /// The version is matched by exact string comparison against the asset
    /// list; the first match wins. Returns `None` if no entry matches.
    pub fn asset_files(&self, version: &str) -> Option<&[String]> {
        self.assets
            .iter()
            .find(|asset| asset.version == version)
            .map(|asset| asset.files.as_slice())
    }

    /// Returns up to `max` version strings in API order (all when `None`).
    pub fn versions(&self, max: Option<usize>) -> Vec<String> {
        let iter = self.assets.iter().map(|asset| asset.version.clone());
        match max {
            Some(max) => iter.take(max).collect(),
            None => iter.collect(),
        }
    }
}

fn de_author<'de, D>(deserializer: D) -> Result<Option<Author>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Detailed {
            name: String,
            #[serde(default)]
            url: Option<String>,
        },
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(name)) => Some(Author { name, url: None }),
        Some(Raw::Detailed { name, url }) => Some(Author { name, url }),
        _ => None,
    })
}

fn de_licenses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawEntry {
        Name(String),
        Detailed {
            #[serde(rename = "type")]
            name: String,
        },
        Other(serde_json::Value),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(RawEntry),
        Many(Vec<RawEntry>),
    }

    let entries = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::One(entry)) => vec![entry],
        Some(Raw::Many(entries)) => entries,
        None => vec![],
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            RawEntry::Name(name) | RawEntry::Detailed { name } => Some(name),
            RawEntry::Other(_) => None,
        })
        .collect())
}

/// Result of a registry search request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
}

/// One library matched by a registry search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> LibraryMetadata {
        let meta: LibraryMetadata = serde_json::from_str(json).unwrap();
        meta.normalize()
    }

    #[test]
    fn test_decode_full_document() {
        let meta = decode(
            r#"{
                "name": "jquery",
                "version": "3.6.0",
                "filename": "jquery.min.js",
                "description": "JavaScript library for DOM operations",
                "homepage": "https://jquery.com",
                "keywords": ["jquery", "library"],
                "author": {"name": "jQuery Foundation", "url": "https://jquery.org"},
                "license": "MIT",
                "assets": [
                    {"version": "3.6.0", "files": ["jquery.js", "jquery.min.js"]},
                    {"version": "3.5.1", "files": ["jquery.js"]}
                ]
            }"#,
        );
        assert_eq!(meta.name, "jquery");
        assert_eq!(meta.latest_version(), Some("3.6.0"));
        assert_eq!(meta.author.as_ref().unwrap().name, "jQuery Foundation");
        assert_eq!(meta.licenses, vec!["MIT"]);
        assert_eq!(
            meta.asset_files("3.6.0").unwrap(),
            &["jquery.js".to_string(), "jquery.min.js".to_string()]
        );
    }

    #[test]
    fn test_author_as_plain_string() {
        let meta = decode(r#"{"name": "lodash", "author": "John-David Dalton"}"#);
        assert_eq!(
            meta.author,
            Some(Author { name: "John-David Dalton".to_string(), url: None })
        );
    }

    #[test]
    fn test_author_null_is_absent() {
        let meta = decode(r#"{"name": "lodash", "author": null}"#);
        assert!(meta.author.is_none());
    }

    #[test]
    fn test_licenses_merge_both_fields() {
        let meta = decode(
            r#"{
                "name": "old-lib",
                "licenses": [{"type": "Apache-2.0", "url": "https://example.org"}],
                "license": "MIT"
            }"#,
        );
        assert_eq!(meta.licenses, vec!["Apache-2.0", "MIT"]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let meta = decode(r#"{"name": "tiny"}"#);
        assert!(meta.latest_version().is_none());
        assert!(meta.keywords.is_empty());
        assert!(meta.licenses.is_empty());
        assert!(meta.asset_files("1.0.0").is_none());
    }

    #[test]
    fn test_asset_files_exact_match_only() {
        let meta = decode(
            r#"{"name": "x", "assets": [{"version": "1.10", "files": ["a.js"]}]}"#,
        );
        assert!(meta.asset_files("1.1").is_none());
        assert!(meta.asset_files("1.10").is_some());
    }

    #[test]
    fn test_versions_capped() {
        let meta = decode(
            r#"{"name": "x", "assets": [
                {"version": "3.0.0", "files": []},
                {"version": "2.0.0", "files": []},
                {"version": "1.0.0", "files": []}
            ]}"#,
        );
        assert_eq!(meta.versions(None).len(), 3);
        assert_eq!(meta.versions(Some(2)), vec!["3.0.0", "2.0.0"]);
    }
}
