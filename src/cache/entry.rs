//! Cache key, entry and sidecar record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Identity of a cached archive: `(provider, name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Provider name the template was resolved with.
    pub provider: String,
    /// Sanitized template name.
    pub name: String,
    /// Template version, if the provider reported one.
    pub version: Option<String>,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(
        provider: impl Into<String>,
        name: impl Into<String>,
        version: Option<impl Into<String>>,
    ) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
            version: version.map(Into::into),
        }
    }

    /// Path of the archive relative to the cache root:
    /// `<provider>/<name>/<version-or-name>.tar.gz`.
    pub fn relative_path(&self) -> PathBuf {
        let stem = self.version.as_deref().unwrap_or(&self.name);
        PathBuf::from(path_segment(&self.provider))
            .join(path_segment(&self.name))
            .join(format!("{}.tar.gz", path_segment(stem)))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}@{}", self.provider, self.name, version),
            None => write!(f, "{}:{}", self.provider, self.name),
        }
    }
}

/// Make a key component safe to use as a single path segment.
fn path_segment(component: &str) -> String {
    let segment: String = component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect();

    if segment.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        segment
    }
}

/// Sidecar record stored next to a cached archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Entity tag last seen for the archive URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// When the archive was downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    /// Archive size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
    /// Hex SHA-256 of the archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl CacheRecord {
    /// Create a record for a freshly downloaded archive.
    pub fn downloaded(etag: Option<String>, size_bytes: u64, sha256: String) -> Self {
        Self {
            etag,
            cached_at: Some(Utc::now()),
            size_bytes,
            sha256: Some(sha256),
        }
    }
}

/// On-disk location of one cached archive and its sidecar.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry belongs to.
    pub key: CacheKey,
    /// Path to the archive bytes.
    pub archive_path: PathBuf,
    /// Path to the sidecar record (`<archive>.json`).
    pub record_path: PathBuf,
}

impl CacheEntry {
    /// Create an entry rooted at `root`.
    pub fn new(root: &Path, key: CacheKey) -> Self {
        let archive_path = root.join(key.relative_path());
        let mut record_name = archive_path.as_os_str().to_os_string();
        record_name.push(".json");
        Self {
            key,
            archive_path,
            record_path: PathBuf::from(record_name),
        }
    }

    /// Check whether the archive file exists.
    pub fn exists(&self) -> bool {
        self.archive_path.is_file()
    }

    /// Read the sidecar record.
    ///
    /// A missing or unreadable sidecar reads as an empty record, which never
    /// matches a remote entity tag.
    pub fn load_record(&self) -> CacheRecord {
        fs::read_to_string(&self.record_path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn relative_path_uses_version() {
        let key = CacheKey::new("github", "unjs-template", Some("v1.2.0"));
        assert_eq!(
            key.relative_path(),
            PathBuf::from("github/unjs-template/v1.2.0.tar.gz")
        );
    }

    #[test]
    fn relative_path_falls_back_to_name() {
        let key = CacheKey::new("registry", "nuxt", None::<String>);
        assert_eq!(key.relative_path(), PathBuf::from("registry/nuxt/nuxt.tar.gz"));
    }

    #[test]
    fn slashes_in_version_stay_in_one_segment() {
        let key = CacheKey::new("github", "org-repo", Some("ref/ABC-123"));
        assert_eq!(
            key.relative_path(),
            PathBuf::from("github/org-repo/ref-ABC-123.tar.gz")
        );
    }

    #[test]
    fn dot_segments_are_neutralized() {
        let key = CacheKey::new("..", "x", Some("../../etc"));
        let path = key.relative_path();
        assert!(!path.components().any(|c| c == std::path::Component::ParentDir));
    }

    #[test]
    fn same_key_same_path() {
        let a = CacheKey::new("gh", "a", Some("main"));
        let b = CacheKey::new("gh", "a", Some("main"));
        assert_eq!(a.relative_path(), b.relative_path());
        assert_ne!(
            a.relative_path(),
            CacheKey::new("gh", "a", Some("dev")).relative_path()
        );
    }

    #[test]
    fn record_path_is_sidecar() {
        let temp = TempDir::new().unwrap();
        let entry = CacheEntry::new(temp.path(), CacheKey::new("gh", "a", Some("main")));
        assert!(entry.record_path.ends_with("main.tar.gz.json"));
    }

    #[test]
    fn unreadable_record_is_empty() {
        let temp = TempDir::new().unwrap();
        let entry = CacheEntry::new(temp.path(), CacheKey::new("gh", "a", Some("main")));
        fs::create_dir_all(entry.record_path.parent().unwrap()).unwrap();
        fs::write(&entry.record_path, "garbage").unwrap();

        assert_eq!(entry.load_record(), CacheRecord::default());
    }

    #[test]
    fn record_reads_etag_only_document() {
        let record: CacheRecord = serde_json::from_str(r#"{"etag":"\"abc\""}"#).unwrap();
        assert_eq!(record.etag.as_deref(), Some("\"abc\""));
        assert_eq!(record.sha256, None);
    }

    #[test]
    fn display_includes_version() {
        assert_eq!(CacheKey::new("gh", "a", Some("v1")).to_string(), "gh:a@v1");
        assert_eq!(CacheKey::new("gh", "a", None::<String>).to_string(), "gh:a");
    }
}
