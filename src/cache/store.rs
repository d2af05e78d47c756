//! Cache storage implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::entry::{CacheEntry, CacheKey, CacheRecord};

/// On-disk store of downloaded template archives.
///
/// Layout: `<root>/<provider>/<name>/<version>.tar.gz` with a
/// `<version>.tar.gz.json` sidecar next to each archive.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory for cache.
    root: PathBuf,
}

impl CacheStore {
    /// Create a new cache store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the entry for a key. Nothing is created on disk.
    pub fn entry(&self, key: &CacheKey) -> CacheEntry {
        CacheEntry::new(&self.root, key.clone())
    }

    /// Create the directory an entry's files live in.
    pub fn prepare(&self, entry: &CacheEntry) -> Result<()> {
        if let Some(parent) = entry.archive_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {:?}", parent))?;
        }
        Ok(())
    }

    /// Write an entry's sidecar record.
    ///
    /// The record is written to a temporary file and persisted over the
    /// sidecar, so readers never observe a half-written record.
    pub fn save_record(&self, entry: &CacheEntry, record: &CacheRecord) -> Result<()> {
        let dir = entry.record_path.parent().unwrap_or(self.root.as_path());
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        serde_json::to_writer_pretty(&mut file, record)?;
        file.persist(&entry.record_path)
            .with_context(|| format!("Failed to write cache record {:?}", entry.record_path))?;
        Ok(())
    }
}
