//! Integrity checks for cached archives.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::entry::{CacheEntry, CacheRecord};

/// Result of checking a cached archive against its sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Archive digest matches the recorded one.
    Intact,
    /// No digest was recorded, so the archive cannot be checked.
    Unverified,
    /// Archive digest differs from the recorded one.
    Corrupt,
    /// Archive file does not exist.
    NotFound,
}

impl ValidationResult {
    /// Whether the archive may be handed to extraction.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Intact | Self::Unverified)
    }
}

/// Compute the hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {:?} for hashing", path))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("Failed to read {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check a cached archive against the digest in its sidecar record.
pub fn validate(entry: &CacheEntry, record: &CacheRecord) -> ValidationResult {
    if !entry.exists() {
        return ValidationResult::NotFound;
    }

    let Some(expected) = record.sha256.as_deref() else {
        return ValidationResult::Unverified;
    };

    match sha256_file(&entry.archive_path) {
        Ok(actual) if actual.eq_ignore_ascii_case(expected) => ValidationResult::Intact,
        Ok(actual) => {
            tracing::warn!(
                "Cached archive {:?} is corrupt (expected sha256 {}, found {})",
                entry.archive_path,
                expected,
                actual
            );
            ValidationResult::Corrupt
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            ValidationResult::Corrupt
        }
    }
}
