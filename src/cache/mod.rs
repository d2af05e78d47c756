//! Template archive cache.
//!
//! Archives are stored per `(provider, name, version)` with a JSON sidecar
//! recording the entity tag, download time, size and SHA-256 digest.
//! Reuse is decided by `HEAD` revalidation against the recorded entity tag.

pub mod entry;
pub mod revalidation;
pub mod store;
pub mod validation;

pub use entry::{CacheEntry, CacheKey, CacheRecord};
pub use revalidation::{CachePolicy, CacheRevalidator, CachedArchive, FetchOutcome};
pub use store::CacheStore;
pub use validation::{sha256_file, validate, ValidationResult};

/// Get the default cache directory.
///
/// Uses the platform cache directory (`$XDG_CACHE_HOME` or `~/.cache` on
/// Linux), falling back to the system temporary directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gitit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_dir_valid() {
        let path = default_cache_dir();
        assert!(path.ends_with("gitit"));
    }
}
