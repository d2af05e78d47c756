//! Conditional archive fetching backed by the cache store.
//!
//! Before downloading, the archive URL is probed with `HEAD`. When the
//! returned entity tag equals the one recorded in the sidecar and the
//! cached archive is intact, the download is skipped. A failed download
//! falls back to an intact cached copy when there is one.

use std::time::Instant;

use super::entry::{CacheEntry, CacheKey, CacheRecord};
use super::store::CacheStore;
use super::validation::{sha256_file, validate};
use crate::error::{GititError, Result};
use crate::registry::fetch::{Headers, HttpFetcher};

/// How the network may be used for a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Revalidate against the origin and download on change.
    #[default]
    Online,
    /// Never touch the network.
    Offline,
    /// Use a cached archive without revalidating if one exists.
    PreferOffline,
}

impl CachePolicy {
    /// Pick a policy from the `offline` and `prefer_offline` flags.
    ///
    /// `offline` wins when both are set.
    pub fn from_flags(offline: bool, prefer_offline: bool) -> Self {
        if offline {
            Self::Offline
        } else if prefer_offline {
            Self::PreferOffline
        } else {
            Self::Online
        }
    }
}

/// How an archive ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The archive was downloaded.
    Downloaded,
    /// The origin's entity tag matched; the cached archive was kept.
    NotModified,
    /// The cached archive was used without contacting the origin.
    Cached,
    /// The download failed and the cached archive was used instead.
    Stale,
}

/// A cached archive ready for extraction.
#[derive(Debug, Clone)]
pub struct CachedArchive {
    /// Cache entry holding the archive.
    pub entry: CacheEntry,
    /// How the archive was obtained.
    pub outcome: FetchOutcome,
}

/// Fetches archives into a [`CacheStore`], revalidating with entity tags.
pub struct CacheRevalidator<'a> {
    store: &'a CacheStore,
    http: &'a HttpFetcher,
}

impl<'a> CacheRevalidator<'a> {
    /// Create a new revalidator.
    pub fn new(store: &'a CacheStore, http: &'a HttpFetcher) -> Self {
        Self { store, http }
    }

    /// Ensure the archive at `url` is cached under `key`.
    ///
    /// On success the returned entry's archive exists and has passed the
    /// integrity check if it was not downloaded during this call.
    pub fn fetch(
        &self,
        url: &str,
        key: &CacheKey,
        headers: &Headers,
        policy: CachePolicy,
    ) -> Result<CachedArchive> {
        let entry = self.store.entry(key);

        match policy {
            CachePolicy::Offline => {
                return if self.usable(&entry) {
                    tracing::debug!("Offline: using cached {}", key);
                    Ok(cached(entry, FetchOutcome::Cached))
                } else {
                    Err(GititError::Fetch {
                        url: url.to_string(),
                        message: format!(
                            "Tarball not found in cache ({}) and offline mode is enabled",
                            entry.archive_path.display()
                        ),
                    })
                };
            }
            CachePolicy::PreferOffline if self.usable(&entry) => {
                tracing::debug!("Prefer offline: using cached {}", key);
                return Ok(cached(entry, FetchOutcome::Cached));
            }
            CachePolicy::PreferOffline | CachePolicy::Online => {}
        }

        self.store.prepare(&entry)?;
        let record = entry.load_record();

        let remote_etag = match self.http.probe_etag(url, headers) {
            Ok(etag) => etag,
            Err(e) => {
                tracing::debug!("Skipping revalidation of {}: {:#}", url, e);
                None
            }
        };

        if let (Some(remote), Some(local)) = (&remote_etag, &record.etag) {
            if remote == local && validate(&entry, &record).is_usable() {
                tracing::debug!("{} not modified (etag {})", url, remote);
                return Ok(cached(entry, FetchOutcome::NotModified));
            }
        }

        let start = Instant::now();
        match self.download(url, headers, &entry, remote_etag) {
            Ok(()) => {
                tracing::debug!(
                    "Downloaded {} to {} in {:?}",
                    url,
                    entry.archive_path.display(),
                    start.elapsed()
                );
                Ok(cached(entry, FetchOutcome::Downloaded))
            }
            Err(e) if self.usable(&entry) => {
                tracing::warn!(
                    "Failed to download {}, using cached archive: {:#}",
                    url,
                    e
                );
                Ok(cached(entry, FetchOutcome::Stale))
            }
            Err(e) => Err(GititError::Fetch {
                url: url.to_string(),
                message: format!("{:#}", e),
            }),
        }
    }

    /// Download the archive, then record its metadata.
    ///
    /// The archive is in place before the sidecar is written, so a sidecar
    /// never describes bytes that are not on disk.
    fn download(
        &self,
        url: &str,
        headers: &Headers,
        entry: &CacheEntry,
        probed_etag: Option<String>,
    ) -> anyhow::Result<()> {
        let response = self.http.download(url, headers, &entry.archive_path)?;
        let sha256 = sha256_file(&entry.archive_path)?;
        let record =
            CacheRecord::downloaded(probed_etag.or(response.etag), response.size_bytes, sha256);
        self.store.save_record(entry, &record)
    }

    fn usable(&self, entry: &CacheEntry) -> bool {
        validate(entry, &entry.load_record()).is_usable()
    }
}

fn cached(entry: CacheEntry, outcome: FetchOutcome) -> CachedArchive {
    CachedArchive { entry, outcome }
}
