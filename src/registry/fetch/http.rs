//! HTTP archive and metadata fetching.
//!
//! Provides a blocking HTTP client for downloading template archives to
//! disk, probing entity tags with `HEAD`, and reading registry documents.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Request headers, already normalized with [`normalize_headers`].
pub type Headers = BTreeMap<String, String>;

/// Fetches archives and documents over HTTP/HTTPS.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

/// Response metadata from downloading an archive.
#[derive(Debug)]
pub struct FetchResponse {
    /// ETag header if present.
    pub etag: Option<String>,
    /// Number of bytes written to disk.
    pub size_bytes: u64,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default 30-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("gitit/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Probe a URL with `HEAD` and return its entity tag.
    ///
    /// Returns `Ok(None)` when the origin answers without an ETag.
    pub fn probe_etag(&self, url: &str, headers: &Headers) -> Result<Option<String>> {
        let response = with_headers(self.client.head(url), headers)
            .send()
            .with_context(|| format!("HEAD {} failed", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} probing {}", response.status(), url);
        }

        Ok(header_value(&response, "etag"))
    }

    /// Download a URL into `dest`.
    ///
    /// The body is streamed into a uniquely named temporary file next to
    /// `dest`, which is persisted over `dest` only after the transfer
    /// completes. Concurrent downloads of the same artifact each get their
    /// own temporary file, and a failed transfer removes its file on drop.
    pub fn download(&self, url: &str, headers: &Headers, dest: &Path) -> Result<FetchResponse> {
        let mut response = with_headers(self.client.get(url), headers)
            .send()
            .with_context(|| format!("GET {} failed", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let etag = header_value(&response, "etag");

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut partial = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        let size_bytes = {
            let mut writer = BufWriter::new(partial.as_file_mut());
            let written = response
                .copy_to(&mut writer)
                .with_context(|| format!("Failed to read response body from {}", url))?;
            writer.flush()?;
            written
        };

        partial
            .persist(dest)
            .with_context(|| format!("Failed to move download into {}", dest.display()))?;

        Ok(FetchResponse { etag, size_bytes })
    }

    /// Fetch and deserialize a JSON document.
    pub fn fetch_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        let response = with_headers(self.client.get(url), headers)
            .send()
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            bail!("HTTP {} fetching {}", status, url);
        }

        response
            .json()
            .with_context(|| format!("Invalid JSON document at {}", url))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case header names and drop headers without a value.
pub fn normalize_headers<'a, I>(headers: I) -> Headers
where
    I: IntoIterator<Item = (&'a String, &'a Option<String>)>,
{
    headers
        .into_iter()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Some((key.to_lowercase(), v.to_string())),
            _ => None,
        })
        .collect()
}

/// Build the `authorization` header for a bearer token, if any.
pub fn bearer_header(auth: Option<&str>) -> Headers {
    let mut headers = Headers::new();
    if let Some(token) = auth.filter(|t| !t.is_empty()) {
        headers.insert("authorization".to_string(), format!("Bearer {}", token));
    }
    headers
}

fn with_headers(mut request: RequestBuilder, headers: &Headers) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
