//! Remote JSON template registry.
//!
//! A registry is a directory of `<name>.json` descriptor documents served
//! over HTTP. A local override directory is consulted first so template
//! authors can try a descriptor before publishing it.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::fetch::{bearer_header, HttpFetcher};
use super::resolver::{ProviderContext, TemplateProvider};
use super::template::TemplateDescriptor;

/// Registry used when none is configured.
pub const DEFAULT_REGISTRY: &str = "https://raw.githubusercontent.com/unjs/giget/main/templates";

/// Directory, relative to the working directory, checked for local overrides.
pub const LOCAL_TEMPLATES_DIR: &str = "src/templates";

/// Resolves short template names through a remote JSON registry.
#[derive(Debug, Clone)]
pub struct RegistryProvider {
    endpoint: String,
    local_dir: PathBuf,
    fetcher: HttpFetcher,
}

impl RegistryProvider {
    /// Create a provider for `endpoint`, with local overrides under `cwd`.
    pub fn new(endpoint: impl Into<String>, cwd: &Path, fetcher: HttpFetcher) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            local_dir: cwd.join(LOCAL_TEMPLATES_DIR),
            fetcher,
        }
    }

    /// Load `<name>.json` from the local override directory.
    ///
    /// `Ok(None)` means there is no override file.
    fn load_local(&self, name: &str) -> Result<Option<TemplateDescriptor>> {
        let path = self.local_dir.join(format!("{}.json", name));
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let descriptor: TemplateDescriptor = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        descriptor
            .validate()
            .map_err(|e| anyhow!("Invalid template info from {}: {}", path.display(), e))?;

        Ok(Some(descriptor))
    }

    fn load_remote(&self, name: &str, ctx: &ProviderContext) -> Result<TemplateDescriptor> {
        let url = format!("{}/{}.json", self.endpoint, name);
        let headers = bearer_header(ctx.auth.as_deref());

        let descriptor: TemplateDescriptor = self
            .fetcher
            .fetch_json(&url, &headers)
            .with_context(|| format!("Failed to download {} template info", name))?;

        descriptor
            .validate()
            .map_err(|e| anyhow!("Invalid template info from {}: {}", url, e))?;

        Ok(descriptor)
    }
}

/// Registry names are single path segments.
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        bail!("Invalid template name '{}'", name);
    }
    Ok(())
}

impl TemplateProvider for RegistryProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<TemplateDescriptor> {
        check_name(source)?;
        let start = Instant::now();

        match self.load_local(source) {
            Ok(Some(descriptor)) => {
                tracing::debug!(
                    "Loaded {} template info from {} in {:?}",
                    source,
                    self.local_dir.display(),
                    start.elapsed()
                );
                return Ok(descriptor);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("Ignoring local template {}: {:#}", source, e);
            }
        }

        let descriptor = self.load_remote(source, ctx)?;
        tracing::debug!(
            "Fetched {} template info from {} in {:?}",
            source,
            self.endpoint,
            start.elapsed()
        );
        Ok(descriptor)
    }
}
