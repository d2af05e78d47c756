//! Configuration schema definitions for gitit.
//!
//! The same structure is filled from config files, the environment and
//! command-line flags; layers are combined with [`GititConfig::overlay`].

use crate::cache::default_cache_dir;
use crate::pipeline::{DownloadOptions, RegistrySetting};
use crate::registry::DEFAULT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for a template download. Every field is optional so that an
/// unset field in a higher layer never masks a lower one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GititConfig {
    /// Destination directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Extract into a non-empty directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    /// Remove the destination before extracting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_clean: Option<bool>,

    /// Install dependencies after extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<bool>,

    /// Silence install output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,

    /// Never touch the network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,

    /// Use cached archives without revalidating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_offline: Option<bool>,

    /// Bearer token for private sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Registry endpoint, or `false` to disable the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,

    /// Provider for identifiers without a prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Verbose logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Archive cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

/// `registry:` value. A URL selects an endpoint; a boolean turns the
/// default registry on or off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryConfig {
    /// `true` uses the default registry, `false` disables it.
    Enabled(bool),
    /// Registry endpoint URL.
    Endpoint(String),
}

impl From<&RegistryConfig> for RegistrySetting {
    fn from(config: &RegistryConfig) -> Self {
        match config {
            RegistryConfig::Enabled(false) => RegistrySetting::Disabled,
            RegistryConfig::Enabled(true) => RegistrySetting::Endpoint(DEFAULT_REGISTRY.to_string()),
            RegistryConfig::Endpoint(url) => RegistrySetting::Endpoint(url.clone()),
        }
    }
}

impl GititConfig {
    /// Lay `higher` over `self`: every field `higher` sets wins.
    pub fn overlay(self, higher: GititConfig) -> GititConfig {
        GititConfig {
            dir: higher.dir.or(self.dir),
            force: higher.force.or(self.force),
            force_clean: higher.force_clean.or(self.force_clean),
            install: higher.install.or(self.install),
            silent: higher.silent.or(self.silent),
            offline: higher.offline.or(self.offline),
            prefer_offline: higher.prefer_offline.or(self.prefer_offline),
            auth: higher.auth.or(self.auth),
            registry: higher.registry.or(self.registry),
            provider: higher.provider.or(self.provider),
            verbose: higher.verbose.or(self.verbose),
            cache_dir: higher.cache_dir.or(self.cache_dir),
        }
    }

    /// Whether verbose logging is on.
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    /// Cache directory, falling back to the platform default.
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Build download options for a working directory.
    pub fn download_options(&self, cwd: Option<PathBuf>) -> DownloadOptions {
        DownloadOptions {
            provider: self.provider.clone(),
            force: self.force.unwrap_or(false),
            force_clean: self.force_clean.unwrap_or(false),
            offline: self.offline.unwrap_or(false),
            prefer_offline: self.prefer_offline.unwrap_or(false),
            dir: self.dir.clone(),
            registry: self
                .registry
                .as_ref()
                .map(RegistrySetting::from)
                .unwrap_or_default(),
            cwd,
            auth: self.auth.clone().filter(|a| !a.is_empty()),
            install: self.install.unwrap_or(false),
            silent: self.silent.unwrap_or(false),
            ..Default::default()
        }
    }
}
