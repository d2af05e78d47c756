//! Download options and the result record.

use crate::hooks::{Hooks, Plugin};
use crate::registry::{Provider, ProviderRegistry, TemplateDescriptor, DEFAULT_REGISTRY};
use serde::Serialize;
use std::path::PathBuf;

/// Whether short names resolve through a remote registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySetting {
    /// No `registry` provider; unprefixed identifiers go to GitHub.
    Disabled,
    /// Registry at the given endpoint.
    Endpoint(String),
}

impl RegistrySetting {
    /// The endpoint, if enabled.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Disabled => None,
            Self::Endpoint(url) => Some(url),
        }
    }
}

impl Default for RegistrySetting {
    fn default() -> Self {
        Self::Endpoint(DEFAULT_REGISTRY.to_string())
    }
}

/// Options for one template download.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Provider for identifiers without a `provider:` prefix.
    pub provider: Option<String>,
    /// Allow extracting into a non-empty directory.
    pub force: bool,
    /// Remove the destination before extracting.
    pub force_clean: bool,
    /// Never touch the network.
    pub offline: bool,
    /// Use a cached archive without revalidating when one exists.
    pub prefer_offline: bool,
    /// Destination, relative to `cwd`. Defaults to the template's directory name.
    pub dir: Option<PathBuf>,
    /// Registry used for unprefixed identifiers.
    pub registry: RegistrySetting,
    /// Working directory. Defaults to the process working directory.
    pub cwd: Option<PathBuf>,
    /// Bearer token for private sources.
    pub auth: Option<String>,
    /// Install dependencies after extraction.
    pub install: bool,
    /// Silence the install command's output.
    pub silent: bool,
    /// Caller hooks; override plugin hooks.
    pub hooks: Hooks,
    /// Caller providers; override plugin and built-in providers.
    pub providers: ProviderRegistry,
    /// Plugins, in priority order (later wins).
    pub plugins: Vec<Plugin>,
}

impl DownloadOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the destination directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set the bearer token.
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Set the caller hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register a caller provider.
    pub fn with_provider(mut self, name: impl Into<String>, provider: Provider) -> Self {
        self.providers.insert(name, provider);
        self
    }

    /// Add a plugin after those already configured.
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Set the registry.
    pub fn with_registry(mut self, registry: RegistrySetting) -> Self {
        self.registry = registry;
        self
    }

    /// Provider used when the identifier has no prefix.
    pub fn default_provider(&self) -> &str {
        match (&self.provider, self.registry.endpoint()) {
            (Some(provider), _) => provider,
            (None, Some(_)) => "registry",
            (None, None) => "github",
        }
    }
}

/// The record returned for a downloaded template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateResult {
    /// Resolved template metadata.
    #[serde(flatten)]
    pub descriptor: TemplateDescriptor,
    /// The identifier without its provider prefix.
    pub source: String,
    /// Absolute destination directory.
    pub dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_enabled() {
        let options = DownloadOptions::new();
        assert_eq!(options.registry.endpoint(), Some(DEFAULT_REGISTRY));
        assert_eq!(options.default_provider(), "registry");
    }

    #[test]
    fn disabled_registry_defaults_to_github() {
        let options = DownloadOptions::new().with_registry(RegistrySetting::Disabled);
        assert_eq!(options.default_provider(), "github");
    }

    #[test]
    fn explicit_provider_wins() {
        let mut options = DownloadOptions::new();
        options.provider = Some("gitlab".into());
        assert_eq!(options.default_provider(), "gitlab");
    }

    #[test]
    fn result_serializes_flat() {
        let result = TemplateResult {
            descriptor: TemplateDescriptor::new("nuxt", "https://x/nuxt.tar.gz"),
            source: "nuxt".into(),
            dir: PathBuf::from("/tmp/nuxt"),
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["name"], "nuxt");
        assert_eq!(json["tar"], "https://x/nuxt.tar.gz");
        assert_eq!(json["source"], "nuxt");
        assert_eq!(json["dir"], "/tmp/nuxt");
    }
}
