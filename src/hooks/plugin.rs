//! Plugins and capability merging.
//!
//! A plugin bundles hooks and providers under a name. Merging is
//! last-writer-wins per key, in the order:
//! 1. Built-in
//! 2. Plugins, in declaration order
//! 3. Caller-supplied

use super::Hooks;
use crate::registry::{Provider, ProviderRegistry};
use serde_json::Value;

/// A named bundle of hooks and providers.
#[derive(Debug, Clone, Default)]
pub struct Plugin {
    /// Plugin name.
    pub name: String,
    /// Plugin version.
    pub version: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Hooks contributed by the plugin.
    pub hooks: Hooks,
    /// Providers contributed by the plugin.
    pub providers: ProviderRegistry,
    /// Plugin options, passed through untouched.
    pub options: Value,
}

impl Plugin {
    /// Create an empty plugin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register a provider.
    pub fn with_provider(mut self, name: impl Into<String>, provider: Provider) -> Self {
        self.providers.insert(name, provider);
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// Merge plugin hooks and caller hooks into one set.
pub fn merge_hooks(plugins: &[Plugin], caller: &Hooks) -> Hooks {
    let mut merged = Hooks::new();
    for plugin in plugins {
        merged.overlay(&plugin.hooks);
    }
    merged.overlay(caller);
    merged
}

/// Merge built-in, plugin and caller providers into one table.
pub fn merge_providers(
    builtin: ProviderRegistry,
    plugins: &[Plugin],
    caller: &ProviderRegistry,
) -> ProviderRegistry {
    let mut merged = builtin;
    for plugin in plugins {
        merged.extend(&plugin.providers);
    }
    merged.extend(caller);
    merged
}
