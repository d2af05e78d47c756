//! Provider lookup and resolution.
//!
//! Providers are kept in a name-keyed table. Tables are layered with
//! last-writer-wins semantics (first layer has lowest priority):
//! 1. Built-in providers
//! 2. Plugin providers, in declaration order
//! 3. Caller-supplied providers

use crate::error::{GititError, Result};
use crate::registry::source::TemplateIdentifier;
use crate::registry::template::TemplateDescriptor;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Values available to a provider while resolving.
#[derive(Debug, Clone, Default)]
pub struct ProviderContext {
    /// Bearer token for private sources.
    pub auth: Option<String>,
}

/// Turns a short template identifier into a [`TemplateDescriptor`].
pub trait TemplateProvider: Send + Sync {
    /// Resolve `source` (the identifier with its provider prefix removed).
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> anyhow::Result<TemplateDescriptor>;
}

impl<F> TemplateProvider for F
where
    F: Fn(&str, &ProviderContext) -> anyhow::Result<TemplateDescriptor> + Send + Sync,
{
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> anyhow::Result<TemplateDescriptor> {
        self(source, ctx)
    }
}

/// Shared handle to a provider.
pub type Provider = Arc<dyn TemplateProvider>;

/// Wrap a closure as a [`Provider`].
pub fn provider_fn<F>(f: F) -> Provider
where
    F: Fn(&str, &ProviderContext) -> anyhow::Result<TemplateDescriptor> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Name-keyed provider table.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Provider>,
}

impl ProviderRegistry {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, provider: Provider) {
        self.providers.insert(name.into(), provider);
    }

    /// Overlay another table on top of this one.
    pub fn extend<'a, I>(&mut self, layer: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Provider)>,
    {
        for (name, provider) in layer {
            self.providers.insert(name.clone(), Arc::clone(provider));
        }
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    /// Check if a provider is registered.
    pub fn has(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// All registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Resolve an identifier with the provider it names.
    ///
    /// Provider failures and invalid descriptors become
    /// [`GititError::Resolution`] carrying the provider name and source.
    pub fn resolve(
        &self,
        id: &TemplateIdentifier,
        ctx: &ProviderContext,
    ) -> Result<TemplateDescriptor> {
        let provider = self
            .get(&id.provider)
            .ok_or_else(|| GititError::UnsupportedProvider {
                provider: id.provider.clone(),
            })?;

        let resolution_error = |message: String| GititError::Resolution {
            provider: id.provider.clone(),
            source_id: id.source.clone(),
            message,
        };

        let descriptor = provider
            .resolve(&id.source, ctx)
            .map_err(|e| resolution_error(format!("{:#}", e)))?;

        descriptor.validate().map_err(resolution_error)?;

        tracing::debug!(
            "Resolved {}:{} to {}",
            id.provider,
            id.source,
            descriptor.tar
        );

        Ok(descriptor)
    }
}

impl<'a> IntoIterator for &'a ProviderRegistry {
    type Item = (&'a String, &'a Provider);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Provider>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
