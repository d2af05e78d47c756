//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use crate::config::{GititConfig, RegistryConfig};
use clap::Parser;
use std::path::PathBuf;

/// gitit - Download templates from git hosts and template registries.
#[derive(Debug, Parser)]
#[command(name = "gitit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Template to download (e.g. `gh:org/repo/sub#ref`, `nuxt`)
    pub template: String,

    /// Destination directory (defaults to the template's directory name)
    pub dir: Option<PathBuf>,

    /// Extract into an existing, non-empty directory
    #[arg(short, long)]
    pub force: bool,

    /// Remove the destination directory before extracting
    #[arg(long)]
    pub force_clean: bool,

    /// Install dependencies after extraction
    #[arg(short, long)]
    pub install: bool,

    /// Hide output of the dependency install
    #[arg(long)]
    pub silent: bool,

    /// Bearer token for private templates
    #[arg(long, value_name = "TOKEN")]
    pub auth: Option<String>,

    /// Working directory the destination is resolved against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Use only the local cache
    #[arg(long)]
    pub offline: bool,

    /// Use the cache when present, without revalidating it
    #[arg(long)]
    pub prefer_offline: bool,

    /// Provider for templates without a prefix
    #[arg(short, long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Template registry endpoint
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Do not use a template registry
    #[arg(long, conflicts_with = "registry")]
    pub no_registry: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration layer from the flags that were given.
    ///
    /// Boolean flags that are off leave the lower layers untouched.
    pub fn to_config(&self) -> GititConfig {
        let registry = if self.no_registry {
            Some(RegistryConfig::Enabled(false))
        } else {
            self.registry.clone().map(RegistryConfig::Endpoint)
        };

        GititConfig {
            dir: self.dir.clone(),
            force: flag(self.force),
            force_clean: flag(self.force_clean),
            install: flag(self.install),
            silent: flag(self.silent),
            offline: flag(self.offline),
            prefer_offline: flag(self.prefer_offline),
            auth: self.auth.clone(),
            registry,
            provider: self.provider.clone(),
            verbose: flag(self.verbose),
            cache_dir: None,
        }
    }
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}
