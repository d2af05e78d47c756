//! Configuration file discovery and loading.
//!
//! This module finds config files and merges them in priority order
//! (later overrides earlier):
//! 1. User global config (`~/.gitit/config.yml`)
//! 2. Project config (`<cwd>/.gitit.yml`)

use crate::config::schema::GititConfig;
use crate::error::{GititError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG: &str = ".gitit.yml";

/// Paths to configuration files in priority order (later overrides earlier).
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User's global config: ~/.gitit/config.yml
    pub user_global: Option<PathBuf>,

    /// Project config: <cwd>/.gitit.yml
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given working directory.
    pub fn discover(cwd: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .map(|home| home.join(".gitit").join("config.yml"))
                .filter(|path| path.is_file()),
            project: Some(cwd.join(PROJECT_CONFIG)).filter(|path| path.is_file()),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.user_global.iter().chain(self.project.iter()).collect()
    }
}

/// Load and parse a single config file.
pub fn load_config_file(path: &Path) -> Result<GititConfig> {
    let content = fs::read_to_string(path).map_err(|e| GititError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`GititConfig`].
///
/// An empty document is an empty config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<GititConfig> {
    if content.trim().is_empty() {
        return Ok(GititConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| GititError::Config {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the config files in `paths`.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<GititConfig> {
    paths
        .all_existing()
        .into_iter()
        .try_fold(GititConfig::default(), |merged, path| {
            tracing::debug!("Loading config from {}", path.display());
            Ok(merged.overlay(load_config_file(path)?))
        })
}

/// Load and merge all config files for a working directory.
///
/// Missing files are skipped; a file that exists but does not parse is an
/// error.
pub fn load_merged_config(cwd: &Path) -> Result<GititConfig> {
    load_from_paths(&ConfigPaths::discover(cwd))
}
