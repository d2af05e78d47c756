//! Configuration loading for gitit.
//!
//! Settings come from four layers, later layers winning per field:
//! 1. User global config (`~/.gitit/config.yml`)
//! 2. Project config (`<cwd>/.gitit.yml`)
//! 3. Environment variables (`GITIT_REGISTRY`, `GITIT_AUTH`, `GITIT_DEBUG`,
//!    `GITIT_CACHE_DIR`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```
//! use gitit::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".gitit.yml"), "registry: false\nforce: true").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! let options = config.download_options(Some(temp.path().to_path_buf()));
//! assert!(options.force);
//! assert_eq!(options.default_provider(), "github");
//! ```

pub mod environment;
pub mod loader;
pub mod schema;

pub use environment::{config_from_env, config_from_vars};
pub use loader::{load_config_file, load_merged_config, parse_config, ConfigPaths};
pub use schema::{GititConfig, RegistryConfig};
