//! gitit - Download project templates from git hosts and template registries.
//!
//! A template identifier such as `gh:org/repo/sub#ref` is resolved by a
//! provider to an archive URL. The archive is fetched through an ETag-aware
//! on-disk cache, extracted with its wrapper directory stripped, and
//! optionally followed by a dependency install. Hooks and plugins can
//! observe and rewrite every stage.
//!
//! # Modules
//!
//! - [`cache`] - On-disk archive cache with ETag revalidation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration files and environment variables
//! - [`error`] - Error types and result aliases
//! - [`extract`] - Tar extraction with path rewriting
//! - [`hooks`] - Pipeline hooks and plugins
//! - [`install`] - Dependency install after extraction
//! - [`pipeline`] - The download orchestrator
//! - [`registry`] - Template identifiers and providers
//!
//! # Example
//!
//! ```
//! use gitit::registry::parse_git_uri;
//!
//! let info = parse_git_uri("org/repo/packages/web#v2").unwrap();
//! assert_eq!(info.repo, "org/repo");
//! assert_eq!(info.subdir, "/packages/web");
//! assert_eq!(info.git_ref, "v2");
//! ```
//!
//! Downloads go through [`download_template`] or a configured [`Pipeline`];
//! see the integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod hooks;
pub mod install;
pub mod pipeline;
pub mod registry;

pub use error::{GititError, Result};
pub use hooks::{Hooks, Plugin};
pub use pipeline::{download_template, DownloadOptions, Pipeline, TemplateResult};
pub use registry::{Provider, ProviderContext, TemplateDescriptor, TemplateProvider};
