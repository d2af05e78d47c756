//! Command-line interface for gitit.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Layer the configuration and run the download

pub mod args;

pub use args::Cli;

use crate::config::{config_from_env, load_merged_config, GititConfig};
use crate::error::Result;
use crate::pipeline::{Pipeline, TemplateResult};
use std::path::PathBuf;

/// Resolve the full configuration for an invocation.
///
/// Config files are read from the working directory, then the environment
/// and the flags are laid over them.
pub fn resolve_config(cli: &Cli, env: GititConfig) -> Result<(PathBuf, GititConfig)> {
    let cwd = match &cli.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir()?,
    };

    let config = load_merged_config(&cwd)?
        .overlay(env)
        .overlay(cli.to_config());

    Ok((cwd, config))
}

/// Run the download described by `cli`.
pub fn run(cli: &Cli) -> Result<TemplateResult> {
    let (cwd, config) = resolve_config(cli, config_from_env())?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let pipeline = Pipeline::new(config.cache_root()).with_verbose(config.is_verbose());
    pipeline.download_template(&cli.template, config.download_options(Some(cwd)))
}
