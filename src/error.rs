//! Error types for gitit operations.
//!
//! This module defines [`GititError`], the error type returned by every
//! pipeline stage, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each pipeline stage has its own variant so callers can tell which stage
//!   failed without re-running in verbose mode
//! - Providers, hooks and the HTTP fetcher work in `anyhow::Error` and are
//!   converted at the pipeline boundary
//! - Hook errors are carried unchanged; only the hook name is attached

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gitit operations.
#[derive(Debug, Error)]
pub enum GititError {
    /// The identifier could not be turned into a template descriptor.
    #[error("Failed to resolve template '{source_id}' from {provider}: {message}")]
    Resolution {
        provider: String,
        source_id: String,
        message: String,
    },

    /// No provider is registered under the requested name.
    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    /// Network failure with no usable cached artifact to fall back on.
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Destination exists and is not empty, and neither force flag was set.
    #[error("Destination {} already exists. Use --force or --force-clean to overwrite it.", .path.display())]
    DestinationConflict { path: PathBuf },

    /// The destination could not be cleaned or created.
    #[error("Failed to prepare destination {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed archive or filesystem failure while unpacking.
    #[error("Failed to extract {}: {message}", .archive.display())]
    Extraction { archive: PathBuf, message: String },

    /// The detected package manager exited unsuccessfully.
    #[error("{manager} install failed: {message}")]
    Install {
        manager: String,
        code: Option<i32>,
        message: String,
    },

    /// An extension point returned an error.
    #[error("{source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Failed to read or parse a configuration file.
    #[error("Failed to load config at {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GititError {
    /// Short name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Resolution { .. } | Self::UnsupportedProvider { .. } => "resolve",
            Self::Fetch { .. } => "download",
            Self::DestinationConflict { .. } | Self::Destination { .. } => "destination",
            Self::Extraction { .. } => "extract",
            Self::Install { .. } => "install",
            Self::Hook { hook, .. } => hook,
            Self::Config { .. } => "config",
            Self::Io(_) | Self::Other(_) => "internal",
        }
    }
}

/// Result type alias for gitit operations.
pub type Result<T> = std::result::Result<T, GititError>;
