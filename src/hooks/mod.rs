//! Pipeline extension points.
//!
//! Six optional hooks run at fixed points of a download. Each receives the
//! in-flight state by value and returns the (possibly rewritten) state:
//!
//! | Hook | Runs | State |
//! |---|---|---|
//! | `before_download` | before provider resolution | identifier, options |
//! | `after_download` | after the archive is cached | result |
//! | `before_extract` | before extraction | result, extraction request |
//! | `after_extract` | after extraction | result |
//! | `before_install` | before install, if requested | result, install request |
//! | `after_install` | after install | result |
//!
//! A hook returning `Err` aborts the pipeline with
//! [`GititError::Hook`](crate::GititError::Hook).

pub mod plugin;

pub use plugin::{merge_hooks, merge_providers, Plugin};

use crate::error::{GititError, Result};
use crate::extract::ExtractionRequest;
use crate::install::InstallRequest;
use crate::pipeline::{DownloadOptions, TemplateResult};
use std::fmt;
use std::sync::Arc;

/// Rewrites the identifier and options before resolution.
pub type DownloadHook =
    Arc<dyn Fn(String, DownloadOptions) -> anyhow::Result<(String, DownloadOptions)> + Send + Sync>;

/// Observes or rewrites the result.
pub type ResultHook = Arc<dyn Fn(TemplateResult) -> anyhow::Result<TemplateResult> + Send + Sync>;

/// Rewrites the result and extraction request before extraction.
pub type ExtractHook = Arc<
    dyn Fn(TemplateResult, ExtractionRequest) -> anyhow::Result<(TemplateResult, ExtractionRequest)>
        + Send
        + Sync,
>;

/// Rewrites the result and install request before install.
pub type InstallHook = Arc<
    dyn Fn(TemplateResult, InstallRequest) -> anyhow::Result<(TemplateResult, InstallRequest)>
        + Send
        + Sync,
>;

/// A set of optional hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Runs before provider resolution; may rewrite the identifier and options.
    pub before_download: Option<DownloadHook>,
    /// Runs once the archive is in the cache.
    pub after_download: Option<ResultHook>,
    /// Runs before extraction; may replace the extraction request.
    pub before_extract: Option<ExtractHook>,
    /// Runs after the archive is unpacked.
    pub after_extract: Option<ResultHook>,
    /// Runs before the dependency install, only when one was requested.
    pub before_install: Option<InstallHook>,
    /// Runs after a successful dependency install.
    pub after_install: Option<ResultHook>,
}

impl Hooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `before_download` hook.
    pub fn with_before_download<F>(mut self, f: F) -> Self
    where
        F: Fn(String, DownloadOptions) -> anyhow::Result<(String, DownloadOptions)>
            + Send
            + Sync
            + 'static,
    {
        self.before_download = Some(Arc::new(f));
        self
    }

    /// Set the `after_download` hook.
    pub fn with_after_download<F>(mut self, f: F) -> Self
    where
        F: Fn(TemplateResult) -> anyhow::Result<TemplateResult> + Send + Sync + 'static,
    {
        self.after_download = Some(Arc::new(f));
        self
    }

    /// Set the `before_extract` hook.
    pub fn with_before_extract<F>(mut self, f: F) -> Self
    where
        F: Fn(TemplateResult, ExtractionRequest) -> anyhow::Result<(TemplateResult, ExtractionRequest)>
            + Send
            + Sync
            + 'static,
    {
        self.before_extract = Some(Arc::new(f));
        self
    }

    /// Set the `after_extract` hook.
    pub fn with_after_extract<F>(mut self, f: F) -> Self
    where
        F: Fn(TemplateResult) -> anyhow::Result<TemplateResult> + Send + Sync + 'static,
    {
        self.after_extract = Some(Arc::new(f));
        self
    }

    /// Set the `before_install` hook.
    pub fn with_before_install<F>(mut self, f: F) -> Self
    where
        F: Fn(TemplateResult, InstallRequest) -> anyhow::Result<(TemplateResult, InstallRequest)>
            + Send
            + Sync
            + 'static,
    {
        self.before_install = Some(Arc::new(f));
        self
    }

    /// Set the `after_install` hook.
    pub fn with_after_install<F>(mut self, f: F) -> Self
    where
        F: Fn(TemplateResult) -> anyhow::Result<TemplateResult> + Send + Sync + 'static,
    {
        self.after_install = Some(Arc::new(f));
        self
    }

    /// Lay `other` over `self`: every hook `other` sets replaces ours.
    pub fn overlay(&mut self, other: &Hooks) {
        fn take<T: Clone>(slot: &mut Option<T>, layer: &Option<T>) {
            if let Some(hook) = layer {
                *slot = Some(hook.clone());
            }
        }

        take(&mut self.before_download, &other.before_download);
        take(&mut self.after_download, &other.after_download);
        take(&mut self.before_extract, &other.before_extract);
        take(&mut self.after_extract, &other.after_extract);
        take(&mut self.before_install, &other.before_install);
        take(&mut self.after_install, &other.after_install);
    }

    /// Names of the hooks that are set.
    pub fn names(&self) -> Vec<&'static str> {
        [
            ("before_download", self.before_download.is_some()),
            ("after_download", self.after_download.is_some()),
            ("before_extract", self.before_extract.is_some()),
            ("after_extract", self.after_extract.is_some()),
            ("before_install", self.before_install.is_some()),
            ("after_install", self.after_install.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    pub(crate) fn run_before_download(
        &self,
        input: String,
        options: DownloadOptions,
    ) -> Result<(String, DownloadOptions)> {
        match &self.before_download {
            Some(hook) => hook(input, options).map_err(hook_error("before_download")),
            None => Ok((input, options)),
        }
    }

    pub(crate) fn run_after_download(&self, result: TemplateResult) -> Result<TemplateResult> {
        run_result_hook(&self.after_download, "after_download", result)
    }

    pub(crate) fn run_before_extract(
        &self,
        result: TemplateResult,
        request: ExtractionRequest,
    ) -> Result<(TemplateResult, ExtractionRequest)> {
        match &self.before_extract {
            Some(hook) => hook(result, request).map_err(hook_error("before_extract")),
            None => Ok((result, request)),
        }
    }

    pub(crate) fn run_after_extract(&self, result: TemplateResult) -> Result<TemplateResult> {
        run_result_hook(&self.after_extract, "after_extract", result)
    }

    pub(crate) fn run_before_install(
        &self,
        result: TemplateResult,
        request: InstallRequest,
    ) -> Result<(TemplateResult, InstallRequest)> {
        match &self.before_install {
            Some(hook) => hook(result, request).map_err(hook_error("before_install")),
            None => Ok((result, request)),
        }
    }

    pub(crate) fn run_after_install(&self, result: TemplateResult) -> Result<TemplateResult> {
        run_result_hook(&self.after_install, "after_install", result)
    }
}

fn run_result_hook(
    hook: &Option<ResultHook>,
    name: &'static str,
    result: TemplateResult,
) -> Result<TemplateResult> {
    match hook {
        Some(hook) => hook(result).map_err(hook_error(name)),
        None => Ok(result),
    }
}

fn hook_error(hook: &'static str) -> impl Fn(anyhow::Error) -> GititError {
    move |source| GititError::Hook { hook, source }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("set", &self.names()).finish()
    }
}
