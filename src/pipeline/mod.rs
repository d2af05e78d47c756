//! Template download orchestration.
//!
//! [`Pipeline::download_template`] runs one download end to end:
//!
//! 1. Merge plugin and caller hooks, run `before_download`
//! 2. Merge providers and resolve the identifier
//! 3. Fetch the archive into the cache
//! 4. Run `after_download`, check the destination
//! 5. Run `before_extract`, extract, run `after_extract`
//! 6. If requested: `before_install`, install, `after_install`
//!
//! Every step is fail-fast. The only recovered failure is a download error
//! with a usable cached archive.

pub mod options;

pub use options::{DownloadOptions, RegistrySetting, TemplateResult};

use crate::cache::{default_cache_dir, CacheKey, CachePolicy, CacheRevalidator, CacheStore};
use crate::error::{GititError, Result};
use crate::extract::{extract, ExtractionRequest};
use crate::hooks::{merge_hooks, merge_providers};
use crate::install::{InstallRequest, Installer, PackageManagerInstaller};
use crate::registry::fetch::{bearer_header, normalize_headers};
use crate::registry::{
    builtin_providers, HttpFetcher, ProviderContext, ProviderRegistry, RegistryProvider,
    TemplateIdentifier,
};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Downloads templates into directories.
#[derive(Clone)]
pub struct Pipeline {
    cache: CacheStore,
    http: HttpFetcher,
    installer: Arc<dyn Installer>,
    verbose: bool,
}

impl Pipeline {
    /// Create a pipeline caching archives under `cache_root`.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache: CacheStore::new(cache_root),
            http: HttpFetcher::new(),
            installer: Arc::new(PackageManagerInstaller),
            verbose: false,
        }
    }

    /// Use a specific HTTP fetcher.
    pub fn with_fetcher(mut self, http: HttpFetcher) -> Self {
        self.http = http;
        self
    }

    /// Use a specific installer.
    pub fn with_installer(mut self, installer: impl Installer + 'static) -> Self {
        self.installer = Arc::new(installer);
        self
    }

    /// Report stage progress at `info` instead of `debug`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The cache store archives are kept in.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Download `input` (`[<provider>:]<source>`) and extract it.
    pub fn download_template(
        &self,
        input: &str,
        options: DownloadOptions,
    ) -> Result<TemplateResult> {
        let start = Instant::now();

        let hooks = merge_hooks(&options.plugins, &options.hooks);
        let (input, options) = hooks.run_before_download(input.to_string(), options)?;

        let cwd = resolve_cwd(options.cwd.as_deref())?;
        let providers = self.providers(&options, &cwd);
        let id = TemplateIdentifier::parse(&input, options.default_provider());
        let ctx = ProviderContext {
            auth: options.auth.clone(),
        };

        let descriptor = providers.resolve(&id, &ctx)?.sanitized();
        self.progress(format_args!(
            "Resolved {} with {} to {}",
            input, id.provider, descriptor.tar
        ));

        let mut headers = bearer_header(options.auth.as_deref());
        headers.extend(normalize_headers(&descriptor.headers));

        let key = CacheKey::new(&id.provider, &descriptor.name, descriptor.version.clone());
        let policy = CachePolicy::from_flags(options.offline, options.prefer_offline);
        let archive = CacheRevalidator::new(&self.cache, &self.http).fetch(
            &descriptor.tar,
            &key,
            &headers,
            policy,
        )?;
        self.progress(format_args!(
            "Archive for {} ready at {} ({:?})",
            key,
            archive.entry.archive_path.display(),
            archive.outcome
        ));

        let dir = cwd.join(
            options
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(descriptor.default_dir())),
        );
        let result = TemplateResult {
            descriptor,
            source: id.source,
            dir,
        };
        let result = hooks.run_after_download(result)?;

        prepare_destination(&result.dir, options.force, options.force_clean)?;

        let request = ExtractionRequest::new(&archive.entry.archive_path, &result.dir)
            .with_subdir(result.descriptor.normalized_subdir());
        let (result, request) = hooks.run_before_extract(result, request)?;
        let summary = extract(&request)?;
        self.progress(format_args!(
            "Extracted {} files into {}",
            summary.files,
            request.dest.display()
        ));
        let mut result = hooks.run_after_extract(result)?;

        if options.install {
            let request = InstallRequest::new(&result.dir, options.silent);
            let (installing, request) = hooks.run_before_install(result, request)?;
            let outcome = self.installer.install(&request)?;
            self.progress(format_args!("Install: {:?}", outcome));
            result = hooks.run_after_install(installing)?;
        }

        tracing::debug!("Downloaded {} in {:?}", input, start.elapsed());
        Ok(result)
    }

    /// Built-in providers (plus the registry when enabled), overlaid with
    /// plugin and caller providers.
    fn providers(&self, options: &DownloadOptions, cwd: &Path) -> ProviderRegistry {
        let mut builtin = builtin_providers(&self.http);
        if let Some(endpoint) = options.registry.endpoint() {
            builtin.insert(
                "registry",
                Arc::new(RegistryProvider::new(endpoint, cwd, self.http.clone())),
            );
        }
        merge_providers(builtin, &options.plugins, &options.providers)
    }

    fn progress(&self, message: fmt::Arguments<'_>) {
        if self.verbose {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(default_cache_dir())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("cache", &self.cache.root())
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

/// Download a template with a default [`Pipeline`].
pub fn download_template(input: &str, options: DownloadOptions) -> Result<TemplateResult> {
    Pipeline::default().download_template(input, options)
}

fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(std::path::absolute(path)?),
        None => Ok(std::env::current_dir()?),
    }
}

/// Make sure `dir` can be extracted into, then create it.
fn prepare_destination(dir: &Path, force: bool, force_clean: bool) -> Result<()> {
    let destination_error = |source: io::Error| GititError::Destination {
        path: dir.to_path_buf(),
        source,
    };

    if force_clean {
        match fs::symlink_metadata(dir) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(dir).map_err(destination_error)?,
            Ok(_) => fs::remove_file(dir).map_err(destination_error)?,
            Err(_) => {}
        }
    } else if !force && is_occupied(dir).map_err(destination_error)? {
        return Err(GititError::DestinationConflict {
            path: dir.to_path_buf(),
        });
    }

    fs::create_dir_all(dir).map_err(destination_error)
}

/// Whether `path` exists as anything but an empty directory.
fn is_occupied(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(fs::read_dir(path)?.next().is_some()),
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
