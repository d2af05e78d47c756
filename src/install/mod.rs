//! Dependency installation for scaffolded projects.
//!
//! The pipeline only knows the [`Installer`] trait. The default
//! [`PackageManagerInstaller`] detects a package manager from lockfiles and
//! runs its install command in the project directory.

pub mod package_manager;

pub use package_manager::PackageManager;

use crate::error::{GititError, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Where and how to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Project directory.
    pub cwd: PathBuf,
    /// Suppress the package manager's output.
    pub silent: bool,
}

impl InstallRequest {
    /// Create a request for `cwd`.
    pub fn new(cwd: impl Into<PathBuf>, silent: bool) -> Self {
        Self {
            cwd: cwd.into(),
            silent,
        }
    }
}

/// What an install step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Dependencies were installed with the named manager.
    Installed(String),
    /// Nothing to install.
    Skipped,
}

/// Installs dependencies in an extracted template.
pub trait Installer: Send + Sync {
    /// Run the install. A failing install is [`GititError::Install`].
    fn install(&self, request: &InstallRequest) -> Result<InstallOutcome>;
}

/// Runs the detected package manager's install command.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageManagerInstaller;

impl Installer for PackageManagerInstaller {
    fn install(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        let Some(manager) = PackageManager::detect(&request.cwd) else {
            tracing::warn!(
                "No package manager detected in {}, skipping install",
                request.cwd.display()
            );
            return Ok(InstallOutcome::Skipped);
        };

        let stdio = || {
            if request.silent {
                Stdio::null()
            } else {
                Stdio::inherit()
            }
        };

        tracing::debug!(
            "Running {} {} in {}",
            manager.program(),
            manager.install_args().join(" "),
            request.cwd.display()
        );

        let start = Instant::now();
        let status = Command::new(manager.program())
            .args(manager.install_args())
            .current_dir(&request.cwd)
            .stdin(stdio())
            .stdout(stdio())
            .stderr(stdio())
            .status()
            .map_err(|e| GititError::Install {
                manager: manager.to_string(),
                code: None,
                message: format!("could not start {}: {}", manager.program(), e),
            })?;

        if !status.success() {
            let message = match status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(GititError::Install {
                manager: manager.to_string(),
                code: status.code(),
                message,
            });
        }

        tracing::debug!("{} install finished in {:?}", manager, start.elapsed());
        Ok(InstallOutcome::Installed(manager.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn skips_without_package_manager() {
        let temp = TempDir::new().unwrap();
        let outcome = PackageManagerInstaller
            .install(&InstallRequest::new(temp.path(), true))
            .unwrap();
        assert_eq!(outcome, InstallOutcome::Skipped);
    }

    #[test]
    fn request_new() {
        let request = InstallRequest::new("/tmp/app", true);
        assert_eq!(request.cwd, PathBuf::from("/tmp/app"));
        assert!(request.silent);
    }

    /// Runs the installer against a fake `npm` placed first on `PATH`.
    #[cfg(unix)]
    #[test]
    fn reports_manager_and_exit_code() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let project = temp.path().join("project");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), "{}").unwrap();

        let npm = bin.join("npm");
        let write_npm = |script: &str| {
            fs::write(&npm, script).unwrap();
            fs::set_permissions(&npm, fs::Permissions::from_mode(0o755)).unwrap();
        };

        let original_path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![bin.clone()];
        paths.extend(std::env::split_paths(&original_path));
        std::env::set_var("PATH", std::env::join_paths(paths).unwrap());

        write_npm("#!/bin/sh\nexit 3\n");
        let failed = PackageManagerInstaller.install(&InstallRequest::new(&project, true));

        write_npm("#!/bin/sh\ntouch installed\n");
        let succeeded = PackageManagerInstaller.install(&InstallRequest::new(&project, true));

        std::env::set_var("PATH", original_path);

        match failed.unwrap_err() {
            GititError::Install {
                manager,
                code,
                message,
            } => {
                assert_eq!(manager, "npm");
                assert_eq!(code, Some(3));
                assert_eq!(message, "exit code 3");
            }
            other => panic!("expected install error, got {:?}", other),
        }
        assert_eq!(succeeded.unwrap(), InstallOutcome::Installed("npm".into()));
        assert!(project.join("installed").exists());
    }
}

