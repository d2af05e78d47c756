//! Package manager detection by lockfile.

use std::fmt;
use std::path::Path;

/// Package manager that can install a scaffolded project's dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// `bun.lockb` or `bun.lock`
    Bun,
    /// `pnpm-lock.yaml`
    Pnpm,
    /// `yarn.lock`
    Yarn,
    /// `package-lock.json`, or a bare `package.json`
    Npm,
    /// `Gemfile.lock`, installed with `bundle`
    Bundler,
    /// `poetry.lock`
    Poetry,
    /// `uv.lock`, installed with `uv sync`
    Uv,
    /// `Cargo.lock`, dependencies fetched with `cargo fetch`
    Cargo,
}

/// Lockfiles in detection priority order.
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
    ("Gemfile.lock", PackageManager::Bundler),
    ("poetry.lock", PackageManager::Poetry),
    ("uv.lock", PackageManager::Uv),
    ("Cargo.lock", PackageManager::Cargo),
];

impl PackageManager {
    /// Detect the package manager for a project directory.
    ///
    /// Lockfiles are checked in a fixed priority order. A bare
    /// `package.json` without a lockfile selects npm.
    pub fn detect(project_root: &Path) -> Option<Self> {
        LOCKFILES
            .iter()
            .find(|(file, _)| project_root.join(file).is_file())
            .map(|(_, manager)| *manager)
            .or_else(|| {
                project_root
                    .join("package.json")
                    .is_file()
                    .then_some(PackageManager::Npm)
            })
    }

    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Bun => "bun",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
            PackageManager::Bundler => "bundle",
            PackageManager::Poetry => "poetry",
            PackageManager::Uv => "uv",
            PackageManager::Cargo => "cargo",
        }
    }

    /// Arguments for the install command.
    pub fn install_args(self) -> &'static [&'static str] {
        match self {
            PackageManager::Uv => &["sync"],
            PackageManager::Cargo => &["fetch"],
            _ => &["install"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}
