//! Package manager detection from lockfiles.

use std::fmt;
use std::path::Path;

/// Package managers the updater knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

/// Lockfiles checked in priority order. The first one present wins, so a
/// repository carrying both an npm and a bun lockfile is treated as npm.
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("package-lock.json", PackageManager::Npm),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
];

impl PackageManager {
    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Command that bumps dependencies to newer versions.
    pub fn update_command(self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["npm", "update"],
            PackageManager::Pnpm => &["pnpm", "update", "--latest"],
            PackageManager::Yarn => &["yarn", "upgrade"],
            PackageManager::Bun => &["bun", "update", "--latest"],
        }
    }

    /// Command that reinstalls so the lockfile matches the manifest.
    pub fn install_command(self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["npm", "install"],
            PackageManager::Pnpm => &["pnpm", "install"],
            PackageManager::Yarn => &["yarn", "install"],
            PackageManager::Bun => &["bun", "install"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detects the package manager from the lockfiles present in `repo`.
/// Falls back to npm when no known lockfile exists.
pub fn detect(repo: &Path) -> PackageManager {
    LOCKFILES
        .iter()
        .find(|(file, _)| repo.join(file).is_file())
        .map(|(_, manager)| *manager)
        .unwrap_or_default()
}
