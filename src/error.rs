//! Error kinds reported by the updater.

use std::path::PathBuf;

/// Errors produced while validating inputs, loading config, or running commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdaterError {
    #[error("directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("not a git repository: {}", .path.display())]
    NotAGitRepository { path: PathBuf },

    #[error("{message}")]
    CommandFailed {
        message: String,
        command: String,
        stderr: String,
    },

    #[error("no config file found (searched: {})", format_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("invalid config file {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },
}

impl UpdaterError {
    /// Captured stderr for command failures; empty for every other kind.
    pub fn stderr(&self) -> &str {
        match self {
            UpdaterError::CommandFailed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for updater operations.
pub type UpdaterResult<T> = std::result::Result<T, UpdaterError>;
