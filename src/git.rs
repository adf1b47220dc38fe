//! Git command wrappers.
//!
//! This module provides a thin wrapper around the git CLI. Command lines are
//! built in [`commands`] so dry-run output describes exactly what a real run
//! would execute.

use crate::constants::{FALLBACK_DEFAULT_BRANCH, GIT_DIR, REMOTE_HEAD_REF, REMOTE_NAME};
use crate::error::{UpdaterError, UpdaterResult};
use crate::exec::{Executor, command_line};
use std::path::Path;

/// Command lines for every git invocation the updater makes.
pub mod commands {
    use super::*;

    pub fn remote_head() -> Vec<String> {
        command_line(&["git", "symbolic-ref", REMOTE_HEAD_REF])
    }

    pub fn checkout(branch: &str) -> Vec<String> {
        command_line(&["git", "checkout", branch])
    }

    pub fn pull() -> Vec<String> {
        command_line(&["git", "pull"])
    }

    pub fn create_branch(branch: &str) -> Vec<String> {
        command_line(&["git", "checkout", "-b", branch])
    }

    pub fn status_porcelain() -> Vec<String> {
        command_line(&["git", "status", "--porcelain"])
    }

    pub fn add_all() -> Vec<String> {
        command_line(&["git", "add", "-A"])
    }

    pub fn commit(message: &str) -> Vec<String> {
        command_line(&["git", "commit", "-m", message])
    }

    pub fn push_upstream(branch: &str) -> Vec<String> {
        command_line(&["git", "push", "-u", REMOTE_NAME, branch])
    }

    pub fn discard_changes() -> Vec<String> {
        command_line(&["git", "reset", "--hard"])
    }

    pub fn delete_local_branch(branch: &str) -> Vec<String> {
        command_line(&["git", "branch", "-D", branch])
    }

    pub fn delete_remote_branch(branch: &str) -> Vec<String> {
        command_line(&["git", "push", REMOTE_NAME, "--delete", branch])
    }
}

pub fn run_git<E: Executor>(executor: &E, repo: &Path, args: &[&str]) -> UpdaterResult<String> {
    let mut command = vec!["git".to_string()];
    command.extend(args.iter().map(|a| (*a).to_string()));
    executor.execute(&command, repo).map(|output| output.stdout)
}

fn validate_branch_name(branch: &str) -> UpdaterResult<()> {
    if branch.contains('\0') || branch.contains('\n') || branch.is_empty() {
        return Err(UpdaterError::CommandFailed {
            message: format!("Invalid branch name: {:?}", branch),
            command: String::new(),
            stderr: String::new(),
        });
    }
    Ok(())
}

pub fn is_git_repo(path: &Path) -> bool {
    path.join(GIT_DIR).exists()
}

/// Extracts the branch name from `refs/remotes/<remote>/<branch>`.
///
/// Branch names may themselves contain slashes, so everything after the
/// remote name is kept.
pub fn parse_default_branch(symbolic_ref: &str) -> Option<String> {
    symbolic_ref
        .trim()
        .strip_prefix("refs/remotes/")
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, branch)| branch.trim())
        .filter(|branch| !branch.is_empty())
        .map(str::to_string)
}

/// Queries the remote HEAD for the default branch.
///
/// A failing query is an error. Only output that succeeds but cannot be
/// parsed falls back to `main`.
pub fn default_branch<E: Executor>(executor: &E, repo: &Path) -> UpdaterResult<String> {
    let output = executor.execute(&commands::remote_head(), repo)?;
    Ok(parse_default_branch(&output.stdout)
        .unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string()))
}

pub fn checkout<E: Executor>(executor: &E, repo: &Path, branch: &str) -> UpdaterResult<()> {
    validate_branch_name(branch)?;
    executor.execute(&commands::checkout(branch), repo)?;
    Ok(())
}

pub fn pull<E: Executor>(executor: &E, repo: &Path) -> UpdaterResult<()> {
    executor.execute(&commands::pull(), repo)?;
    Ok(())
}

pub fn create_branch<E: Executor>(executor: &E, repo: &Path, branch: &str) -> UpdaterResult<()> {
    validate_branch_name(branch)?;
    executor.execute(&commands::create_branch(branch), repo)?;
    Ok(())
}

pub fn has_uncommitted_changes<E: Executor>(executor: &E, repo: &Path) -> UpdaterResult<bool> {
    executor
        .execute(&commands::status_porcelain(), repo)
        .map(|output| !output.stdout.is_empty())
}

pub fn add_all<E: Executor>(executor: &E, repo: &Path) -> UpdaterResult<()> {
    executor.execute(&commands::add_all(), repo)?;
    Ok(())
}

pub fn commit<E: Executor>(executor: &E, repo: &Path, message: &str) -> UpdaterResult<()> {
    executor.execute(&commands::commit(message), repo)?;
    Ok(())
}

pub fn push_upstream<E: Executor>(executor: &E, repo: &Path, branch: &str) -> UpdaterResult<()> {
    validate_branch_name(branch)?;
    executor.execute(&commands::push_upstream(branch), repo)?;
    Ok(())
}

/// Drops staged and unstaged edits to tracked files. Untracked files stay.
pub fn discard_changes<E: Executor>(executor: &E, repo: &Path) -> UpdaterResult<()> {
    executor.execute(&commands::discard_changes(), repo)?;
    Ok(())
}

pub fn delete_local_branch<E: Executor>(
    executor: &E,
    repo: &Path,
    branch: &str,
) -> UpdaterResult<()> {
    validate_branch_name(branch)?;
    executor.execute(&commands::delete_local_branch(branch), repo)?;
    Ok(())
}

pub fn delete_remote_branch<E: Executor>(
    executor: &E,
    repo: &Path,
    branch: &str,
) -> UpdaterResult<()> {
    validate_branch_name(branch)?;
    executor.execute(&commands::delete_remote_branch(branch), repo)?;
    Ok(())
}
