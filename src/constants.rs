//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic strings throughout the codebase.

use std::time::Duration;

/// Environment variable holding the per-command timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "REPO_UPDATER_TIMEOUT";

/// Returns the per-command timeout configured through the environment.
///
/// Unset, unparseable or zero values mean "no timeout", which matches how the
/// external commands behaved before timeouts existed.
///
/// Example: `REPO_UPDATER_TIMEOUT=600 repo-updater`
pub fn command_timeout_from_env() -> Option<Duration> {
    std::env::var(TIMEOUT_ENV_VAR)
        .ok()
        .and_then(|s| parse_timeout_secs(&s))
}

pub(crate) fn parse_timeout_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// How often a running command is polled when a timeout is active.
pub const PROCESS_POLL_MS: u64 = 50;

/// Branch assumed when the remote HEAD reference cannot be parsed.
pub const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Remote that receives the working branch.
pub const REMOTE_NAME: &str = "origin";

/// Symbolic reference naming the remote's default branch.
pub const REMOTE_HEAD_REF: &str = "refs/remotes/origin/HEAD";

/// Prefix of the dated working branch.
pub const BRANCH_PREFIX: &str = "chore/dep-updates-";

/// Prefix of the commit message; the run date is appended.
pub const COMMIT_MESSAGE_PREFIX: &str = "dep updates ";

/// Prefix of the pull request title and body; the run date is appended.
pub const PR_TITLE_PREFIX: &str = "Dep Updates ";

/// Pull request URL reported for every repository in dry-run mode.
pub const DRY_RUN_PR_URL: &str = "https://github.com/dry-run/pull/0";

/// Config file searched for in the current working directory.
pub const CONFIG_FILE_NAME: &str = "repo-updater.config.json";

/// Directory under the user config dir holding the fallback config.
pub const CONFIG_DIR_NAME: &str = "repo-updater";

/// File name of the fallback config inside [`CONFIG_DIR_NAME`].
pub const USER_CONFIG_FILE_NAME: &str = "config.json";

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Default name used when a repository name cannot be determined from its path.
pub const DEFAULT_REPO_NAME: &str = "repository";
