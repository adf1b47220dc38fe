//! Pull request creation through the `gh` CLI.
//!
//! `gh` is expected to be authenticated already; on success it prints the
//! URL of the new pull request and nothing else.

use crate::error::UpdaterResult;
use crate::exec::{Executor, command_line};
use std::path::Path;

pub fn create_pr_command(title: &str, body: &str) -> Vec<String> {
    command_line(&["gh", "pr", "create", "--title", title, "--body", body])
}

/// The whole trimmed stdout is the URL; empty output means `gh` reported none.
pub fn parse_pr_url(stdout: &str) -> Option<String> {
    let url = stdout.trim();
    (!url.is_empty()).then(|| url.to_string())
}

pub fn create_pull_request<E: Executor>(
    executor: &E,
    repo: &Path,
    title: &str,
    body: &str,
) -> UpdaterResult<Option<String>> {
    let output = executor.execute(&create_pr_command(title, body), repo)?;
    Ok(parse_pr_url(&output.stdout))
}
