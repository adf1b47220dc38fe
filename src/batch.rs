//! Batch processing of many repositories.
//!
//! Repositories are processed one at a time. A failure in one repository never
//! stops the rest of the batch.

use crate::config::Config;
use crate::error::UpdaterError;
use crate::exec::Executor;
use crate::git;
use crate::pipeline::{self, PipelineOutcome, RunInfo, UpdateCallbacks, UpdateResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Aggregated results of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-repository results, in input order.
    pub results: Vec<UpdateResult>,
    /// URLs of every pull request created, in input order.
    pub pr_urls: Vec<String>,
}

impl BatchReport {
    pub fn created_count(&self) -> usize {
        self.count(|o| matches!(o, PipelineOutcome::PrCreated { .. }))
    }

    pub fn no_changes_count(&self) -> usize {
        self.count(|o| matches!(o, PipelineOutcome::NoChanges))
    }

    pub fn failed_count(&self) -> usize {
        self.count(PipelineOutcome::is_failed)
    }

    fn count(&self, pred: impl Fn(&PipelineOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    fn push(&mut self, result: UpdateResult) {
        if let Some(url) = result.outcome.pr_url() {
            self.pr_urls.push(url.to_string());
        }
        self.results.push(result);
    }
}

/// Splits candidate paths into usable repositories and per-path problems.
///
/// Missing directories and directories without a `.git` entry are reported
/// instead of aborting. Duplicates are dropped, keeping the first occurrence.
pub fn validate_repos(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<UpdaterError>) {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    let mut problems = Vec::new();

    for path in paths {
        if !seen.insert(path.as_path()) {
            continue;
        }
        if !path.is_dir() {
            problems.push(UpdaterError::DirectoryNotFound { path: path.clone() });
        } else if !git::is_git_repo(path) {
            problems.push(UpdaterError::NotAGitRepository { path: path.clone() });
        } else {
            valid.push(path.clone());
        }
    }

    (valid, problems)
}

/// Runs the pipeline (or its dry-run description) for every repository.
pub fn update_all<E, C, F>(
    repos: &[PathBuf],
    run: &RunInfo,
    config: &Config,
    executor: &E,
    make_callbacks: F,
) -> BatchReport
where
    E: Executor,
    C: UpdateCallbacks,
    F: Fn(&Path) -> C,
{
    let mut report = BatchReport::default();

    for repo in repos {
        let callbacks = make_callbacks(repo);
        let result = if config.dry_run {
            pipeline::describe(repo, run, &callbacks)
        } else {
            pipeline::update(repo, run, executor, &callbacks)
        };
        report.push(result);
    }

    report
}
