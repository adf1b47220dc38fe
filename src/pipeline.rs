//! Per-repository dependency update pipeline.
//!
//! The pipeline is a fixed sequence of external commands. Every command gets a
//! single attempt; the first failure stops the sequence. Once the working
//! branch exists, every exit path returns the repository to its default
//! branch and deletes the working branch again.

use crate::constants::{
    BRANCH_PREFIX, COMMIT_MESSAGE_PREFIX, DEFAULT_REPO_NAME, DRY_RUN_PR_URL, PR_TITLE_PREFIX,
};
use crate::error::{UpdaterError, UpdaterResult};
use crate::exec::{Executor, command_line, display_command};
use crate::package_manager::{self, PackageManager};
use crate::{git, github};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Values shared by every repository in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    /// Run date as `YYYY-MM-DD`.
    pub date: String,
    /// Name of the working branch created in each repository.
    pub branch: String,
}

impl RunInfo {
    pub fn new(date: impl Into<String>) -> Self {
        let date = date.into();
        let branch = format!("{}{}", BRANCH_PREFIX, date);
        Self { date, branch }
    }

    /// Same date, but the branch name carries an extra suffix so reruns on
    /// the same day do not collide.
    pub fn with_branch_suffix(date: impl Into<String>, suffix: &str) -> Self {
        let mut run = Self::new(date);
        run.branch = format!("{}-{}", run.branch, suffix);
        run
    }

    /// Computes the date once from the local clock.
    pub fn now(unique_branch: bool) -> Self {
        let now = chrono::Local::now();
        let date = now.format("%Y-%m-%d").to_string();
        if unique_branch {
            Self::with_branch_suffix(date, &now.format("%H%M%S").to_string())
        } else {
            Self::new(date)
        }
    }

    pub fn commit_message(&self) -> String {
        format!("{}{}", COMMIT_MESSAGE_PREFIX, self.date)
    }

    /// Used for both the pull request title and body.
    pub fn pr_title(&self) -> String {
        format!("{}{}", PR_TITLE_PREFIX, self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStep {
    Started,
    DetectingDefaultBranch,
    CheckingOutDefault { branch: String },
    Pulling,
    CreatingBranch { branch: String },
    Updating { manager: PackageManager },
    Installing { manager: PackageManager },
    CheckingStatus,
    Staging,
    Committing,
    Pushing { branch: String },
    CreatingPullRequest,
    RestoringDefault { branch: String },
    Completed,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStep::Started => write!(f, "Starting update"),
            UpdateStep::DetectingDefaultBranch => write!(f, "Detecting default branch"),
            UpdateStep::CheckingOutDefault { branch } => write!(f, "Checking out {}", branch),
            UpdateStep::Pulling => write!(f, "Pulling from origin"),
            UpdateStep::CreatingBranch { branch } => write!(f, "Creating branch {}", branch),
            UpdateStep::Updating { manager } => write!(f, "Updating dependencies with {}", manager),
            UpdateStep::Installing { manager } => {
                write!(f, "Installing dependencies with {}", manager)
            }
            UpdateStep::CheckingStatus => write!(f, "Checking for changes"),
            UpdateStep::Staging => write!(f, "Staging changes"),
            UpdateStep::Committing => write!(f, "Committing"),
            UpdateStep::Pushing { branch } => write!(f, "Pushing {}", branch),
            UpdateStep::CreatingPullRequest => write!(f, "Creating pull request"),
            UpdateStep::RestoringDefault { branch } => write!(f, "Returning to {}", branch),
            UpdateStep::Completed => write!(f, "Completed"),
        }
    }
}

/// Tracks what exists of the working branch, so rollback knows what to undo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchState {
    pub created: bool,
    pub pushed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub error: UpdaterError,
    pub step: UpdateStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Changes were pushed and a pull request opened. `url` is `None` when
    /// the PR command printed nothing.
    PrCreated { url: Option<String> },
    NoChanges,
    Failed(UpdateFailure),
}

impl PipelineOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PipelineOutcome::Failed(_))
    }

    pub fn pr_url(&self) -> Option<&str> {
        match self {
            PipelineOutcome::PrCreated { url } => url.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct UpdateResult {
    pub path: PathBuf,
    pub outcome: PipelineOutcome,
    pub duration: Duration,
    /// Non-fatal problems, such as a cleanup command that failed.
    pub warnings: Vec<String>,
}

impl UpdateResult {
    pub fn repo_name(&self) -> &str {
        repo_name(&self.path)
    }
}

/// Callbacks for pipeline progress reporting.
///
/// This trait decouples the pipeline from presentation concerns.
/// Implementations can display progress bars, print steps, or record events in tests.
pub trait UpdateCallbacks {
    /// Called once before any step of a repository runs.
    fn on_update_start(&self, _repo_name: &str) {}

    /// Called immediately before each step runs.
    fn on_step(&self, step: &UpdateStep);

    /// Called in dry-run mode for every step that would run.
    fn on_planned_step(&self, _description: &str) {}

    /// Called for problems that do not change the outcome.
    fn on_warning(&self, _message: &str) {}

    /// Called when the repository is finished, whatever the outcome.
    fn on_complete(&self, result: &UpdateResult);
}

pub fn repo_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_REPO_NAME)
}

/// Runs the full update pipeline for one repository.
pub fn update<E, C>(path: &Path, run: &RunInfo, executor: &E, callbacks: &C) -> UpdateResult
where
    E: Executor,
    C: UpdateCallbacks,
{
    let start = Instant::now();
    callbacks.on_update_start(repo_name(path));

    let mut pipeline = Pipeline {
        path,
        run,
        executor,
        callbacks,
        warnings: Vec::new(),
    };
    let outcome = match pipeline.run_steps() {
        Ok(outcome) => {
            callbacks.on_step(&UpdateStep::Completed);
            outcome
        }
        Err(failure) => PipelineOutcome::Failed(failure),
    };

    let result = UpdateResult {
        path: path.to_path_buf(),
        outcome,
        duration: start.elapsed(),
        warnings: pipeline.warnings,
    };
    callbacks.on_complete(&result);
    result
}

/// Dry-run variant of [`update`]: reports every step that would run through
/// [`UpdateCallbacks::on_planned_step`] without executing anything, and
/// returns a placeholder pull request.
pub fn describe<C: UpdateCallbacks>(path: &Path, run: &RunInfo, callbacks: &C) -> UpdateResult {
    let start = Instant::now();
    callbacks.on_update_start(repo_name(path));

    for description in plan(path, run) {
        callbacks.on_planned_step(&description);
    }

    let result = UpdateResult {
        path: path.to_path_buf(),
        outcome: PipelineOutcome::PrCreated {
            url: Some(DRY_RUN_PR_URL.to_string()),
        },
        duration: start.elapsed(),
        warnings: Vec::new(),
    };
    callbacks.on_complete(&result);
    result
}

/// Ordered, human-readable list of the commands a real run would execute.
/// The package manager is detected for real; the default branch is not
/// known without running git, so a placeholder stands in for it.
pub fn plan(path: &Path, run: &RunInfo) -> Vec<String> {
    let manager = package_manager::detect(path);
    let default = "<default-branch>";
    let title = run.pr_title();

    vec![
        describe_command("Detect default branch", &git::commands::remote_head()),
        describe_command("Check out default branch", &git::commands::checkout(default)),
        describe_command("Pull latest changes", &git::commands::pull()),
        describe_command(
            "Create working branch",
            &git::commands::create_branch(&run.branch),
        ),
        describe_command(
            &format!("Update dependencies ({})", manager),
            &command_line(manager.update_command()),
        ),
        describe_command(
            &format!("Install dependencies ({})", manager),
            &command_line(manager.install_command()),
        ),
        describe_command("Check for changes", &git::commands::status_porcelain()),
        describe_command("Stage changes", &git::commands::add_all()),
        describe_command("Commit", &git::commands::commit(&run.commit_message())),
        describe_command("Push", &git::commands::push_upstream(&run.branch)),
        describe_command(
            "Create pull request",
            &github::create_pr_command(&title, &title),
        ),
        format!(
            "Return to default branch: {} && {}",
            display_command(&git::commands::checkout(default)),
            display_command(&git::commands::delete_local_branch(&run.branch))
        ),
    ]
}

fn describe_command(label: &str, command: &[String]) -> String {
    format!("{}: {}", label, display_command(command))
}

struct Pipeline<'a, E, C> {
    path: &'a Path,
    run: &'a RunInfo,
    executor: &'a E,
    callbacks: &'a C,
    warnings: Vec<String>,
}

impl<E: Executor, C: UpdateCallbacks> Pipeline<'_, E, C> {
    fn step<T>(
        &self,
        step: UpdateStep,
        action: impl FnOnce() -> UpdaterResult<T>,
    ) -> Result<T, UpdateFailure> {
        self.callbacks.on_step(&step);
        action().map_err(|error| UpdateFailure { error, step })
    }

    fn run_steps(&mut self) -> Result<PipelineOutcome, UpdateFailure> {
        let (path, executor) = (self.path, self.executor);

        self.callbacks.on_step(&UpdateStep::Started);

        let default_branch = self.step(UpdateStep::DetectingDefaultBranch, || {
            git::default_branch(executor, path)
        })?;

        self.step(
            UpdateStep::CheckingOutDefault {
                branch: default_branch.clone(),
            },
            || git::checkout(executor, path, &default_branch),
        )?;

        self.step(UpdateStep::Pulling, || git::pull(executor, path))?;

        let manager = package_manager::detect(path);

        let mut state = BranchState::default();
        let result = self.run_on_branch(manager, &mut state);
        self.clean_up(&default_branch, state, result.is_err());
        result
    }

    fn run_on_branch(
        &self,
        manager: PackageManager,
        state: &mut BranchState,
    ) -> Result<PipelineOutcome, UpdateFailure> {
        let (path, executor) = (self.path, self.executor);
        let branch = self.run.branch.as_str();

        // A failure here leaves nothing to undo. In particular a same-named
        // branch from an earlier run must survive.
        self.step(
            UpdateStep::CreatingBranch {
                branch: branch.to_string(),
            },
            || git::create_branch(executor, path, branch),
        )?;
        state.created = true;

        self.step(UpdateStep::Updating { manager }, || {
            executor.execute(&command_line(manager.update_command()), path)
        })?;

        self.step(UpdateStep::Installing { manager }, || {
            executor.execute(&command_line(manager.install_command()), path)
        })?;

        let has_changes = self.step(UpdateStep::CheckingStatus, || {
            git::has_uncommitted_changes(executor, path)
        })?;
        if !has_changes {
            return Ok(PipelineOutcome::NoChanges);
        }

        self.step(UpdateStep::Staging, || git::add_all(executor, path))?;

        let message = self.run.commit_message();
        self.step(UpdateStep::Committing, || {
            git::commit(executor, path, &message)
        })?;

        self.step(
            UpdateStep::Pushing {
                branch: branch.to_string(),
            },
            || git::push_upstream(executor, path, branch),
        )?;
        state.pushed = true;

        let title = self.run.pr_title();
        let url = self.step(UpdateStep::CreatingPullRequest, || {
            github::create_pull_request(executor, path, &title, &title)
        })?;

        Ok(PipelineOutcome::PrCreated { url })
    }

    /// Returns to the default branch and removes the working branch. After a
    /// failure, tracked edits are discarded first so they do not follow the
    /// checkout, and the remote copy is deleted if it was already pushed.
    fn clean_up(&mut self, default_branch: &str, state: BranchState, failed: bool) {
        if !state.created {
            return;
        }
        let (path, executor) = (self.path, self.executor);
        let branch = self.run.branch.clone();

        self.callbacks.on_step(&UpdateStep::RestoringDefault {
            branch: default_branch.to_string(),
        });

        if failed {
            if let Err(e) = git::discard_changes(executor, path) {
                self.warn(format!("could not discard changes on {}: {}", branch, e));
            }
        }
        if let Err(e) = git::checkout(executor, path, default_branch) {
            self.warn(format!("could not check out {}: {}", default_branch, e));
        }
        if let Err(e) = git::delete_local_branch(executor, path, &branch) {
            self.warn(format!("could not delete local branch {}: {}", branch, e));
        }
        if failed && state.pushed {
            if let Err(e) = git::delete_remote_branch(executor, path, &branch) {
                self.warn(format!("could not delete remote branch {}: {}", branch, e));
            }
        }
    }

    fn warn(&mut self, message: String) {
        self.callbacks.on_warning(&message);
        self.warnings.push(message);
    }
}
