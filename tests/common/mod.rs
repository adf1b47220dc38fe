//! Test infrastructure for repo-updater integration tests.

#![allow(dead_code)]

use anyhow::Result;
use repo_updater::config::{Config, Verbosity};
use repo_updater::error::{UpdaterError, UpdaterResult};
use repo_updater::exec::{ExecutionOutput, Executor, ProcessExecutor, display_command};
use repo_updater::git;
use repo_updater::pipeline::{UpdateCallbacks, UpdateResult, UpdateStep};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const DATE: &str = "2024-06-01";
pub const BRANCH: &str = "chore/dep-updates-2024-06-01";
pub const PR_URL: &str = "https://github.com/acme/web/pull/17";

pub fn test_config() -> Config {
    Config {
        verbosity: Verbosity::Quiet,
        ..Config::default()
    }
}

/// Runs a real git command for test setup and inspection.
pub fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    Ok(git::run_git(&ProcessExecutor::default(), repo, args)?)
}

/// A temporary git repository for testing, optionally with a bare remote.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    remote: Option<TempDir>,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on `branch`
    /// (default `master`).
    pub fn new(branch: Option<&str>) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("web-app");
        std::fs::create_dir_all(&path)?;
        init_repo(&path, branch.unwrap_or("master"))?;

        Ok(Self {
            _temp_dir: temp_dir,
            remote: None,
            path,
        })
    }

    /// Creates a test repository pushed to a bare remote, with `origin/HEAD`
    /// pointing at the default branch the way a fresh clone has it.
    pub fn with_remote(branch: Option<&str>) -> Result<Self> {
        let branch = branch.unwrap_or("master");
        let mut repo = Self::new(Some(branch))?;

        let remote_dir = TempDir::new()?;
        run_git(remote_dir.path(), &["init", "--bare", "-b", branch])?;

        let remote_path = remote_dir.path().to_string_lossy().to_string();
        run_git(&repo.path, &["remote", "add", "origin", &remote_path])?;
        run_git(&repo.path, &["push", "-u", "origin", branch])?;
        run_git(&repo.path, &["remote", "set-head", "origin", branch])?;

        repo.remote = Some(remote_dir);
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_branch(&self) -> Result<String> {
        run_git(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        let output = run_git(&self.path, &["branch", "--list", branch])?;
        Ok(!output.trim().is_empty())
    }

    pub fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let output = run_git(&self.path, &["ls-remote", "--heads", "origin", branch])?;
        Ok(!output.trim().is_empty())
    }

    pub fn commit_count(&self, rev: &str) -> Result<usize> {
        let output = run_git(&self.path, &["rev-list", "--count", rev])?;
        Ok(output.trim().parse()?)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.path.join(name), contents)?;
        Ok(())
    }

    pub fn commit_all(&self, message: &str) -> Result<()> {
        run_git(&self.path, &["add", "-A"])?;
        run_git(&self.path, &["commit", "-m", message])?;
        Ok(())
    }
}

pub fn init_repo(path: &Path, branch: &str) -> Result<()> {
    run_git(path, &["init", "-b", branch])?;
    run_git(path, &["config", "user.email", "test@example.com"])?;
    run_git(path, &["config", "user.name", "Test User"])?;
    run_git(path, &["config", "commit.gpgsign", "false"])?;
    std::fs::write(path.join("package.json"), "{\"name\": \"web-app\"}\n")?;
    std::fs::write(path.join("package-lock.json"), "{\"lockfileVersion\": 3}\n")?;
    run_git(path, &["add", "-A"])?;
    run_git(path, &["commit", "-m", "Initial commit"])?;
    Ok(())
}

fn command_failed(command: &[String], stderr: &str) -> UpdaterError {
    UpdaterError::CommandFailed {
        message: format!("`{}` exited with code 1", display_command(command)),
        command: display_command(command),
        stderr: stderr.to_string(),
    }
}

enum Response {
    Output(String),
    Fail(String),
}

/// Fake executor that records every command and answers from a script.
///
/// Responses are matched by command-line prefix; later rules win. Commands
/// with no matching rule succeed with empty output.
pub struct ScriptedExecutor {
    rules: Vec<(String, Response)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    /// Remote HEAD points at `main`; every other command succeeds silently.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
        .respond("git symbolic-ref", "refs/remotes/origin/main")
    }

    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.rules
            .push((prefix.to_string(), Response::Output(stdout.to_string())));
        self
    }

    pub fn fail(mut self, prefix: &str, stderr: &str) -> Self {
        self.rules
            .push((prefix.to_string(), Response::Fail(stderr.to_string())));
        self
    }

    /// Status output that marks the working tree as modified.
    pub fn with_changes(self) -> Self {
        self.respond("git status --porcelain", " M package-lock.json")
            .respond("gh pr create", &format!("{}\n", PR_URL))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, command: &[String], _cwd: &Path) -> UpdaterResult<ExecutionOutput> {
        let text = display_command(command);
        self.calls.borrow_mut().push(text.clone());

        let rule = self
            .rules
            .iter()
            .rev()
            .find(|(prefix, _)| text.starts_with(prefix.as_str()));

        match rule {
            Some((_, Response::Output(stdout))) => {
                Ok(ExecutionOutput::new(stdout.trim(), ""))
            }
            Some((_, Response::Fail(stderr))) => Err(command_failed(command, stderr)),
            None => Ok(ExecutionOutput::default()),
        }
    }
}

/// Executor that runs real git but fakes the package managers and `gh`.
///
/// The fake update command can write a file to simulate a dependency bump.
pub struct HybridExecutor {
    real: ProcessExecutor,
    update_writes: Option<(String, String)>,
    fail_prefix: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl HybridExecutor {
    pub fn new() -> Self {
        Self {
            real: ProcessExecutor::default(),
            update_writes: None,
            fail_prefix: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// The update command writes `contents` to `file`.
    pub fn update_writes(mut self, file: &str, contents: &str) -> Self {
        self.update_writes = Some((file.to_string(), contents.to_string()));
        self
    }

    /// Any command starting with `prefix` fails without running.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl Executor for HybridExecutor {
    fn execute(&self, command: &[String], cwd: &Path) -> UpdaterResult<ExecutionOutput> {
        let text = display_command(command);
        self.calls.borrow_mut().push(text.clone());

        if let Some(prefix) = &self.fail_prefix {
            if text.starts_with(prefix.as_str()) {
                return Err(command_failed(command, "simulated failure"));
            }
        }

        match command.first().map(String::as_str) {
            Some("git") => self.real.execute(command, cwd),
            Some("gh") => Ok(ExecutionOutput::new(PR_URL, "")),
            Some("npm" | "pnpm" | "yarn" | "bun") => {
                let is_update = matches!(
                    command.get(1).map(String::as_str),
                    Some("update" | "upgrade")
                );
                if is_update {
                    if let Some((file, contents)) = &self.update_writes {
                        std::fs::write(cwd.join(file), contents)
                            .map_err(|e| command_failed(command, &e.to_string()))?;
                    }
                }
                Ok(ExecutionOutput::default())
            }
            _ => Err(command_failed(command, "unexpected command")),
        }
    }
}

/// Callbacks that count steps, warnings and completions across clones.
#[derive(Clone, Default)]
pub struct CountingCallbacks {
    pub steps: Arc<AtomicUsize>,
    pub warnings: Arc<AtomicUsize>,
    pub completed: Arc<AtomicUsize>,
}

impl CountingCallbacks {
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl UpdateCallbacks for CountingCallbacks {
    fn on_step(&self, _step: &UpdateStep) {
        self.steps.fetch_add(1, Ordering::SeqCst);
    }

    fn on_warning(&self, _message: &str) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }

    fn on_complete(&self, _result: &UpdateResult) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Callbacks that record every step and planned step in order.
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    pub steps: Rc<RefCell<Vec<UpdateStep>>>,
    pub planned: Rc<RefCell<Vec<String>>>,
}

impl UpdateCallbacks for RecordingCallbacks {
    fn on_step(&self, step: &UpdateStep) {
        self.steps.borrow_mut().push(step.clone());
    }

    fn on_planned_step(&self, description: &str) {
        self.planned.borrow_mut().push(description.to_string());
    }

    fn on_complete(&self, _result: &UpdateResult) {}
}
