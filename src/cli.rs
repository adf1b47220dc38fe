//! Command-line arguments.

use crate::config::{Config, Verbosity};
use crate::constants;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Update dependencies across git repositories and open a pull request for each.
#[derive(Debug, Parser)]
#[command(name = "repo-updater", version, about)]
pub struct Args {
    /// Describe the steps for each repository without running any command
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Config file listing repositories (default: ./repo-updater.config.json,
    /// then the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print the final count and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print every step and command
    #[arg(short, long)]
    pub verbose: bool,

    /// Kill any single command running longer than this many seconds
    /// (default: $REPO_UPDATER_TIMEOUT, else no limit)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Append the time of day to the branch name so reruns on the same day
    /// do not collide with an existing branch
    #[arg(long)]
    pub unique_branch: bool,

    /// Do not offer to open the pull requests in a browser
    #[arg(long)]
    pub no_open: bool,

    /// Repositories to update; overrides the config file when given
    #[arg(value_name = "REPO")]
    pub repos: Vec<PathBuf>,
}

impl Args {
    /// Builds the runtime config. The timeout flag wins over the environment.
    pub fn to_config(&self) -> Config {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        let timeout = match self.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => constants::command_timeout_from_env(),
        };

        Config {
            verbosity,
            dry_run: self.dry_run,
            timeout,
            unique_branch: self.unique_branch,
            open_prompt: !self.no_open,
        }
    }
}
