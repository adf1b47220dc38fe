//! Configuration types for CLI verbosity and options.

use crate::exec::{self, CommandLogger};
use std::time::Duration;

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    /// Describe the steps instead of running any command.
    pub dry_run: bool,
    /// Per-command timeout; `None` waits for every command to exit.
    pub timeout: Option<Duration>,
    /// Append a time-of-day suffix to the working branch name.
    pub unique_branch: bool,
    /// Offer to open the created pull requests in a browser.
    pub open_prompt: bool,
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the command logger matching the verbosity.
    ///
    /// Config only picks the logger; the loggers themselves live in the exec
    /// module next to the code that invokes them.
    #[must_use]
    pub fn command_logger(&self) -> CommandLogger {
        if self.is_verbose() {
            exec::verbose_logger
        } else {
            exec::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}
