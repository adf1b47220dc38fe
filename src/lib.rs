//! Dependency update library.
//!
//! This crate batch-applies a dependency update workflow to local git repositories:
//! - Detecting the remote's default branch
//! - Creating a dated working branch
//! - Running the package manager's update and install commands
//! - Committing, pushing and opening a pull request when anything changed
//! - Returning every repository to its default branch afterwards

pub mod batch;
pub mod browser;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod error;
pub mod exec;
pub mod git;
pub mod github;
pub mod output;
pub mod package_manager;
pub mod pipeline;
