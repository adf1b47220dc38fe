use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use repo_updater::cli::Args;
use repo_updater::config::Config;
use repo_updater::exec::ProcessExecutor;
use repo_updater::output::{self, RepoCallbacks};
use repo_updater::pipeline::RunInfo;
use repo_updater::{batch, browser, config_file};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            output::print_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = args.to_config();
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let candidates = repo_candidates(args, &config, &cwd)?;
    let (repos, problems) = batch::validate_repos(&candidates);
    output::print_skipped(&problems, &config);
    if repos.is_empty() {
        output::print_no_repos();
        return Ok(ExitCode::FAILURE);
    }

    let run = RunInfo::now(config.unique_branch);
    output::print_run_start(repos.len(), &run, &config);

    let executor = ProcessExecutor::new(config.timeout, config.command_logger());
    let start = Instant::now();
    let report = batch::update_all(&repos, &run, &config, &executor, |repo| {
        RepoCallbacks::new(repo, config)
    });
    output::print_summary(&report, start.elapsed(), &config);

    if config.dry_run {
        output::print_dry_run_urls(&report.pr_urls, &config);
        return Ok(ExitCode::SUCCESS);
    }

    if config.open_prompt && !report.pr_urls.is_empty() && std::io::stdin().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Open {} pull request(s) in the browser?",
                report.pr_urls.len()
            ))
            .default(true)
            .interact_opt()
            .context("Failed to read confirmation")?;

        if confirmed == Some(true) {
            let failures = browser::open_all(&executor, &cwd, &report.pr_urls);
            output::print_open_failures(&failures);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Positional repositories override the config file entirely.
fn repo_candidates(args: &Args, config: &Config, cwd: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !args.repos.is_empty() {
        return Ok(args.repos.iter().map(|p| cwd.join(p)).collect());
    }

    let (path, repos) = config_file::find_and_load(args.config.as_deref(), cwd)?;
    output::print_config_source(&path, config);
    Ok(repos)
}
