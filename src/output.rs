//! Spinners, colored output, and summary formatting.
//!
//! This module provides visual feedback while repositories are updated,
//! including per-repository spinners, dry-run plans and the final summary.

use crate::batch::BatchReport;
use crate::config::Config;
use crate::constants::PROGRESS_TICK_MS;
use crate::error::UpdaterError;
use crate::pipeline::{PipelineOutcome, RunInfo, UpdateCallbacks, UpdateResult, UpdateStep};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// No-op callbacks for when progress tracking is not needed.
/// This is the null object pattern for UpdateCallbacks - use it when
/// you don't need any output or progress tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl UpdateCallbacks for NoOpCallbacks {
    fn on_step(&self, _step: &UpdateStep) {}
    fn on_complete(&self, _result: &UpdateResult) {}
}

/// Prints a repository header in verbose and dry-run modes.
pub fn print_repo_header(repo_name: &str) {
    eprintln!("\n{}", format!("[{}]", repo_name).white().bold());
}

/// Prints a step progress message in verbose mode.
pub fn print_step(config: &Config, step: &UpdateStep) {
    if !config.is_verbose() {
        return;
    }
    eprintln!("  {}", format_step_message(step).dimmed());
}

/// Spinner for the repository currently being processed.
/// Uses `Option` so nothing is drawn in quiet, verbose and dry-run modes.
pub struct RepoProgress {
    spinner: Option<ProgressBar>,
}

impl RepoProgress {
    pub fn update(&self, repo_name: &str, step: &UpdateStep) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!(
                "{} {}",
                repo_name.white().bold(),
                format_step_message(step)
            ));
        }
    }

    /// Prints above the spinner without tearing it.
    pub fn println(&self, line: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    pub fn finish(&self, line: String) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(line);
        }
    }
}

/// Creates a spinner for one repository.
/// Returns a hidden tracker in quiet, verbose or dry-run mode.
#[must_use]
pub fn create_repo_progress(config: &Config) -> RepoProgress {
    let spinner = if config.is_quiet() || config.is_verbose() || config.dry_run {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        Some(spinner)
    };

    RepoProgress { spinner }
}

/// Callbacks used by the binary for each repository.
/// Combines the spinner with verbose and dry-run output.
pub struct RepoCallbacks {
    repo_name: String,
    progress: RepoProgress,
    config: Config,
}

impl RepoCallbacks {
    pub fn new(path: &Path, config: Config) -> Self {
        Self {
            repo_name: crate::pipeline::repo_name(path).to_string(),
            progress: create_repo_progress(&config),
            config,
        }
    }
}

impl UpdateCallbacks for RepoCallbacks {
    fn on_update_start(&self, repo_name: &str) {
        if self.config.is_verbose() || (self.config.dry_run && !self.config.is_quiet()) {
            print_repo_header(repo_name);
        }
    }

    fn on_step(&self, step: &UpdateStep) {
        self.progress.update(&self.repo_name, step);
        print_step(&self.config, step);
    }

    fn on_planned_step(&self, description: &str) {
        if self.config.is_quiet() {
            return;
        }
        eprintln!("  {} {}", "→".cyan(), description);
    }

    fn on_warning(&self, message: &str) {
        if self.config.is_quiet() {
            return;
        }
        self.progress
            .println(&format!("  {} {}", "warning:".yellow().bold(), message.yellow()));
    }

    fn on_complete(&self, result: &UpdateResult) {
        let line = format_outcome_line(result);
        self.progress.finish(line.clone());
        if self.config.is_verbose() {
            eprintln!("  {}", line);
        }
    }
}

fn format_outcome_line(result: &UpdateResult) -> String {
    let name = result.repo_name();
    match &result.outcome {
        PipelineOutcome::PrCreated { url: Some(url) } => {
            format!("{} {} pull request opened: {}", "✓".green(), name, url)
        }
        PipelineOutcome::PrCreated { url: None } => {
            format!("{} {} pull request opened", "✓".green(), name)
        }
        PipelineOutcome::NoChanges => {
            format!("{} {} {}", "•".blue(), name, "no dependency changes".dimmed())
        }
        PipelineOutcome::Failed(failure) => {
            format!("{} {} failed: {}", "✗".red(), name, failure.error)
        }
    }
}

pub fn print_config_source(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Using config:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_run_start(count: usize, run: &RunInfo, config: &Config) {
    if config.is_quiet() {
        return;
    }
    let mode = if config.dry_run { " (dry run)" } else { "" };
    println!(
        "{}",
        format!(
            "Updating {} {} on branch {}{}",
            count,
            if count == 1 { "repository" } else { "repositories" },
            run.branch,
            mode
        )
        .dimmed()
    );
}

/// Prints repositories skipped during validation.
pub fn print_skipped(problems: &[UpdaterError], config: &Config) {
    for problem in problems {
        if config.is_quiet() {
            eprintln!("warning: {}", problem);
        } else {
            eprintln!("{} {}", "warning:".yellow().bold(), problem);
        }
    }
}

pub fn print_no_repos() {
    eprintln!("{}", "No valid repositories to update".yellow().bold())
}

/// Prints an error that ends the whole run.
pub fn print_fatal(error: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), error);
}

pub fn print_summary(report: &BatchReport, duration: Duration, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(report);
    } else {
        print_normal_summary(report, duration);
    }
}

fn print_quiet_summary(report: &BatchReport) {
    // Always print count to stdout
    println!(
        "{}/{} pull requests created",
        report.created_count(),
        report.results.len()
    );

    // Print failures to stderr
    for result in &report.results {
        if let PipelineOutcome::Failed(failure) = &result.outcome {
            eprintln!("error: {}: {}", result.path.display(), failure.error);
            for line in failure.error.stderr().lines() {
                eprintln!("  {}", line);
            }
        }
    }
}

fn print_normal_summary(report: &BatchReport, duration: Duration) {
    print_section("Summary");

    let created: Vec<_> = report
        .results
        .iter()
        .filter(|r| matches!(r.outcome, PipelineOutcome::PrCreated { .. }))
        .collect();
    let unchanged: Vec<_> = report
        .results
        .iter()
        .filter(|r| matches!(r.outcome, PipelineOutcome::NoChanges))
        .collect();
    let failed: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.outcome.is_failed())
        .collect();

    print_created(&created);
    print_unchanged(&unchanged);
    print_failures(&failed);
    print_warnings(&report.results);

    println!(
        "{}: {} created, {} unchanged, {} failed of {} repos in {}",
        "Total".white().bold(),
        created.len(),
        unchanged.len(),
        failed.len(),
        report.results.len(),
        format_duration(duration)
    );
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}

fn print_created(created: &[&UpdateResult]) {
    if created.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("Pull requests ({}):", created.len()).green().bold()
    );
    for result in created {
        let url = result.outcome.pr_url().unwrap_or("(no URL reported)");
        println!(
            "  {} {} {} in {}",
            "PR".green().bold(),
            result.path.display().to_string().white(),
            url.cyan(),
            format_duration(result.duration).dimmed(),
        );
    }
    println!();
}

fn print_unchanged(unchanged: &[&UpdateResult]) {
    if unchanged.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("No changes ({}):", unchanged.len()).blue().bold()
    );
    for result in unchanged {
        println!(
            "  {} {} in {}",
            "--".blue().bold(),
            result.path.display().to_string().white(),
            format_duration(result.duration).dimmed(),
        );
    }
    println!();
}

fn print_failures(failures: &[&UpdateResult]) {
    if failures.is_empty() {
        return;
    }

    println!("{}", format!("Failed ({}):", failures.len()).red().bold());

    for result in failures {
        if let PipelineOutcome::Failed(failure) = &result.outcome {
            let step = failure.step.to_string().to_lowercase();
            println!(
                "  {} {} {} in {}",
                "FAIL".red().bold(),
                result.path.display().to_string().white(),
                format!("while {}: {}", step, failure.error).red(),
                format_duration(result.duration).dimmed(),
            );
            for line in failure.error.stderr().lines() {
                println!("       {}", line.dimmed());
            }
        }
    }
    println!();
}

fn print_warnings(results: &[UpdateResult]) {
    let warned: Vec<_> = results.iter().filter(|r| !r.warnings.is_empty()).collect();
    if warned.is_empty() {
        return;
    }
    println!("{}", "Warnings:".yellow().bold());
    for result in warned {
        for warning in &result.warnings {
            println!("  {} {}", result.repo_name().white(), warning.yellow());
        }
    }
    println!();
}

/// Lists the pull requests a dry run would have offered to open.
pub fn print_dry_run_urls(urls: &[String], config: &Config) {
    if config.is_quiet() || urls.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("Dry run: would offer to open {} pull request(s)", urls.len()).dimmed()
    );
}

pub fn print_open_failures(failures: &[(String, UpdaterError)]) {
    for (url, error) in failures {
        eprintln!("{} could not open {}: {}", "warning:".yellow().bold(), url, error);
    }
}

fn format_step_message(step: &UpdateStep) -> String {
    match step {
        UpdateStep::Completed => step.to_string(),
        _ => format!("{}...", step),
    }
}
