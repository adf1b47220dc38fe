//! External process execution.
//!
//! Every command the updater runs (git, package managers, gh, the browser
//! opener) goes through the [`Executor`] trait so the pipeline can be driven
//! by a scripted fake in tests.

use crate::constants::PROCESS_POLL_MS;
use crate::error::{UpdaterError, UpdaterResult};
use colored::Colorize;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Logger callback invoked with the working directory and command line
/// before each command runs.
pub type CommandLogger = fn(&Path, &[String]);

/// Verbose logger that prints every command line to stderr.
pub fn verbose_logger(_cwd: &Path, command: &[String]) {
    eprintln!("    {} {}", "$".dimmed(), display_command(command).dimmed());
}

/// No-op logger for normal and quiet modes.
pub fn no_op_logger(_cwd: &Path, _command: &[String]) {}

/// Captured output of a command that exited with code 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Runs one command in a working directory, exactly once.
pub trait Executor {
    fn execute(&self, command: &[String], cwd: &Path) -> UpdaterResult<ExecutionOutput>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, command: &[String], cwd: &Path) -> UpdaterResult<ExecutionOutput> {
        (**self).execute(command, cwd)
    }
}

/// Builds an owned command line from string slices.
pub fn command_line(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| (*p).to_string()).collect()
}

/// Renders a command line the way it appears in messages. Arguments with
/// whitespace are double-quoted so the output reads like a shell command.
pub fn display_command(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Executor backed by real child processes.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
    logger: CommandLogger,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(None, no_op_logger)
    }
}

impl ProcessExecutor {
    pub fn new(timeout: Option<Duration>, logger: CommandLogger) -> Self {
        Self { timeout, logger }
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, command: &[String], cwd: &Path) -> UpdaterResult<ExecutionOutput> {
        let text = display_command(command);
        let Some((program, args)) = command.split_first() else {
            return Err(command_failed("cannot run an empty command".to_string(), &text, ""));
        };

        (self.logger)(cwd, command);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_failed(format!("failed to run `{}`: {}", text, e), &text, ""))?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = match wait_for_exit(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            // The readers are abandoned: grandchildren of a killed command
            // may still hold the pipes open.
            Ok(None) => {
                let secs = self.timeout.map(|t| t.as_secs_f32()).unwrap_or_default();
                return Err(command_failed(
                    format!("`{}` timed out after {}s", text, secs),
                    &text,
                    "",
                ));
            }
            Err(e) => {
                return Err(command_failed(
                    format!("failed waiting for `{}`: {}", text, e),
                    &text,
                    "",
                ));
            }
        };

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        if status.success() {
            Ok(ExecutionOutput { stdout, stderr })
        } else {
            let code = status
                .code()
                .map(|c| format!("code {}", c))
                .unwrap_or_else(|| "a signal".to_string());
            Err(command_failed(
                format!("`{}` exited with {}", text, code),
                &text,
                &stderr,
            ))
        }
    }
}

fn command_failed(message: String, command: &str, stderr: &str) -> UpdaterError {
    UpdaterError::CommandFailed {
        message,
        command: command.to_string(),
        stderr: stderr.trim().to_string(),
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_reader(reader: JoinHandle<Vec<u8>>) -> String {
    let bytes = reader.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

/// Waits for the child to exit. Returns `Ok(None)` when the timeout expired,
/// in which case the child has been killed and reaped.
fn wait_for_exit(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(PROCESS_POLL_MS));
    }
}
