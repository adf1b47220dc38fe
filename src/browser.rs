//! Opening pull request URLs in the system browser.

use crate::error::UpdaterError;
use crate::exec::{Executor, command_line};
use std::path::Path;

/// Command that opens `url` on the given OS family (`std::env::consts::OS`).
pub fn open_command(os: &str, url: &str) -> Vec<String> {
    match os {
        "macos" => command_line(&["open", url]),
        // `start` treats the first quoted argument as the window title.
        "windows" => command_line(&["cmd", "/C", "start", "", url]),
        _ => command_line(&["xdg-open", url]),
    }
}

/// Opens every URL, one command each. Returns the URLs that could not be
/// opened with the error for each.
pub fn open_all<E: Executor>(
    executor: &E,
    cwd: &Path,
    urls: &[String],
) -> Vec<(String, UpdaterError)> {
    urls.iter()
        .filter_map(|url| {
            executor
                .execute(&open_command(std::env::consts::OS, url), cwd)
                .err()
                .map(|e| (url.clone(), e))
        })
        .collect()
}
