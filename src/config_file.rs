//! Loading the repository list from `repo-updater.config.json`.
//!
//! The file is a JSON object with a single recognized key:
//!
//! ```json
//! { "repos": ["/home/me/src/web", "/home/me/src/api"] }
//! ```

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, USER_CONFIG_FILE_NAME};
use crate::error::{UpdaterError, UpdaterResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    repos: Vec<PathBuf>,
}

/// Locations searched when no explicit path is given, in order.
pub fn search_locations(cwd: &Path, user_config_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut locations = vec![cwd.join(CONFIG_FILE_NAME)];
    if let Some(dir) = user_config_dir {
        locations.push(dir.join(CONFIG_DIR_NAME).join(USER_CONFIG_FILE_NAME));
    }
    locations
}

/// Picks the config file to load.
///
/// An explicit path must exist. Otherwise the first existing candidate wins.
pub fn locate(explicit: Option<&Path>, candidates: &[PathBuf]) -> UpdaterResult<PathBuf> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(UpdaterError::ConfigNotFound {
                searched: vec![path.to_path_buf()],
            })
        };
    }

    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| UpdaterError::ConfigNotFound {
            searched: candidates.to_vec(),
        })
}

/// Parses the repository list from config file contents.
pub fn parse_repo_list(path: &Path, contents: &str) -> UpdaterResult<Vec<PathBuf>> {
    serde_json::from_str::<ConfigFile>(contents)
        .map(|config| config.repos)
        .map_err(|e| UpdaterError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Reads and parses a config file.
pub fn load_repo_list(path: &Path) -> UpdaterResult<Vec<PathBuf>> {
    let contents = std::fs::read_to_string(path).map_err(|e| UpdaterError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_repo_list(path, &contents)
}

/// Finds and loads the repository list using the standard search order:
/// the explicit path, else the working directory, else the user config dir.
pub fn find_and_load(
    explicit: Option<&Path>,
    cwd: &Path,
) -> UpdaterResult<(PathBuf, Vec<PathBuf>)> {
    let user_dir = dirs::config_dir();
    let candidates = search_locations(cwd, user_dir.as_deref());
    let path = locate(explicit, &candidates)?;
    let repos = load_repo_list(&path)?;
    Ok((path, repos))
}
