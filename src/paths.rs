//! Path helpers shared by the cache store and its callers
//!
//! Home-directory expansion, directory existence checks and the prefix
//! stripping used when displaying cache paths relative to a base directory.

use directories::BaseDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while resolving a path
#[derive(Debug, Error)]
pub enum PathError {
    /// The current user's home directory could not be determined
    #[error("cannot determine the home directory to expand '{0}'")]
    NoHomeDir(String),

    /// `~user` forms name another user's home directory
    #[error("cannot expand user-specific home dir in '{0}'")]
    UserHomeDir(String),
}

/// Expands a leading `~` to the current user's home directory.
///
/// Paths that do not start with `~` (including the empty path) are returned
/// unchanged.
///
/// # Errors
/// * `PathError::UserHomeDir` for `~name` style paths
/// * `PathError::NoHomeDir` if the home directory is unknown
pub fn expand_home(path: &str) -> Result<PathBuf, PathError> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    if !rest.is_empty() && !rest.starts_with(['/', '\\']) {
        return Err(PathError::UserHomeDir(path.to_string()));
    }

    let base_dirs = BaseDirs::new().ok_or_else(|| PathError::NoHomeDir(path.to_string()))?;
    let home = base_dirs.home_dir();

    // Joining an absolute segment would replace the home directory entirely
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}

/// Returns true if `path` is an existing directory
pub fn dir_exists(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_dir()).unwrap_or(false)
}

/// Strips `base` from the front of `full`, for display.
///
/// Both arguments may start with `~`. If `full` does not start with `base`
/// the expanded `full` is returned unchanged. An argument that cannot be
/// expanded is used as given.
///
/// ```
/// use jsoncache::paths::extract_path;
///
/// assert_eq!(extract_path("/home/u/proj/file.txt", "/home/u/proj"), "/file.txt");
/// assert_eq!(extract_path("/other/file.txt", "/home/u/proj"), "/other/file.txt");
/// ```
pub fn extract_path(full: &str, base: &str) -> String {
    let full = expand_for_display(full);
    let base = expand_for_display(base);

    match full.strip_prefix(base.as_str()) {
        Some(suffix) => suffix.to_string(),
        None => full,
    }
}

fn expand_for_display(path: &str) -> String {
    match expand_home(path) {
        Ok(expanded) => expanded.to_string_lossy().into_owned(),
        Err(e) => {
            warn!(path, error = %e, "path could not be expanded");
            path.to_string()
        }
    }
}
