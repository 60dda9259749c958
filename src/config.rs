//! Cache store configuration
//!
//! Holds everything the store needs at construction time. The defaults put
//! the cache in the platform cache directory (`~/.cache/jsoncache/` on Linux).

use directories::ProjectDirs;

/// Name used for the default cache directory and for the temp-directory
/// fallback when no better name can be derived
pub const DEFAULT_DIR_NAME: &str = "jsoncache";

/// Settings for constructing a [`CacheStore`](crate::cache::CacheStore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Base directory for entry files. A leading `~` is expanded.
    pub dir: String,
    /// When true, every operation is a no-op that never touches disk
    pub disabled: bool,
    /// Directory name placed under the system temp dir if `dir` cannot be
    /// expanded and has no usable last segment
    pub fallback_dir_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            disabled: false,
            fallback_dir_name: DEFAULT_DIR_NAME.to_string(),
        }
    }
}

impl CacheConfig {
    /// Creates a config for `dir` with the remaining fields defaulted
    pub fn with_dir(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }
}

/// Returns the XDG-style cache directory for jsoncache, or `~/.cache/jsoncache`
/// if the platform directories cannot be determined.
pub fn default_cache_dir() -> String {
    match ProjectDirs::from("", "", DEFAULT_DIR_NAME) {
        Some(dirs) => dirs.cache_dir().to_string_lossy().into_owned(),
        None => format!("~/.cache/{}", DEFAULT_DIR_NAME),
    }
}
