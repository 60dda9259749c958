//! Error types for cache store operations

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::duration::DurationError;

/// Discriminant for [`CacheError`], for callers that branch on the kind of
/// failure rather than its details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No entry file exists for the key
    Miss,
    /// The entry file exists but could not be opened
    Open,
    /// The entry file could not be read
    Read,
    /// The entry file could not be written
    Write,
    /// The envelope, its timestamp, or a typed payload is malformed
    Parse,
    /// The envelope could not be built or encoded
    Serialize,
    /// The cache directory could not be created
    CreateDir,
    /// The entry file could not be deleted
    Remove,
    /// The requested lifetime could not be parsed
    InvalidDuration,
}

/// Errors that can occur when reading, writing or clearing a cache entry
#[derive(Debug, Error)]
pub enum CacheError {
    /// No cache file exists for the key
    #[error("no cache file for key '{key}'")]
    Miss { key: String, path: PathBuf },

    /// The cache file could not be opened for a reason other than absence
    #[error("cannot open cache file for key '{key}'")]
    Open {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be read
    #[error("could not read file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file does not hold a valid envelope
    #[error("could not unmarshal JSON in file '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope's expiry is not an RFC-3339 timestamp
    #[error("failed to calculate cache expiration for file '{}'", .path.display())]
    Expiration {
        path: PathBuf,
        #[source]
        source: chrono::ParseError,
    },

    /// A payload could not be decoded into the requested type
    #[error("could not decode cached data for key '{key}'")]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The payload is not valid UTF-8 and cannot be embedded in the envelope
    #[error("cache data for key '{key}' is not valid UTF-8")]
    Encoding {
        key: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The envelope could not be encoded as JSON
    #[error("could not marshal JSON to cache key '{key}'")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cache directory could not be created
    #[error("unable to create cache directory '{}'", .dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be written
    #[error("unable to write to cache file '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be deleted
    #[error("unable to clear cache '{key}'")]
    Remove {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lifetime passed to a write could not be parsed
    #[error("invalid cache duration for key '{key}'")]
    InvalidDuration {
        key: String,
        #[source]
        source: DurationError,
    },
}

impl CacheError {
    /// Returns the kind of failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::Miss { .. } => ErrorKind::Miss,
            CacheError::Open { .. } => ErrorKind::Open,
            CacheError::Read { .. } => ErrorKind::Read,
            CacheError::Parse { .. }
            | CacheError::Expiration { .. }
            | CacheError::Decode { .. } => ErrorKind::Parse,
            CacheError::Encoding { .. } | CacheError::Serialize { .. } => ErrorKind::Serialize,
            CacheError::CreateDir { .. } => ErrorKind::CreateDir,
            CacheError::Write { .. } => ErrorKind::Write,
            CacheError::Remove { .. } => ErrorKind::Remove,
            CacheError::InvalidDuration { .. } => ErrorKind::InvalidDuration,
        }
    }

    /// True if the entry simply does not exist
    pub fn is_miss(&self) -> bool {
        self.kind() == ErrorKind::Miss
    }

    /// Whether the error should abort the caller's work. A miss is the only
    /// non-fatal error.
    pub fn is_fatal(&self) -> bool {
        !self.is_miss()
    }

    /// The file or directory the error concerns, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            CacheError::Miss { path, .. }
            | CacheError::Open { path, .. }
            | CacheError::Read { path, .. }
            | CacheError::Parse { path, .. }
            | CacheError::Expiration { path, .. }
            | CacheError::Decode { path, .. }
            | CacheError::Write { path, .. }
            | CacheError::Remove { path, .. } => Some(path),
            CacheError::CreateDir { dir, .. } => Some(dir),
            CacheError::Encoding { .. }
            | CacheError::Serialize { .. }
            | CacheError::InvalidDuration { .. } => None,
        }
    }

    /// A remediation hint for the user, if there is a useful one
    pub fn help(&self) -> Option<String> {
        match self {
            CacheError::Miss { .. } => None,
            CacheError::Open { path, .. } | CacheError::Read { path, .. } => Some(format!(
                "ensure you have permissions to read '{}'",
                path.display()
            )),
            CacheError::Parse { path, .. } | CacheError::Expiration { path, .. } => Some(format!(
                "try deleting the files in your cache at '{}'",
                parent_of(path).display()
            )),
            CacheError::Decode { key, .. } => Some(format!(
                "the entry for '{key}' holds a different shape of data; clear it and fetch again"
            )),
            CacheError::Encoding { .. } => {
                Some("only UTF-8 (e.g. JSON) payloads can be cached".to_string())
            }
            CacheError::Serialize { .. } => {
                Some("this is a bug in jsoncache, please report it".to_string())
            }
            CacheError::CreateDir { dir, .. } => Some(format!(
                "ensure you have permissions to '{}'",
                parent_of(dir).display()
            )),
            CacheError::Write { path, .. } | CacheError::Remove { path, .. } => Some(format!(
                "ensure you have permissions to '{}'",
                parent_of(path).display()
            )),
            CacheError::InvalidDuration { .. } => {
                Some("use a duration such as \"90s\", \"15m\" or \"1h30m\"".to_string())
            }
        }
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}
