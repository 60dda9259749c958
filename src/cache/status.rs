//! User-facing summaries of cache operation outcomes

use std::fmt;

use super::error::CacheError;
use super::store::Lookup;

/// Outcome of a cache operation, rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Whether the operation did what was asked
    pub success: bool,
    /// Human-readable description
    pub message: String,
    /// Remediation hint, if any
    pub help: Option<String>,
    /// Whether the caller should treat this as a hard failure
    pub fatal: bool,
}

impl Status {
    fn success(message: String) -> Self {
        Self {
            success: true,
            message,
            help: None,
            fatal: false,
        }
    }

    /// Status for the result of a read
    ///
    /// An expired entry is a success that simply yields no data.
    pub fn from_lookup<T>(key: &str, lookup: &Lookup<T>) -> Self {
        match lookup {
            Lookup::Hit { .. } => Self::success(format!("cache retrieved for key '{}'", key)),
            Lookup::Expired { .. } => Self::success(format!("cache expired for key '{}'", key)),
            Lookup::Disabled => Self::success("cache is disabled".to_string()),
        }
    }

    /// Status for a completed write
    pub fn stored(key: &str) -> Self {
        Self::success(format!("cache set for key '{}'", key))
    }

    /// Status for a completed clear
    pub fn cleared(key: &str, removed: bool) -> Self {
        if removed {
            Self::success(format!("cache cleared for key '{}'", key))
        } else {
            Self::success(format!("no cache to clear for key '{}'", key))
        }
    }

    /// Status for a failed operation
    pub fn from_error(err: &CacheError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            help: err.help(),
            fatal: err.is_fatal(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(help) = &self.help {
            write!(f, "\nhelp: {}", help)?;
        }
        Ok(())
    }
}
