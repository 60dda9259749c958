//! Cache store persisting payloads to disk
//!
//! Provides a `CacheStore` that writes each entry to its own JSON file
//! holding the payload and an absolute expiry timestamp. Nothing is kept in
//! memory; every call round-trips through the filesystem.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::duration::{parse_duration, DurationError};
use super::error::CacheError;
use crate::config::CacheConfig;
use crate::paths::{dir_exists, expand_home};

/// On-disk wrapper around a cached payload
///
/// `data` is the payload verbatim; `expires` is an RFC-3339 timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<S> {
    /// When the entry stops being valid
    expires: String,
    /// The cached payload
    data: S,
}

/// Result of a successful read from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T = Vec<u8>> {
    /// The entry exists and has not expired
    Hit {
        /// The cached payload
        data: T,
        /// When the entry expires
        expires: DateTime<Utc>,
    },
    /// The entry exists but its expiry has passed. The file is left on disk.
    Expired {
        /// When the entry expired
        expires: DateTime<Utc>,
    },
    /// The store is disabled and did not look
    Disabled,
}

impl<T> Lookup<T> {
    /// True only for a fresh hit
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Hit { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Lookup::Expired { .. })
    }

    /// Returns the payload of a hit
    pub fn data(&self) -> Option<&T> {
        match self {
            Lookup::Hit { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Consumes the lookup, returning the payload of a hit
    pub fn into_data(self) -> Option<T> {
        match self {
            Lookup::Hit { data, .. } => Some(data),
            _ => None,
        }
    }

    fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Lookup<U>, E> {
        Ok(match self {
            Lookup::Hit { data, expires } => Lookup::Hit {
                data: f(data)?,
                expires,
            },
            Lookup::Expired { expires } => Lookup::Expired { expires },
            Lookup::Disabled => Lookup::Disabled,
        })
    }
}

/// Reads and writes expiring cache entries under a base directory
///
/// Entries live at `<dir>/<key>.json`. Keys are used verbatim in the file
/// name, so callers must only pass file-name-safe keys.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    dir: PathBuf,
    /// When set, all operations are no-ops
    disabled: bool,
}

impl CacheStore {
    /// Creates a store for `dir`, expanding a leading `~`.
    ///
    /// Never fails: if `dir` cannot be expanded the store falls back to a
    /// directory under the system temp dir. The directory itself is not
    /// created until the first write.
    pub fn new(dir: &str) -> Self {
        Self::from_config(&CacheConfig::with_dir(dir))
    }

    /// Creates a store from a [`CacheConfig`]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            dir: resolve_base_dir(&config.dir, &config.fallback_dir_name),
            disabled: config.disabled,
        }
    }

    /// Creates a store for an already resolved directory
    ///
    /// Useful for testing or when the caller manages paths itself.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            disabled: false,
        }
    }

    /// Enables or disables the store
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The base directory entries are stored under
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the path of the entry file for `key`. Does no I/O.
    pub fn cache_filepath(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Checks that the entry file for `key` exists and can be opened
    ///
    /// # Returns
    /// * `Ok(path)` if the file could be opened
    /// * `Err(CacheError::Miss)` if there is no file
    /// * `Err(CacheError::Open)` for any other failure
    ///
    /// Both errors carry the computed path.
    pub fn verify_cache_file(&self, key: &str) -> Result<PathBuf, CacheError> {
        let path = self.cache_filepath(key);
        match File::open(&path) {
            Ok(_) => Ok(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::Miss {
                key: key.to_string(),
                path,
            }),
            Err(source) => Err(CacheError::Open {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    /// Reads the entry for `key`
    ///
    /// An expired entry is reported as `Lookup::Expired` rather than an
    /// error, and its file is left in place.
    ///
    /// # Errors
    /// * `CacheError::Miss` if no entry exists (non-fatal)
    /// * `CacheError::Open` / `CacheError::Read` on I/O failures
    /// * `CacheError::Parse` / `CacheError::Expiration` if the file is corrupt
    pub fn get(&self, key: &str) -> Result<Lookup, CacheError> {
        if self.disabled {
            return Ok(Lookup::Disabled);
        }

        let path = self.verify_cache_file(key)?;
        let contents = fs::read(&path).map_err(|source| CacheError::Read {
            path: path.clone(),
            source,
        })?;

        let envelope: Envelope<String> =
            serde_json::from_slice(&contents).map_err(|source| CacheError::Parse {
                path: path.clone(),
                source,
            })?;

        let expires = DateTime::parse_from_rfc3339(&envelope.expires)
            .map_err(|source| CacheError::Expiration {
                path: path.clone(),
                source,
            })?
            .with_timezone(&Utc);

        if expires < Utc::now() {
            debug!(key, %expires, "cache expired");
            return Ok(Lookup::Expired { expires });
        }

        debug!(key, "cache retrieved");
        Ok(Lookup::Hit {
            data: envelope.data.into_bytes(),
            expires,
        })
    }

    /// Reads the entry for `key` and decodes its payload as JSON
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>, CacheError> {
        self.get(key)?.try_map(|data| {
            serde_json::from_slice(&data).map_err(|source| CacheError::Decode {
                key: key.to_string(),
                path: self.cache_filepath(key),
                source,
            })
        })
    }

    /// Writes `payload` for `key`, valid for `duration` (e.g. `"15m"`, `"1h30m"`)
    ///
    /// Replaces any existing entry and creates the cache directory if needed.
    /// A disabled store accepts the call and writes nothing.
    ///
    /// # Errors
    /// * `CacheError::InvalidDuration` if `duration` cannot be parsed
    /// * see [`CacheStore::set_for`] for the rest
    pub fn set(&self, key: &str, payload: &[u8], duration: &str) -> Result<(), CacheError> {
        if self.disabled {
            return Ok(());
        }

        let ttl = parse_duration(duration).map_err(|source| CacheError::InvalidDuration {
            key: key.to_string(),
            source,
        })?;
        self.set_for(key, payload, ttl)
    }

    /// Writes `payload` for `key`, valid for `ttl` from now
    ///
    /// # Errors
    /// * `CacheError::Encoding` if the payload is not UTF-8
    /// * `CacheError::CreateDir` if the cache directory cannot be created
    /// * `CacheError::Write` if the entry file cannot be written
    pub fn set_for(&self, key: &str, payload: &[u8], ttl: Duration) -> Result<(), CacheError> {
        if self.disabled {
            return Ok(());
        }

        let data = std::str::from_utf8(payload).map_err(|source| CacheError::Encoding {
            key: key.to_string(),
            source,
        })?;

        let expires = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| CacheError::InvalidDuration {
                key: key.to_string(),
                source: DurationError::OutOfRange(ttl.to_string()),
            })?;

        let envelope = Envelope {
            expires: expires.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            data,
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(|source| {
            CacheError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;

        let path = self.cache_filepath(key);
        let dir = path.parent().unwrap_or(&self.dir);
        if !dir_exists(dir) {
            fs::create_dir_all(dir).map_err(|source| CacheError::CreateDir {
                dir: dir.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, json).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(key, %expires, "cache set");
        Ok(())
    }

    /// Serializes `value` as JSON and writes it for `key`
    pub fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        duration: &str,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_vec(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &payload, duration)
    }

    /// Deletes the entry for `key`
    ///
    /// Clearing a key with no entry succeeds.
    ///
    /// # Returns
    /// * `Ok(true)` if a file was removed
    /// * `Ok(false)` if there was nothing to remove or the store is disabled
    pub fn clear(&self, key: &str) -> Result<bool, CacheError> {
        if self.disabled {
            return Ok(false);
        }

        let path = self.cache_filepath(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "cache cleared");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "no cache file to clear");
                Ok(false)
            }
            Err(source) => Err(CacheError::Remove {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    /// Returns the cached payload for `key`, or runs `fetch` and caches its
    /// result for `ttl`.
    ///
    /// The cache never causes this to fail: read errors fall through to
    /// `fetch` and write errors are logged. Errors from `fetch` are returned
    /// as-is and nothing is cached.
    pub fn memoize<F, E>(&self, key: &str, ttl: Duration, fetch: F) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        match self.get(key) {
            Ok(Lookup::Hit { data, .. }) => return Ok(data),
            Ok(_) => {}
            Err(e) if e.is_miss() => {}
            Err(e) => warn!(key, error = %e, "cache read failed, fetching fresh data"),
        }

        let data = fetch()?;
        if let Err(e) = self.set_for(key, &data, ttl) {
            warn!(key, error = %e, "failed to cache fetched data");
        }
        Ok(data)
    }
}

/// Expands `dir`, falling back to `<temp>/<last segment of dir>` (or
/// `<temp>/<fallback_name>`) if that fails.
fn resolve_base_dir(dir: &str, fallback_name: &str) -> PathBuf {
    if !dir.is_empty() {
        match expand_home(dir) {
            Ok(expanded) => return absolutize(expanded),
            Err(e) => warn!(dir, error = %e, "cache directory could not be expanded"),
        }
    }

    let name = Path::new(dir)
        .file_name()
        .filter(|name| *name != "~")
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| fallback_name.into());
    let fallback = std::env::temp_dir().join(name);
    warn!(dir = %fallback.display(), "using temporary cache directory");
    fallback
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
