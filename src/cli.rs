//! Command-line interface for jsoncache
//!
//! Parses arguments with clap and runs a single cache operation against the
//! configured directory. Payloads go to stdout; status messages and hints go
//! to stderr so output can be piped.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use thiserror::Error;

use crate::cache::{CacheStore, Lookup, Status};
use crate::config::{default_cache_dir, CacheConfig, DEFAULT_DIR_NAME};
use crate::paths::extract_path;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The key is empty or could escape the cache directory
    #[error("Invalid key: '{0}'. Keys must be non-empty and must not contain path separators")]
    InvalidKey(String),
}

/// jsoncache - store and fetch expiring JSON payloads on disk
#[derive(Parser, Debug)]
#[command(name = "jsoncache")]
#[command(about = "Store and fetch expiring JSON payloads on disk")]
#[command(version)]
pub struct Cli {
    /// Cache directory (a leading ~ is expanded)
    #[arg(long, env = "JSONCACHE_DIR", value_name = "DIR")]
    pub dir: Option<String>,

    /// Turn every operation into a no-op
    #[arg(long, env = "JSONCACHE_DISABLE", value_parser = FalseyValueParser::new())]
    pub disable: bool,

    /// Directory name to use under the temp dir if DIR cannot be expanded
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DIR_NAME)]
    pub fallback_name: String,

    /// Log cache activity to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached payload for KEY
    Get { key: String },

    /// Cache VALUE (or stdin) under KEY
    ///
    /// Examples:
    ///   jsoncache set weather --ttl 15m '{"temp":21}'
    ///   curl -s https://example.com/api | jsoncache set api --ttl 1h30m
    Set {
        key: String,
        /// How long the entry stays valid, e.g. 90s, 15m, 1h30m
        #[arg(long, value_name = "DURATION")]
        ttl: String,
        /// Payload to store; read from stdin when omitted
        value: Option<String>,
    },

    /// Remove the entry for KEY
    Clear { key: String },

    /// Print the file path used for KEY
    Path {
        key: String,
        /// Print the path relative to this directory when it is a prefix
        #[arg(long, value_name = "BASE")]
        relative_to: Option<String>,
    },
}

/// Process exit status for a CLI run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The operation succeeded (and for `get`, found a fresh entry)
    Success = 0,
    /// `get` found nothing usable: a miss, an expired entry or a disabled cache
    NotFound = 1,
    /// The operation failed
    Failure = 2,
}

impl Exit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Command {
    fn key(&self) -> &str {
        match self {
            Command::Get { key }
            | Command::Set { key, .. }
            | Command::Clear { key }
            | Command::Path { key, .. } => key,
        }
    }
}

impl Cli {
    /// Builds the cache configuration from flags and environment
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            dir: self.dir.clone().unwrap_or_else(default_cache_dir),
            disabled: self.disable,
            fallback_dir_name: self.fallback_name.clone(),
        }
    }
}

/// Checks that a key can be used as a file name inside the cache directory.
///
/// # Returns
/// * `Ok(())` if the key is usable
/// * `Err(CliError::InvalidKey)` if it is empty, `.`/`..`, or contains a separator
pub fn validate_key(key: &str) -> Result<(), CliError> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(CliError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Runs the parsed command.
///
/// `input` is read only by `set` without a VALUE. Returns the exit status;
/// I/O errors on the standard streams are returned as errors.
pub fn run<R: Read, W: Write, E: Write>(
    cli: &Cli,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> io::Result<Exit> {
    if let Err(e) = validate_key(cli.command.key()) {
        writeln!(err, "{}", e)?;
        return Ok(Exit::Failure);
    }

    let cache = CacheStore::from_config(&cli.cache_config());

    match &cli.command {
        Command::Get { key } => match cache.get(key) {
            Ok(Lookup::Hit { data, .. }) => {
                out.write_all(&data)?;
                Ok(Exit::Success)
            }
            Ok(lookup) => {
                writeln!(err, "{}", Status::from_lookup(key, &lookup))?;
                Ok(Exit::NotFound)
            }
            Err(e) => {
                writeln!(err, "{}", Status::from_error(&e))?;
                Ok(if e.is_fatal() { Exit::Failure } else { Exit::NotFound })
            }
        },
        Command::Set { key, ttl, value } => {
            let payload = match value {
                Some(value) => value.clone().into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    input.read_to_end(&mut buf)?;
                    buf
                }
            };
            match cache.set(key, &payload, ttl) {
                Ok(()) => {
                    writeln!(err, "{}", Status::stored(key))?;
                    Ok(Exit::Success)
                }
                Err(e) => {
                    writeln!(err, "{}", Status::from_error(&e))?;
                    Ok(Exit::Failure)
                }
            }
        }
        Command::Clear { key } => match cache.clear(key) {
            Ok(removed) => {
                writeln!(err, "{}", Status::cleared(key, removed))?;
                Ok(Exit::Success)
            }
            Err(e) => {
                writeln!(err, "{}", Status::from_error(&e))?;
                Ok(Exit::Failure)
            }
        },
        Command::Path { key, relative_to } => {
            let path = cache.cache_filepath(key).to_string_lossy().into_owned();
            match relative_to {
                Some(base) => writeln!(out, "{}", extract_path(&path, base))?,
                None => writeln!(out, "{}", path)?,
            }
            Ok(Exit::Success)
        }
    }
}
