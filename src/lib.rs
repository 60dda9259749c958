//! jsoncache - a minimal on-disk cache for expiring JSON payloads
//!
//! Each entry is a file holding the payload and an absolute expiry time, so
//! the result of an expensive call can be reused across process runs without
//! a database or cache server.
//!
//! ```no_run
//! use jsoncache::cache::CacheStore;
//!
//! let cache = CacheStore::new("~/.cache/my-tool");
//! cache.set("forecast", br#"{"temp":21}"#, "15m")?;
//! if let Some(data) = cache.get("forecast")?.into_data() {
//!     println!("{}", String::from_utf8_lossy(&data));
//! }
//! # Ok::<(), jsoncache::cache::CacheError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod paths;
