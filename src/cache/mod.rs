//! Cache module for storing expiring payloads on disk
//!
//! Each cache key maps to one JSON file holding the payload and the time it
//! expires. Expired entries are reported as such and left on disk; there is
//! no in-memory layer, locking, or background cleanup.

mod duration;
mod error;
mod status;
mod store;

pub use duration::{parse_duration, DurationError};
pub use error::{CacheError, ErrorKind};
pub use status::Status;
pub use store::{CacheStore, Lookup};
