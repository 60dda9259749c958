//! Log output for the `jsoncache` binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to applications. This is the one the bundled CLI uses.

use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Installs a global subscriber that writes human-readable logs to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` over the
/// default `warn`. Stdout is left untouched so cached payloads can be piped.
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
}
