//! Structured logging setup for the command-line binary
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. Output goes to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::io::configuration::{DEFAULT_LOG_DIRECTIVE, QUIET_LOG_DIRECTIVE};

/// Filter honoring `RUST_LOG`, or `warn` when `quiet` is set
pub fn env_filter(quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new(QUIET_LOG_DIRECTIVE);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Install the global fmt subscriber
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(quiet: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(quiet))
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}
