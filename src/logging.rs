//! Logging configuration for adls-proxy.
//!
//! Logs go to stderr, where the Functions host collects custom handler output.
//! The filter comes from `RUST_LOG`, falling back to the configured default.

use tracing_subscriber::EnvFilter;

/// Builds the filter from `RUST_LOG`, or `default` when unset or invalid.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initializes logging to stderr.
///
/// ANSI colors are disabled when `no_color` is set, which keeps host log
/// streams readable.
pub fn init_stderr_logging(default: &str, no_color: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .init();
}
