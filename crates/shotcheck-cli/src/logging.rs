//! `tracing` subscriber setup

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Build the event filter; `RUST_LOG` wins over the verbosity flags
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install the global subscriber, writing to stderr
///
/// # Errors
///
/// Returns `Logging` if a global subscriber is already set.
pub fn init(verbosity: Verbosity) -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
}
