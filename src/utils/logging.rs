//! Diagnostics output
//!
//! Logs go to stderr so they never mix with the result stream.

use crate::config::LoggingConfig;
use crate::utils::error::{ConformError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.level.to_lowercase())
            .map_err(|e| ConformError::Config(format!("Invalid log level: {}", e))),
    }
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ConformError::Config(format!("Failed to install logger: {}", e)))
}
