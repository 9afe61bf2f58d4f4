//! Environment overrides

use super::models::ConformConfig;
use crate::utils::error::{ConformError, Result};
use std::env;

/// Endpoint URL override
pub const ENV_URL: &str = "CONFORM_URL";
/// Timeout override, milliseconds
pub const ENV_TIMEOUT_MS: &str = "CONFORM_TIMEOUT_MS";
/// Log level override
pub const ENV_LOG_LEVEL: &str = "CONFORM_LOG_LEVEL";
/// JSON log output toggle
pub const ENV_LOG_JSON: &str = "CONFORM_LOG_JSON";

impl ConformConfig {
    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.endpoint.url = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.endpoint.timeout_ms = timeout
                .parse()
                .map_err(|e| ConformError::Config(format!("Invalid {}: {}", ENV_TIMEOUT_MS, e)))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            self.logging.json = json
                .parse()
                .map_err(|e| ConformError::Config(format!("Invalid {}: {}", ENV_LOG_JSON, e)))?;
        }
        Ok(self)
    }
}
