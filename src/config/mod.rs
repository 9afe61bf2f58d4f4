//! Configuration management
//!
//! Settings come from an optional YAML file, then environment variables, then
//! command-line flags (applied by the binary).

pub mod loader;
pub mod models;

pub use models::*;

use crate::utils::error::{ConformError, Result};
use std::path::Path;
use tracing::info;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

impl ConformConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConformError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConformConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConformError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint.url).map_err(|e| {
            ConformError::Config(format!("Invalid endpoint URL '{}': {}", self.endpoint.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConformError::Config(format!(
                "Endpoint URL requires http:// or https://, got: {}",
                self.endpoint.url
            )));
        }

        if self.endpoint.timeout_ms == 0 {
            return Err(ConformError::Config(
                "Endpoint timeout must be greater than zero".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConformError::Config(format!(
                "Unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Log where the configuration came from and the endpoint it targets
    ///
    /// Loading itself does not log; call this once the subscriber is installed.
    pub fn log_summary(&self, source: Option<&Path>) {
        match source {
            Some(path) => info!("Configuration loaded from: {:?}", path),
            None => info!("Using default configuration"),
        }
        info!(
            url = %self.endpoint.url,
            timeout_ms = self.endpoint.timeout_ms,
            load_contract = self.endpoint.load_contract,
            "Endpoint settings"
        );
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
