//! Configuration models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default endpoint of the server under test
pub const DEFAULT_URL: &str = "http://localhost:9233/";

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConformConfig {
    /// Endpoint under test
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Diagnostics output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoint connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL accepting JSON-RPC POSTs
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Static headers sent with every request
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Fetch the server IDL and resolve names against it
    #[serde(default = "default_true")]
    pub load_contract: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            headers: HashMap::new(),
            load_contract: true,
        }
    }
}

impl EndpointConfig {
    /// Create a config for `url` with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Add a static header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Skip fetching the IDL
    pub fn without_contract(mut self) -> Self {
        self.load_contract = false;
        self
    }
}

/// Diagnostics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level (`RUST_LOG` takes precedence)
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
