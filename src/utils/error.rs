//! Error handling for the conformance driver
//!
//! Errors here are fatal for a run. Per-call failures are recorded in the
//! result stream instead and never reach this type.

use crate::engine::script::ParseError;
use crate::rpc::RpcClientError;
use thiserror::Error;

/// Result type alias for the driver
pub type Result<T> = std::result::Result<T, ConformError>;

/// Fatal errors
#[derive(Error, Debug)]
pub enum ConformError {
    /// Malformed script line or misplaced batch directive
    #[error("Script error at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },

    /// Batch results that cannot be matched to queued calls
    #[error("Batch protocol violation: {0}")]
    BatchProtocolViolation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// RPC client setup errors
    #[error("RPC client error: {0}")]
    Rpc(#[from] RpcClientError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConformError {
    /// Attach a script line number to a parse error
    pub fn parse(line: usize, source: ParseError) -> Self {
        ConformError::Parse { line, source }
    }

    /// Script line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ConformError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
