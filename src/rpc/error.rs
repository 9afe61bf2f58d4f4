//! RPC client errors

use super::protocol::JsonRpcError;
use serde_json::Value;
use thiserror::Error;

/// Result type for RPC client operations
pub type RpcResult<T> = std::result::Result<T, RpcClientError>;

/// Errors raised by an RPC client
#[derive(Error, Debug)]
pub enum RpcClientError {
    /// Failure reported by the remote side
    #[error("RPC error [{code}]: {message}")]
    Remote {
        code: Value,
        message: String,
        data: Option<Value>,
    },

    /// Interface not exposed by the server
    #[error("Unknown interface: {0}")]
    UnknownInterface(String),

    /// Function not exposed by the interface
    #[error("Unknown function: {interface}.{function}")]
    UnknownFunction { interface: String, function: String },

    /// Connection or I/O failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed or mismatched response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RpcClientError {
    /// Whether the remote side reported this error
    pub fn is_remote(&self) -> bool {
        matches!(self, RpcClientError::Remote { .. })
    }

    /// Code carried by a remote error
    pub fn remote_code(&self) -> Option<&Value> {
        match self {
            RpcClientError::Remote { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<JsonRpcError> for RpcClientError {
    fn from(error: JsonRpcError) -> Self {
        RpcClientError::Remote {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

impl From<reqwest::Error> for RpcClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcClientError::Transport(format!("request timed out: {}", e))
        } else if e.is_connect() {
            RpcClientError::Transport(format!("connection failed: {}", e))
        } else if e.is_decode() {
            RpcClientError::Protocol(format!("failed to decode response: {}", e))
        } else {
            RpcClientError::Transport(e.to_string())
        }
    }
}
