//! RPC client layer
//!
//! The execution engine drives any [`RpcClient`]. Two implementations ship
//! with the crate:
//!
//! - [`HttpRpcClient`]: JSON-RPC 2.0 over HTTP against a live endpoint, with
//!   names resolved against the server's IDL
//! - [`LocalRpcClient`]: an in-process dispatch table of handlers
//!
//! # Usage
//!
//! ```rust,ignore
//! use rpc_conform::config::EndpointConfig;
//! use rpc_conform::rpc::{HttpRpcClient, RpcClient};
//!
//! let client = HttpRpcClient::connect(&EndpointConfig::new("http://localhost:9233/")).await?;
//! let sum = client.invoke("Calc", "add", vec![1.into(), 2.into()]).await?;
//!
//! let mut batch = client.open_batch();
//! batch.queue("Calc", "add", vec![1.into(), 2.into()])?;
//! batch.queue("Calc", "subtract", vec![5.into(), 3.into()])?;
//! let results = batch.send().await?;
//! ```

pub mod client;
pub mod contract;
pub mod error;
pub mod http;
pub mod local;
pub mod protocol;

pub use client::{BatchHandle, BatchResult, CallToken, RpcClient};
pub use contract::Contract;
pub use error::{RpcClientError, RpcResult};
pub use http::HttpRpcClient;
pub use local::{LocalRpcClient, ResponseOrder};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
