//! # rpc-conform
//!
//! Scripted conformance-test driver for JSON-RPC services.
//!
//! A test script lists calls, one per line, optionally grouped into batches.
//! The driver executes every call against an endpoint and writes one
//! `interface|method|arguments|status|response` record per call, in script
//! order, so that the output of one implementation can be diffed against
//! another's.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpc_conform::config::EndpointConfig;
//! use rpc_conform::rpc::HttpRpcClient;
//! use rpc_conform::ScriptRunner;
//! use std::io::Cursor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpRpcClient::connect(&EndpointConfig::new("http://localhost:9233/")).await?;
//!
//!     let script = "Calc|add|[1,2]|ok|3\nstart_batch\nCalc|add|[2,2]|ok|4\nend_batch\n";
//!     let mut out = Vec::new();
//!     let summary = ScriptRunner::new(&client).run(Cursor::new(script), &mut out).await?;
//!
//!     println!("{} calls", summary.calls);
//!     print!("{}", String::from_utf8(out)?);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod rpc;
pub mod utils;

// Re-export main types
pub use config::ConformConfig;
pub use engine::{CallStatus, ResultRecord, RunSummary, ScriptDirective, ScriptRunner};
pub use rpc::{HttpRpcClient, LocalRpcClient, RpcClient, RpcClientError};
pub use utils::error::{ConformError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
