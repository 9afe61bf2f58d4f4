//! Result classification and the result stream
//!
//! Every executed call ends up as one line:
//!
//! ```text
//! interface|method|arguments|status|response
//! ```
//!
//! `status` is `ok`, `rpcErr` (remote error; the response is its code) or
//! `err` (anything else; the response is `""` and the failure is logged).

use crate::rpc::{RpcClientError, RpcResult};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::str::FromStr;
use tracing::{debug, error};

/// Classification of a call's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "rpcErr")]
    RpcErr,
    #[serde(rename = "err")]
    Err,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Ok => "ok",
            CallStatus::RpcErr => "rpcErr",
            CallStatus::Err => "err",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "ok" => Ok(CallStatus::Ok),
            "rpcErr" => Ok(CallStatus::RpcErr),
            "err" => Ok(CallStatus::Err),
            _ => Err(format!("Unknown call status: {}", s)),
        }
    }
}

/// Status plus payload of one call
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub status: CallStatus,
    pub payload: Value,
}

impl CallOutcome {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: CallStatus::Ok,
            payload,
        }
    }

    /// Remote error; the payload is its code exactly as reported
    pub fn rpc_err(code: Value) -> Self {
        Self {
            status: CallStatus::RpcErr,
            payload: code,
        }
    }

    pub fn unexpected() -> Self {
        Self {
            status: CallStatus::Err,
            payload: Value::String(String::new()),
        }
    }

    /// Classify an invocation result
    ///
    /// Returns the local error alongside an `err` outcome so the caller can
    /// report it.
    pub fn classify(result: RpcResult<Value>) -> (Self, Option<RpcClientError>) {
        match result {
            Ok(value) => (Self::ok(value), None),
            Err(RpcClientError::Remote { code, .. }) => (Self::rpc_err(code), None),
            Err(e) => (Self::unexpected(), Some(e)),
        }
    }
}

/// One line of the result stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub interface: String,
    pub method: String,
    pub arguments_encoded: String,
    pub status: CallStatus,
    pub response_encoded: String,
}

impl ResultRecord {
    /// Build a record, encoding the payload as JSON
    pub fn new(
        interface: &str,
        method: &str,
        arguments_encoded: &str,
        outcome: &CallOutcome,
    ) -> Result<Self> {
        Ok(Self {
            interface: interface.to_string(),
            method: method.to_string(),
            arguments_encoded: arguments_encoded.to_string(),
            status: outcome.status,
            response_encoded: serde_json::to_string(&outcome.payload)?,
        })
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.interface, self.method, self.arguments_encoded, self.status, self.response_encoded
        )
    }
}

/// Counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub calls: usize,
    pub ok: usize,
    pub rpc_err: usize,
    pub err: usize,
    pub batches: usize,
}

impl RunSummary {
    fn count(&mut self, status: CallStatus) {
        self.calls += 1;
        match status {
            CallStatus::Ok => self.ok += 1,
            CallStatus::RpcErr => self.rpc_err += 1,
            CallStatus::Err => self.err += 1,
        }
    }
}

/// Classifies outcomes and appends records to the output
pub struct ResultRecorder<W: Write> {
    out: W,
    summary: RunSummary,
}

impl<W: Write> ResultRecorder<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: RunSummary::default(),
        }
    }

    /// Await `call`, then classify and record its result
    pub async fn execute<F>(
        &mut self,
        interface: &str,
        method: &str,
        arguments_encoded: &str,
        call: F,
    ) -> Result<ResultRecord>
    where
        F: Future<Output = RpcResult<Value>>,
    {
        let result = call.await;
        self.record(interface, method, arguments_encoded, result)
    }

    /// Classify an already available result and record it
    pub fn record(
        &mut self,
        interface: &str,
        method: &str,
        arguments_encoded: &str,
        result: RpcResult<Value>,
    ) -> Result<ResultRecord> {
        let (outcome, failure) = CallOutcome::classify(result);
        if let Some(e) = failure {
            error!(interface, method, error = %e, "ERR: call failed");
        }

        let record = ResultRecord::new(interface, method, arguments_encoded, &outcome)?;
        writeln!(self.out, "{}", record)?;
        self.out.flush()?;

        debug!(interface, method, status = %record.status, "Recorded result");
        self.summary.count(record.status);
        Ok(record)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub(crate) fn note_batch(&mut self) {
        self.summary.batches += 1;
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
