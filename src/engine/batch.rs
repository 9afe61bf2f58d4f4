//! Batch accumulation and flushing
//!
//! Calls between `start_batch` and `end_batch` are queued on a batch handle,
//! sent as one request, and recorded in the order they were queued.
//!
//! Batched records always carry the argument array re-encoded as compact
//! JSON, whether or not the call reached the server.

use super::recorder::ResultRecorder;
use super::script::CallDescriptor;
use crate::rpc::protocol::split_qualified_method;
use crate::rpc::{BatchHandle, CallToken, RpcClient, RpcClientError, RpcResult};
use crate::utils::error::{ConformError, Result};
use std::io::Write;
use tracing::{debug, error, info};

fn encode_arguments(call: &CallDescriptor) -> Result<String> {
    Ok(serde_json::to_string(&call.arguments)?)
}

struct QueuedCall {
    call: CallDescriptor,
    /// Token of the submitted request, or why the call could not be queued
    token: RpcResult<CallToken>,
}

/// Calls queued since `start_batch`
pub struct PendingBatch {
    handle: Box<dyn BatchHandle>,
    calls: Vec<QueuedCall>,
    opened_at: usize,
}

impl PendingBatch {
    /// Open a batch on `client`
    pub fn open<C: RpcClient + ?Sized>(client: &C, opened_at: usize) -> Self {
        Self {
            handle: client.open_batch(),
            calls: Vec::new(),
            opened_at,
        }
    }

    /// Queue a call without executing it
    pub fn enqueue(&mut self, call: CallDescriptor) {
        let token = self
            .handle
            .queue(&call.interface, &call.method, call.arguments.clone());
        if let Err(e) = &token {
            debug!(interface = %call.interface, method = %call.method, error = %e, "Call not queued");
        }
        self.calls.push(QueuedCall { call, token });
    }

    /// Number of calls queued so far
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Line of the `start_batch` directive
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }

    /// Send the batch and record one result per queued call
    ///
    /// Returns the number of records written. A result count that differs
    /// from the number of submitted requests is fatal.
    pub async fn flush<W: Write>(self, recorder: &mut ResultRecorder<W>) -> Result<usize> {
        let PendingBatch { handle, calls, .. } = self;
        let submitted = handle.len();
        let total = calls.len();

        let results = match handle.send().await {
            Ok(results) => results,
            Err(e) => {
                error!(calls = total, error = %e, "ERR: batch send failed");
                for queued in &calls {
                    let call = &queued.call;
                    recorder.record(
                        &call.interface,
                        &call.method,
                        &encode_arguments(call)?,
                        Err(RpcClientError::Transport(format!("batch send failed: {}", e))),
                    )?;
                }
                return Ok(total);
            }
        };

        if results.count() != submitted {
            return Err(ConformError::BatchProtocolViolation(format!(
                "submitted {} calls but received {} results",
                submitted,
                results.count()
            )));
        }

        let mut index = 0;
        for queued in calls {
            let token = match queued.token {
                Ok(token) => token,
                Err(e) => {
                    let call = &queued.call;
                    recorder.record(&call.interface, &call.method, &encode_arguments(call)?, Err(e))?;
                    continue;
                }
            };

            let request = results.request_at(index).ok_or_else(|| {
                ConformError::BatchProtocolViolation(format!("no request at position {}", index))
            })?;
            if request.id.as_ref() != Some(token.id()) {
                return Err(ConformError::BatchProtocolViolation(format!(
                    "request at position {} has id {:?}, expected {}",
                    index,
                    request.id,
                    token.id()
                )));
            }

            let (interface, method) = split_qualified_method(&request.method);
            let arguments = serde_json::to_string(&request.params_or_empty())?;
            recorder.record(interface, method, &arguments, results.result_at(index))?;
            index += 1;
        }

        info!(submitted, recorded = total, "Batch flushed");
        Ok(total)
    }
}
