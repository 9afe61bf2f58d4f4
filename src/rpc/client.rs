//! RPC client abstraction
//!
//! The execution engine only talks to these traits. A client either invokes a
//! call right away or hands out a batch handle that queues calls and submits
//! them together.

use super::error::{RpcClientError, RpcResult};
use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// An RPC client able to run single calls and open batches
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Invoke `interface.function` with positional arguments
    async fn invoke(&self, interface: &str, function: &str, args: Vec<Value>)
    -> RpcResult<Value>;

    /// Open a batch-scoped handle
    fn open_batch(&self) -> Box<dyn BatchHandle>;
}

/// Queues calls without executing them until `send`
#[async_trait]
pub trait BatchHandle: Send {
    /// Queue a call, returning the token identifying its request
    fn queue(&mut self, interface: &str, function: &str, args: Vec<Value>)
    -> RpcResult<CallToken>;

    /// Number of queued calls
    fn len(&self) -> usize;

    /// Whether nothing has been queued
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Submit all queued calls as one request
    async fn send(self: Box<Self>) -> RpcResult<BatchResult>;
}

/// Identifies one queued request inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct CallToken(Value);

impl CallToken {
    /// Wrap a request id
    pub fn new(id: Value) -> Self {
        Self(id)
    }

    /// Request id this token stands for
    pub fn id(&self) -> &Value {
        &self.0
    }
}

/// Outcome of a submitted batch, positionally aligned with the requests
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    requests: Vec<JsonRpcRequest>,
    responses: Vec<JsonRpcResponse>,
}

impl BatchResult {
    /// Match responses to requests by id and order them by submission
    ///
    /// Responses may arrive in any order. A response whose id is missing,
    /// unknown or repeated is a protocol error. Requests left without a
    /// response are dropped from the positional results, so `count` falls
    /// short of the number of requests.
    pub fn correlate(
        requests: Vec<JsonRpcRequest>,
        responses: Vec<JsonRpcResponse>,
    ) -> RpcResult<Self> {
        let mut positions = HashMap::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let id = request
                .id
                .as_ref()
                .ok_or_else(|| RpcClientError::Protocol("batch request without id".to_string()))?;
            positions.insert(id.to_string(), index);
        }

        let mut slots: Vec<Option<JsonRpcResponse>> = vec![None; requests.len()];
        for response in responses {
            let key = match &response.id {
                Some(id) if !id.is_null() => id.to_string(),
                _ => {
                    return Err(match response.error {
                        Some(error) => error.into(),
                        None => RpcClientError::Protocol("batch response without id".to_string()),
                    });
                }
            };
            let index = *positions.get(&key).ok_or_else(|| {
                RpcClientError::Protocol(format!("response id {} matches no request", key))
            })?;
            if slots[index].is_some() {
                return Err(RpcClientError::Protocol(format!(
                    "duplicate response for id {}",
                    key
                )));
            }
            slots[index] = Some(response);
        }

        Ok(Self {
            requests,
            responses: slots.into_iter().flatten().collect(),
        })
    }

    /// Number of results received
    pub fn count(&self) -> usize {
        self.responses.len()
    }

    /// Result at `index`, or the remote error reported for it
    pub fn result_at(&self, index: usize) -> RpcResult<Value> {
        let response = self.responses.get(index).ok_or_else(|| {
            RpcClientError::Protocol(format!("no batch result at index {}", index))
        })?;
        match &response.error {
            Some(error) => Err(error.clone().into()),
            None => Ok(response.result.clone().unwrap_or(Value::Null)),
        }
    }

    /// Request submitted at `index`
    pub fn request_at(&self, index: usize) -> Option<&JsonRpcRequest> {
        self.requests.get(index)
    }

    /// Method string of the request submitted at `index`
    pub fn request_method_at(&self, index: usize) -> Option<&str> {
        self.request_at(index).map(|r| r.method.as_str())
    }

    /// All submitted requests, in order
    pub fn requests(&self) -> &[JsonRpcRequest] {
        &self.requests
    }
}
