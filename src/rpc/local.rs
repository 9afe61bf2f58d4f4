//! In-process RPC client
//!
//! Serves calls from a table of registered handlers, without any transport.
//! Batches are only executed on `send`, and their responses go through the
//! same id correlation as the HTTP client.

use super::client::{BatchHandle, BatchResult, CallToken, RpcClient};
use super::contract::{Contract, FunctionDef};
use super::error::{RpcClientError, RpcResult};
use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, split_qualified_method};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handler for one function
pub type Handler = Arc<dyn Fn(&[Value]) -> RpcResult<Value> + Send + Sync>;

/// Order in which a batch's responses are handed back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseOrder {
    /// Same order as the requests
    #[default]
    Submitted,
    /// Last request answered first
    Reversed,
}

#[derive(Default)]
struct Registry {
    handlers: HashMap<String, Handler>,
    contract: Contract,
    response_order: ResponseOrder,
    next_id: AtomicU64,
}

impl Registry {
    fn dispatch(&self, interface: &str, function: &str, args: &[Value]) -> RpcResult<Value> {
        self.contract.resolve(interface, function)?;
        let key = format!("{}.{}", interface, function);
        let handler = self.handlers.get(&key).ok_or_else(|| RpcClientError::UnknownFunction {
            interface: interface.to_string(),
            function: function.to_string(),
        })?;
        handler(args)
    }

    fn answer(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        let (interface, function) = split_qualified_method(&request.method);
        let args = match request.params_or_empty() {
            Value::Array(args) => args,
            other => vec![other],
        };

        match self.dispatch(interface, function, &args) {
            Ok(result) => JsonRpcResponse::success(result, id),
            Err(RpcClientError::Remote {
                code,
                message,
                data,
            }) => JsonRpcResponse::error(JsonRpcError { code, message, data }, Some(id)),
            Err(RpcClientError::UnknownInterface(_) | RpcClientError::UnknownFunction { .. }) => {
                JsonRpcResponse::error(JsonRpcError::method_not_found(), Some(id))
            }
            Err(e) => JsonRpcResponse::error(
                JsonRpcError::new(JsonRpcError::internal_error().code, e.to_string()),
                Some(id),
            ),
        }
    }
}

/// Builds a [`LocalRpcClient`]
#[derive(Default)]
pub struct LocalRpcClientBuilder {
    registry: Registry,
}

impl LocalRpcClientBuilder {
    /// Register a handler for `interface.function`
    pub fn handler<F>(mut self, interface: &str, function: &str, handler: F) -> Self
    where
        F: Fn(&[Value]) -> RpcResult<Value> + Send + Sync + 'static,
    {
        self.registry
            .handlers
            .insert(format!("{}.{}", interface, function), Arc::new(handler));
        self.registry.contract.add_function(
            interface,
            FunctionDef {
                name: function.to_string(),
                params: Vec::new(),
                returns: None,
            },
        );
        self
    }

    /// Hand batch responses back in the given order
    pub fn response_order(mut self, order: ResponseOrder) -> Self {
        self.registry.response_order = order;
        self
    }

    /// Finish building
    pub fn build(self) -> LocalRpcClient {
        LocalRpcClient {
            registry: Arc::new(self.registry),
        }
    }
}

/// RPC client backed by in-process handlers
#[derive(Clone)]
pub struct LocalRpcClient {
    registry: Arc<Registry>,
}

impl LocalRpcClient {
    /// Start building a client
    pub fn builder() -> LocalRpcClientBuilder {
        LocalRpcClientBuilder::default()
    }

    /// Interface surface derived from the registered handlers
    pub fn contract(&self) -> &Contract {
        &self.registry.contract
    }
}

#[async_trait]
impl RpcClient for LocalRpcClient {
    async fn invoke(
        &self,
        interface: &str,
        function: &str,
        args: Vec<Value>,
    ) -> RpcResult<Value> {
        self.registry.dispatch(interface, function, &args)
    }

    fn open_batch(&self) -> Box<dyn BatchHandle> {
        Box::new(LocalBatch {
            registry: Arc::clone(&self.registry),
            requests: Vec::new(),
        })
    }
}

struct LocalBatch {
    registry: Arc<Registry>,
    requests: Vec<JsonRpcRequest>,
}

#[async_trait]
impl BatchHandle for LocalBatch {
    fn queue(
        &mut self,
        interface: &str,
        function: &str,
        args: Vec<Value>,
    ) -> RpcResult<CallToken> {
        self.registry.contract.resolve(interface, function)?;
        let id = Value::from(self.registry.next_id.fetch_add(1, Ordering::SeqCst));
        self.requests
            .push(JsonRpcRequest::call(interface, function, args).with_id(id.clone()));
        Ok(CallToken::new(id))
    }

    fn len(&self) -> usize {
        self.requests.len()
    }

    async fn send(self: Box<Self>) -> RpcResult<BatchResult> {
        let LocalBatch { registry, requests } = *self;
        let mut responses: Vec<JsonRpcResponse> =
            requests.iter().map(|r| registry.answer(r)).collect();
        if registry.response_order == ResponseOrder::Reversed {
            responses.reverse();
        }
        BatchResult::correlate(requests, responses)
    }
}
