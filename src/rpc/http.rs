//! JSON-RPC over HTTP
//!
//! Single calls are POSTed as one request object, batches as an array. Every
//! request carries a UUID id so batch responses can be matched back.

use super::client::{BatchHandle, BatchResult, CallToken, RpcClient};
use super::contract::Contract;
use super::error::{RpcClientError, RpcResult};
use super::protocol::{IDL_METHOD, JsonRpcRequest, JsonRpcResponse, RpcMessage};
use crate::config::EndpointConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const USER_AGENT: &str = concat!("rpc-conform/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
struct Endpoint {
    url: String,
    http_client: reqwest::Client,
    contract: Option<Contract>,
}

impl Endpoint {
    fn resolve(&self, interface: &str, function: &str) -> RpcResult<()> {
        if let Some(contract) = &self.contract {
            contract.resolve(interface, function)?;
        }
        Ok(())
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> RpcResult<RpcMessage> {
        let response = self.http_client.post(&self.url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            RpcClientError::Protocol(format!("Failed to parse response: {}", e))
        })
    }

    async fn call(&self, request: JsonRpcRequest) -> RpcResult<Value> {
        debug!(method = %request.method, "Sending request");

        let response = match self.post(&request).await? {
            RpcMessage::Single(response) => response,
            RpcMessage::Batch(_) => {
                return Err(RpcClientError::Protocol(
                    "expected a single response, got an array".to_string(),
                ));
            }
        };

        if let Some(error) = response.error {
            return Err(error.into());
        }
        if response.id.is_some() && response.id != request.id {
            return Err(RpcClientError::Protocol(format!(
                "response id {:?} does not match request id {:?}",
                response.id, request.id
            )));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

fn next_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

fn build_headers(config: &EndpointConfig) -> RpcResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| RpcClientError::Config(format!("Invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RpcClientError::Config(format!("Invalid value for header '{}': {}", key, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// JSON-RPC client for an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpRpcClient {
    endpoint: Arc<Endpoint>,
}

impl HttpRpcClient {
    /// Build the client and, if configured, fetch the server contract
    pub async fn connect(config: &EndpointConfig) -> RpcResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(build_headers(config)?)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RpcClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let mut endpoint = Endpoint {
            url: config.url.clone(),
            http_client,
            contract: None,
        };

        if config.load_contract {
            let idl = endpoint
                .call(JsonRpcRequest::new(IDL_METHOD, Some(Value::Array(Vec::new()))).with_id(next_id()))
                .await?;
            let contract = Contract::from_idl(idl)?;
            info!(
                "Loaded contract from {}: {} interfaces, {} functions",
                config.url,
                contract.interface_names().len(),
                contract.function_count()
            );
            endpoint.contract = Some(contract);
        } else {
            warn!("Contract loading disabled; interface names will not be checked");
        }

        Ok(Self {
            endpoint: Arc::new(endpoint),
        })
    }

    /// Contract fetched at connect time
    pub fn contract(&self) -> Option<&Contract> {
        self.endpoint.contract.as_ref()
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.endpoint.url
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn invoke(
        &self,
        interface: &str,
        function: &str,
        args: Vec<Value>,
    ) -> RpcResult<Value> {
        self.endpoint.resolve(interface, function)?;
        let request = JsonRpcRequest::call(interface, function, args).with_id(next_id());
        self.endpoint.call(request).await
    }

    fn open_batch(&self) -> Box<dyn BatchHandle> {
        Box::new(HttpBatch {
            endpoint: Arc::clone(&self.endpoint),
            requests: Vec::new(),
        })
    }
}

/// Batch of requests posted together as one JSON array
#[derive(Debug)]
pub struct HttpBatch {
    endpoint: Arc<Endpoint>,
    requests: Vec<JsonRpcRequest>,
}

#[async_trait]
impl BatchHandle for HttpBatch {
    fn queue(
        &mut self,
        interface: &str,
        function: &str,
        args: Vec<Value>,
    ) -> RpcResult<CallToken> {
        self.endpoint.resolve(interface, function)?;
        let id = next_id();
        self.requests
            .push(JsonRpcRequest::call(interface, function, args).with_id(id.clone()));
        Ok(CallToken::new(id))
    }

    fn len(&self) -> usize {
        self.requests.len()
    }

    async fn send(self: Box<Self>) -> RpcResult<BatchResult> {
        let HttpBatch { endpoint, requests } = *self;
        if requests.is_empty() {
            return BatchResult::correlate(requests, Vec::new());
        }

        debug!(calls = requests.len(), "Sending batch");
        let responses: Vec<JsonRpcResponse> = match endpoint.post(&requests).await? {
            RpcMessage::Batch(responses) => responses,
            RpcMessage::Single(response) => match response.error {
                Some(error) => return Err(error.into()),
                None => {
                    return Err(RpcClientError::Protocol(
                        "expected an array of batch responses".to_string(),
                    ));
                }
            },
        };

        BatchResult::correlate(requests, responses)
    }
}
