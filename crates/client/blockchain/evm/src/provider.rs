//! HTTP JSON-RPC wallet provider.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use client_blockchain_core::{ProviderError, RpcRequest, WalletProvider};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::EvmConfig;
use crate::error::{EvmError, Result};

/// Wallet provider speaking JSON-RPC to a node that holds unlocked accounts
/// (anvil, hardhat, geth `--dev`).
///
/// `eth_requestAccounts` is answered with the configured account when one is
/// set and otherwise forwarded as `eth_accounts`.
pub struct HttpWalletProvider {
    config: EvmConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl HttpWalletProvider {
    pub fn new(config: EvmConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    async fn post(
        &self,
        method: &str,
        params: &[Value],
    ) -> std::result::Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(id, method, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(EvmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Network(format!(
                "{method} failed with status {status}: {text}"
            )));
        }

        let response: RpcResponse = response.json().await.map_err(EvmError::from)?;
        decode_response(method, response)
    }
}

fn decode_response(
    method: &str,
    response: RpcResponse,
) -> std::result::Result<Value, ProviderError> {
    if let Some(error) = response.error {
        tracing::debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
        return Err(ProviderError::from_rpc(error.code, error.message));
    }
    // A missing result is a valid `null` (pending receipts).
    Ok(response.result.unwrap_or(Value::Null))
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, request: RpcRequest) -> std::result::Result<Value, ProviderError> {
        match request.method.as_str() {
            "eth_requestAccounts" => match &self.config.account {
                Some(account) => Ok(json!([account])),
                None => self.post("eth_accounts", &request.params).await,
            },
            method => self.post(method, &request.params).await,
        }
    }

    fn name(&self) -> &str {
        &self.config.network
    }
}

impl std::fmt::Debug for HttpWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWalletProvider")
            .field("rpc_url", &self.config.rpc_url)
            .field("network", &self.config.network)
            .finish()
    }
}
