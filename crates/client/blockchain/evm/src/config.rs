//! EVM JSON-RPC endpoint configuration.

use std::env;
use std::time::Duration;

use client_blockchain_core::Address;

use crate::error::EvmError;

/// Connection settings for an EVM node.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// JSON-RPC endpoint, e.g. `http://127.0.0.1:8545`
    pub rpc_url: String,

    /// Account to act as; when unset the node's first unlocked account is used
    pub account: Option<Address>,

    /// Deployed game contract
    pub contract_address: Option<Address>,

    /// Display name of the network
    pub network: String,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl EvmConfig {
    pub const DEFAULT_NETWORK: &'static str = "local";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            account: None,
            contract_address: None,
            network: Self::DEFAULT_NETWORK.to_string(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` when no endpoint is configured, which the client
    /// treats as "no wallet provider installed".
    ///
    /// Environment variables:
    /// - `RPS_RPC_URL` - JSON-RPC endpoint
    /// - `RPS_ACCOUNT` - Account override
    /// - `RPS_CONTRACT_ADDRESS` - Deployed contract address
    /// - `RPS_NETWORK` - Network display name (default: local)
    pub fn from_env() -> Result<Option<Self>, EvmError> {
        let Some(rpc_url) = env::var("RPS_RPC_URL").ok().filter(|url| !url.trim().is_empty())
        else {
            return Ok(None);
        };

        let mut config = Self::new(rpc_url.trim());
        config.account = read_address("RPS_ACCOUNT")?;
        config.contract_address = read_address("RPS_CONTRACT_ADDRESS")?;
        if let Ok(network) = env::var("RPS_NETWORK") {
            config.network = network;
        }
        Ok(Some(config))
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }
}

fn read_address(key: &str) -> Result<Option<Address>, EvmError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Address::parse(value.trim())
            .map(Some)
            .map_err(|e| EvmError::InvalidConfig(format!("{key}: {e}"))),
        _ => Ok(None),
    }
}
