//! Error types for EVM JSON-RPC transport.

use client_blockchain_core::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<EvmError> for ProviderError {
    fn from(error: EvmError) -> Self {
        match error {
            EvmError::Http(e) => ProviderError::Network(e.to_string()),
            other => ProviderError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvmError>;
