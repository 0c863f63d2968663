//! EVM JSON-RPC integration for the rock-paper-scissors client.
//!
//! Provides [`HttpWalletProvider`], a Layer 0 [`WalletProvider`] that talks to
//! a node over HTTP. Pair it with
//! [`ProviderContract`](client_blockchain_core::ProviderContract) to reach the
//! game contract:
//!
//! ```ignore
//! use client_blockchain_evm::{EvmConfig, HttpWalletProvider};
//!
//! let config = EvmConfig::from_env()?.expect("RPS_RPC_URL set");
//! let provider = Arc::new(HttpWalletProvider::new(config)?);
//! let accounts = provider.request_accounts().await?;
//! ```
//!
//! [`WalletProvider`]: client_blockchain_core::WalletProvider

pub mod config;
pub mod error;
pub mod provider;

pub use config::EvmConfig;
pub use error::EvmError;
pub use provider::HttpWalletProvider;
