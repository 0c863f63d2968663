//! Wallet and contract abstraction layer for the rock-paper-scissors client.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: RpsContract (play, receipts, GamePlayed events, views)
//!          └── ProviderContract
//!
//! Layer 0: WalletProvider (EIP-1193 `request`)
//!          ├── MockWalletProvider (feature "mock")
//!          └── HttpWalletProvider (client-blockchain-evm)
//! ```
//!
//! - **Layer 0 (Provider)**: Raw JSON-RPC requests plus typed helpers, no game knowledge
//! - **Layer 1 (Contract)**: ABI encoding and event decoding for the game contract
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{ProviderContract, RpsContract};
//!
//! let contract = ProviderContract::new(provider, contract_address);
//! let hash = contract.play(&player, Choice::Rock, wager.amount()).await?;
//! let receipt = contract.wait_for_receipt(&hash, timeout).await?;
//! let mut events = contract.subscribe_game_played(&player, receipt.block_number).await?;
//! ```

pub mod abi;
pub mod contract;
pub mod subscription;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use abi::AbiError;
pub use contract::ProviderContract;
pub use subscription::{EventResult, OutcomeSubscription};
pub use traits::{ProviderError, RpsContract, SubmissionError, WalletProvider};
pub use types::{
    Address, GamePlayedEvent, LogEntry, RpcRequest, TransactionReceipt, TransactionRequest,
    TxHash,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockWalletProvider;
