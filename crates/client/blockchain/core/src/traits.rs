//! Wallet and contract abstraction traits.
//!
//! This module defines a layered abstraction:
//! - Layer 0: WalletProvider (EIP-1193 request capability)
//! - Layer 1: RpsContract (rock-paper-scissors contract calls and events)

use std::time::Duration;

use async_trait::async_trait;
use game_core::{Choice, Wei};
use serde_json::{Value, json};

use crate::abi::AbiError;
use crate::subscription::OutcomeSubscription;
use crate::types::{
    Address, LogEntry, RpcRequest, TransactionReceipt, TransactionRequest, TxHash, parse_quantity,
    to_quantity,
};

// ============================================================================
// Error Types
// ============================================================================

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 "Unauthorized".
pub const UNAUTHORIZED_CODE: i64 = 4100;

/// Provider layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("wallet provider not available")]
    Unavailable,

    #[error("request rejected by user")]
    UserRejected,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response to {method}: {reason}")]
    InvalidResponse { method: String, reason: String },
}

impl ProviderError {
    /// Maps a JSON-RPC / EIP-1193 error object onto the taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_CODE => ProviderError::UserRejected,
            UNAUTHORIZED_CODE => ProviderError::Unauthorized(message),
            _ => ProviderError::Rpc { code, message },
        }
    }

    pub fn invalid_response(method: &str, reason: impl ToString) -> Self {
        ProviderError::InvalidResponse {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, ProviderError::Rpc { message, .. }
            if message.to_lowercase().contains("insufficient funds"))
    }
}

/// Move submission errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("no connected account")]
    NotConnected,

    #[error("transaction rejected by user")]
    UserRejected,

    #[error("insufficient funds for a wager of {required} wei")]
    InsufficientFunds {
        required: Wei,
        available: Option<Wei>,
    },

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(TxHash),

    #[error("no GamePlayed event for transaction {0} in time")]
    OutcomeTimeout(TxHash),

    #[error("outcome subscription closed")]
    SubscriptionClosed,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("abi error: {0}")]
    Abi(#[from] AbiError),
}

impl SubmissionError {
    /// Lifts a provider error raised while signing or sending.
    pub fn from_send(error: ProviderError, required: Wei) -> Self {
        if error.is_insufficient_funds() {
            return SubmissionError::InsufficientFunds {
                required,
                available: None,
            };
        }
        match error {
            ProviderError::UserRejected => SubmissionError::UserRejected,
            other => SubmissionError::Provider(other),
        }
    }
}

// ============================================================================
// Layer 0: Provider Capability
// ============================================================================

/// Injected wallet capability (EIP-1193 `request`).
///
/// Implementors only provide [`WalletProvider::request`]; the typed helpers
/// are built on top of it.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Send a raw request.
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &str {
        "wallet"
    }

    /// `eth_requestAccounts`: ask the user for account access.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        const METHOD: &str = "eth_requestAccounts";
        let value = self.request(RpcRequest::new(METHOD, vec![])).await?;
        let entries = value
            .as_array()
            .ok_or_else(|| ProviderError::invalid_response(METHOD, "expected an array"))?;
        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .ok_or_else(|| ProviderError::invalid_response(METHOD, "expected strings"))
                    .and_then(|s| {
                        Address::parse(s).map_err(|e| ProviderError::invalid_response(METHOD, e))
                    })
            })
            .collect()
    }

    /// `eth_getBalance [address, "latest"]`.
    async fn get_balance(&self, address: &Address) -> Result<Wei, ProviderError> {
        const METHOD: &str = "eth_getBalance";
        let value = self
            .request(RpcRequest::new(METHOD, vec![json!(address), json!("latest")]))
            .await?;
        quantity_from(METHOD, &value).map(Wei)
    }

    /// `eth_sendTransaction`; returns the transaction hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        const METHOD: &str = "eth_sendTransaction";
        let params = serde_json::to_value(&tx).map_err(|e| ProviderError::invalid_response(METHOD, e))?;
        let value = self.request(RpcRequest::new(METHOD, vec![params])).await?;
        value
            .as_str()
            .map(TxHash::new)
            .ok_or_else(|| ProviderError::invalid_response(METHOD, "expected a hash"))
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    async fn get_transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        const METHOD: &str = "eth_getTransactionReceipt";
        let value = self
            .request(RpcRequest::new(METHOD, vec![json!(hash.as_str())]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(&value)
            .map(Some)
            .map_err(|e| ProviderError::invalid_response(METHOD, e))
    }

    /// `eth_blockNumber`.
    async fn block_number(&self) -> Result<u64, ProviderError> {
        const METHOD: &str = "eth_blockNumber";
        let value = self.request(RpcRequest::new(METHOD, vec![])).await?;
        let number = quantity_from(METHOD, &value)?;
        u64::try_from(number)
            .map_err(|_| ProviderError::invalid_response(METHOD, AbiError::ValueOverflow))
    }

    /// `eth_getLogs` for one contract and first topic over `[from, to]`.
    async fn get_logs(
        &self,
        address: &Address,
        topic0: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, ProviderError> {
        const METHOD: &str = "eth_getLogs";
        let filter = json!({
            "address": address,
            "topics": [topic0],
            "fromBlock": to_quantity(u128::from(from_block)),
            "toBlock": to_quantity(u128::from(to_block)),
        });
        let value = self.request(RpcRequest::new(METHOD, vec![filter])).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::invalid_response(METHOD, e))
    }

    /// `eth_call` against the latest block; returns raw hex data.
    async fn call(&self, to: &Address, data: &str) -> Result<String, ProviderError> {
        const METHOD: &str = "eth_call";
        let value = self
            .request(RpcRequest::new(
                METHOD,
                vec![json!({ "to": to, "data": data }), json!("latest")],
            ))
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::invalid_response(METHOD, "expected hex data"))
    }
}

fn quantity_from(method: &str, value: &Value) -> Result<u128, ProviderError> {
    let text = value
        .as_str()
        .ok_or_else(|| ProviderError::invalid_response(method, "expected a hex quantity"))?;
    parse_quantity(text).map_err(|e| ProviderError::invalid_response(method, e))
}

// ============================================================================
// Layer 1: Contract Interface
// ============================================================================

/// Rock-paper-scissors contract surface.
#[async_trait]
pub trait RpsContract: Send + Sync {
    /// Deployed contract address.
    fn address(&self) -> &Address;

    /// `play(uint8)` carrying `value` wei; returns once the transaction is
    /// sent (not yet confirmed).
    async fn play(&self, from: &Address, choice: Choice, value: Wei)
    -> Result<TxHash, SubmissionError>;

    /// Wait until `tx` is included in a block. Reverted transactions are an
    /// error.
    async fn wait_for_receipt(
        &self,
        tx: &TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, SubmissionError>;

    /// Stream `GamePlayed` events for `player` starting at `from_block`.
    ///
    /// The stream stops when the returned handle is dropped.
    async fn subscribe_game_played(
        &self,
        player: &Address,
        from_block: u64,
    ) -> Result<OutcomeSubscription, SubmissionError>;

    /// `withdraw()`; restricted to the recipient on-chain.
    async fn withdraw(&self, from: &Address) -> Result<TxHash, SubmissionError>;

    /// `MIN_BET()` view.
    async fn min_bet(&self) -> Result<Wei, SubmissionError>;

    /// `RECIPIENT()` view.
    async fn recipient(&self) -> Result<Address, SubmissionError>;
}
