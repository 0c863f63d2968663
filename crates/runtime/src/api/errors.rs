//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the wallet boundary so clients
//! can bubble them up with consistent context.
use client_blockchain_core::{ProviderError, SubmissionError};
use game_core::{SelectError, WagerError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("game worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("contract address not configured")]
    ContractNotConfigured,

    #[error("no connected account")]
    NotConnected,

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Wager(#[from] WagerError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Connection failures, reported as a status rather than raised.
///
/// The wallet session stays unchanged whenever one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no wallet provider detected; configure RPS_RPC_URL to connect")]
    ProviderUnavailable,

    #[error("account access was rejected")]
    ConnectionRejected,

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("disconnected while the connection was pending")]
    Cancelled,

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for WalletError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Unavailable => WalletError::ProviderUnavailable,
            ProviderError::UserRejected | ProviderError::Unauthorized(_) => {
                WalletError::ConnectionRejected
            }
            other => WalletError::Provider(other),
        }
    }
}
