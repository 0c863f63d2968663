//! Event types for different topics.

use client_blockchain_core::{Address, TxHash};
use game_core::{Choice, Generation, ResolvedRound, Score, Settlement, Wager, Wei};
use serde::{Deserialize, Serialize};

/// Wallet session lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    /// An account was connected; balance is absent if the first fetch failed
    Connected {
        account: Address,
        balance: Option<Wei>,
    },

    /// A connect attempt failed; the session is unchanged
    ConnectionFailed { reason: String },

    /// The polled balance changed
    BalanceUpdated { account: Address, balance: Wei },

    /// The session was cleared
    Disconnected,
}

/// Round lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A choice was recorded and the countdown started
    RoundStarted {
        generation: Generation,
        choice: Choice,
        seconds: u32,
    },

    /// A choice was refused (no wallet, round in progress)
    SelectionRejected { reason: String },

    CountdownTick {
        generation: Generation,
        remaining: u32,
    },

    /// The countdown expired and the move is being submitted
    Submitting {
        generation: Generation,
        choice: Choice,
        wager: Wager,
    },

    TransactionSent {
        generation: Generation,
        tx: TxHash,
    },

    TransactionConfirmed {
        generation: Generation,
        tx: TxHash,
        block: u64,
    },

    /// The contract verdict was applied to the session and score
    RoundResolved {
        round: ResolvedRound,
        settlement: Settlement,
        score: Score,
    },

    /// Submission, confirmation or outcome delivery failed
    RoundFailed {
        generation: Generation,
        reason: String,
    },

    WagerChanged { wager: Wager },

    /// Invalid wager input; the previous wager is retained
    WagerRejected { input: String, reason: String },

    /// The session went back to Idle
    SessionReset { generation: Generation, score: Score },
}
