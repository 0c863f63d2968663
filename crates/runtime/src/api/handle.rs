//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! playing rounds, managing the wallet or streaming events from specific
//! topics.
use std::sync::Arc;

use client_blockchain_core::{Address, TransactionReceipt};
use game_core::{Choice, GameSession, Generation, RoundTicket, Score, Wager, Wei};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::errors::{Result, RuntimeError, WalletError};
use crate::adapter::ContractAdapter;
use crate::events::{Event, EventBus, Topic};
use crate::wallet::{WalletSession, WalletSessionManager, WalletState};
use crate::workers::Command;

/// Everything a frontend needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub wallet: WalletState,
    pub session: GameSession,
    pub score: Score,
    /// Whether a wallet provider capability was detected.
    pub provider_available: bool,
    pub contract: Option<Address>,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    wallet: Arc<WalletSessionManager>,
    adapter: Option<Arc<ContractAdapter>>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        wallet: Arc<WalletSessionManager>,
        adapter: Option<Arc<ContractAdapter>>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            wallet,
            adapter,
        }
    }

    /// Connect the wallet. Failures come back as a status, never as a
    /// runtime error.
    pub async fn connect(&self) -> std::result::Result<WalletSession, WalletError> {
        self.wallet.connect().await
    }

    /// Disconnect the wallet. Also clears the score and resets the session.
    pub fn disconnect(&self) {
        self.wallet.disconnect();
    }

    /// Record a choice and start the countdown.
    pub async fn select_choice(&self, choice: Choice) -> Result<RoundTicket> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::SelectChoice {
                choice,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Replace the wager with a decimal string in display units.
    pub async fn set_wager(&self, input: impl Into<String>) -> Result<Wager> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::SetWager {
                input: input.into(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Return to Idle. Any countdown or in-flight submission is abandoned.
    pub async fn reset(&self) -> Result<Generation> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Reset { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Query wallet, session and score (read-only snapshot)
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QueryState { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        let (session, score) = reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?;
        Ok(Snapshot {
            wallet: self.wallet.current(),
            session,
            score,
            provider_available: self.wallet.has_provider(),
            contract: self.contract_address(),
        })
    }

    pub fn wallet(&self) -> WalletState {
        self.wallet.current()
    }

    /// Watch the wallet slot directly (connect, switch, balance, disconnect).
    pub fn watch_wallet(&self) -> watch::Receiver<WalletState> {
        self.wallet.subscribe()
    }

    pub fn has_provider(&self) -> bool {
        self.wallet.has_provider()
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.adapter
            .as_ref()
            .map(|adapter| adapter.contract().address().clone())
    }

    /// Withdraw the contract balance to the recipient. Only succeeds when the
    /// connected account is the recipient.
    pub async fn withdraw(&self) -> Result<TransactionReceipt> {
        let adapter = self.adapter()?;
        let account = self.wallet.account().ok_or(RuntimeError::NotConnected)?;
        Ok(adapter.withdraw(&account).await?)
    }

    /// The contract's minimum bet.
    pub async fn min_bet(&self) -> Result<Wei> {
        Ok(self.adapter()?.min_bet().await?)
    }

    /// The contract's withdrawal recipient.
    pub async fn recipient(&self) -> Result<Address> {
        Ok(self.adapter()?.recipient().await?)
    }

    fn adapter(&self) -> Result<&Arc<ContractAdapter>> {
        self.adapter.as_ref().ok_or(RuntimeError::ContractNotConfigured)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Wallet` - Connection, balance and disconnect events
    /// - `Topic::Game` - Choice, countdown, submission and outcome events
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut game_rx = handle.subscribe(Topic::Game);
    /// while let Ok(event) = game_rx.recv().await {
    ///     // Handle round events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
