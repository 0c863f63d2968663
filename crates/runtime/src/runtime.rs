//! High-level runtime orchestrator.
//!
//! The runtime owns the wallet session manager and the game worker, wires up
//! command/event channels, and exposes a builder-based API for clients.

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{RpsContract, WalletProvider};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use game_core::{GameConfig, Wager};

use crate::adapter::{AdapterConfig, ContractAdapter};
use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::wallet::WalletSessionManager;
use crate::workers::{Command, GameWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Wager in effect until the user enters another one
    pub default_wager: Wager,
    pub balance_poll_interval: Duration,
    pub adapter: AdapterConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            default_wager: Wager::default(),
            balance_poll_interval: WalletSessionManager::DEFAULT_POLL_INTERVAL,
            adapter: AdapterConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates wallet and game state
///
/// Design: Runtime owns workers and coordinates their lifecycle.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    wallet: Arc<WalletSessionManager>,
    command_tx: mpsc::Sender<Command>,
    game_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops balance polling, abandons any round in flight and waits for the
    /// game worker to exit. The wallet session itself is not cleared.
    pub async fn shutdown(self) -> Result<()> {
        self.wallet.shutdown();

        if self.command_tx.send(Command::Shutdown).await.is_err() {
            tracing::debug!("game worker already stopped");
        }
        drop(self.handle);

        self.game_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    contract: Option<Arc<dyn RpsContract>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            provider: None,
            contract: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the wallet provider capability (absent means "no wallet installed")
    pub fn provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the game contract (optional; rounds fail without it)
    pub fn contract(mut self, contract: Arc<dyn RpsContract>) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let wallet = Arc::new(WalletSessionManager::new(
            self.provider,
            self.config.balance_poll_interval,
            event_bus.clone(),
        ));
        let adapter = self
            .contract
            .map(|contract| Arc::new(ContractAdapter::new(contract, self.config.adapter)));

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size.max(1));

        let handle = RuntimeHandle::new(
            command_tx.clone(),
            event_bus.clone(),
            Arc::clone(&wallet),
            adapter.clone(),
        );

        let game_worker = GameWorker::new(
            self.config.game_config,
            self.config.default_wager,
            Arc::clone(&wallet),
            adapter,
            command_rx,
            event_bus,
        );

        let game_worker_handle = tokio::spawn(async move {
            game_worker.run().await;
        });

        Ok(Runtime {
            handle,
            wallet,
            command_tx,
            game_worker_handle,
        })
    }
}
