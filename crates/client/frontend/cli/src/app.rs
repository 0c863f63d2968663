//! Glue code tying the runtime handle and terminal UI together.
use anyhow::Result;
use async_trait::async_trait;
use runtime::RuntimeHandle;

use crate::config::CliConfig;
use crate::event::{CliEventConsumer, EventLoop};
use crate::presentation::terminal;
use client_frontend_core::{Frontend, FrontendConfig, ViewModel, message::MessageLog};

/// Terminal frontend. Owns no game state; everything flows through the
/// [`RuntimeHandle`] passed to [`Frontend::run`].
pub struct CliFrontend {
    frontend_config: FrontendConfig,
    cli_config: CliConfig,
    network: Option<String>,
}

impl CliFrontend {
    pub fn new(frontend_config: FrontendConfig, cli_config: CliConfig) -> Self {
        Self {
            frontend_config,
            cli_config,
            network: None,
        }
    }

    /// Network name shown in the header.
    pub fn with_network(mut self, network: Option<String>) -> Self {
        self.network = network;
        self
    }
}

#[async_trait]
impl Frontend for CliFrontend {
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
        tracing::info!("CLI client starting...");

        let snapshot = handle.snapshot().await?;
        let view_model = ViewModel::from_snapshot(
            &snapshot,
            &self.frontend_config.currency_symbol,
            self.network.as_deref(),
        );

        let mut messages = MessageLog::new(self.frontend_config.messages.capacity);
        messages.push_text(if snapshot.provider_available {
            "Play against the bot! Press [c] to connect your wallet."
        } else {
            "No wallet provider configured. Set RPS_RPC_URL to play."
        });

        let consumer = CliEventConsumer::new(messages, self.frontend_config.clone());
        let event_loop = EventLoop::new(
            handle,
            consumer,
            view_model,
            self.frontend_config.clone(),
            self.cli_config.clone(),
            self.network.clone(),
        );

        let mut terminal = terminal::init()?;
        let _guard = terminal::TerminalGuard;

        let result = event_loop.run(&mut terminal).await;

        terminal::restore()?;
        tracing::info!("CLI client exiting");

        result.map(|_| ())
    }
}
