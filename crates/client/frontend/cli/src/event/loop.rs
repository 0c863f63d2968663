//! Event loop orchestrating runtime events, user input, and rendering.
//!
//! This module coordinates three main concerns:
//! - Runtime event consumption (wallet and game topics)
//! - Keyboard input processing (hands, wallet, wager editing)
//! - Rendering a fresh ViewModel from a runtime snapshot

use std::collections::HashMap;

use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyEvent, KeyEventKind};
use runtime::{Event as RuntimeEvent, RuntimeError, RuntimeHandle, Topic};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError},
    task::JoinHandle,
    time::{self, Duration},
};

use crate::{
    config::CliConfig,
    input::{InputHandler, KeyAction},
    presentation::{terminal::Tui, ui},
    state::AppState,
};
use client_frontend_core::{EventConsumer, FrontendConfig, ViewModel};

/// Event loop owning the ViewModel and coordinating UI updates.
pub struct EventLoop<C>
where
    C: EventConsumer,
{
    subscriptions: HashMap<Topic, broadcast::Receiver<RuntimeEvent>>,
    handle: RuntimeHandle,
    input: InputHandler,
    consumer: C,
    app_state: AppState,
    view_model: ViewModel,
    frontend_config: FrontendConfig,
    cli_config: CliConfig,
    network: Option<String>,
}

impl<C> EventLoop<C>
where
    C: EventConsumer,
{
    pub fn new(
        handle: RuntimeHandle,
        consumer: C,
        view_model: ViewModel,
        frontend_config: FrontendConfig,
        cli_config: CliConfig,
        network: Option<String>,
    ) -> Self {
        let subscriptions = handle.subscribe_multiple(&Topic::ALL);

        Self {
            subscriptions,
            handle,
            input: InputHandler::new(),
            consumer,
            app_state: AppState::new(),
            view_model,
            frontend_config,
            cli_config,
            network,
        }
    }

    pub async fn run(mut self, terminal: &mut Tui) -> Result<C> {
        self.refresh(terminal).await?;

        let mut wallet_rx = self.subscriptions.remove(&Topic::Wallet);
        let mut game_rx = self.subscriptions.remove(&Topic::Game);
        let frame_interval = self.cli_config.ui.frame_interval;

        loop {
            tokio::select! {
                Some(result) = recv(&mut wallet_rx) => {
                    if self.handle_runtime_event(result, terminal).await? {
                        break;
                    }
                }
                Some(result) = recv(&mut game_rx) => {
                    if self.handle_runtime_event(result, terminal).await? {
                        break;
                    }
                }
                _ = time::sleep(frame_interval) => {
                    if self.handle_input_tick(terminal).await? {
                        break;
                    }
                }
            }
        }

        Ok(self.consumer)
    }

    /// Returns `true` when the loop should stop.
    async fn handle_runtime_event(
        &mut self,
        result: Result<RuntimeEvent, RecvError>,
        terminal: &mut Tui,
    ) -> Result<bool> {
        match result {
            Ok(event) => {
                let impact = self.consumer.on_event(&event);
                if impact.requires_redraw {
                    self.refresh(terminal).await?;
                }
                Ok(false)
            }
            Err(RecvError::Closed) => {
                tracing::warn!("Event stream closed");
                Ok(true)
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Dropped {} stale events", skipped);
                self.refresh(terminal).await?;
                Ok(false)
            }
        }
    }

    async fn handle_input_tick(&mut self, terminal: &mut Tui) -> Result<bool> {
        if !event::poll(Duration::from_millis(0))? {
            return Ok(false);
        }

        match event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key_press(key, terminal).await
            }
            TermEvent::Resize(_, _) => {
                self.render(terminal)?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    async fn handle_key_press(&mut self, key: KeyEvent, terminal: &mut Tui) -> Result<bool> {
        match self.input.handle_key(key, &self.app_state.mode) {
            KeyAction::Quit => {
                self.consumer.message_log_mut().push_text("Quitting...");
                self.render(terminal)?;
                return Ok(true);
            }
            KeyAction::Choose(choice) => {
                if let Err(error) = self.handle.select_choice(choice).await {
                    return rejected(error);
                }
            }
            KeyAction::Connect => {
                connect_in_background(&self.handle);
            }
            KeyAction::Disconnect => self.handle.disconnect(),
            KeyAction::Reset => {
                self.handle.reset().await?;
            }
            KeyAction::EditWager => {
                self.app_state.begin_wager_edit(&self.view_model.wager);
                self.render(terminal)?;
            }
            KeyAction::WagerChar(ch) => {
                self.app_state.push_wager_char(ch);
                self.render(terminal)?;
            }
            KeyAction::WagerBackspace => {
                self.app_state.pop_wager_char();
                self.render(terminal)?;
            }
            KeyAction::SubmitWager => {
                if let Some(input) = self.app_state.finish_wager_edit()
                    && let Err(error) = self.handle.set_wager(input).await
                {
                    return rejected(error);
                }
                self.render(terminal)?;
            }
            KeyAction::CancelWager => {
                self.app_state.cancel_wager_edit();
                self.render(terminal)?;
            }
            KeyAction::None => {}
        }

        Ok(false)
    }

    async fn refresh(&mut self, terminal: &mut Tui) -> Result<()> {
        let snapshot = self.handle.snapshot().await?;
        self.view_model = ViewModel::from_snapshot(
            &snapshot,
            &self.frontend_config.currency_symbol,
            self.network.as_deref(),
        );
        self.render(terminal)
    }

    fn render(&mut self, terminal: &mut Tui) -> Result<()> {
        let ctx = ui::RenderContext {
            view_model: &self.view_model,
            messages: self.consumer.message_log(),
            app_state: &self.app_state,
            message_panel_height: self.cli_config.ui.message_panel_height,
        };

        ui::render(terminal, &ctx)
    }
}

/// Requests account access without blocking input or rendering while the
/// wallet waits for approval. Results arrive on the wallet topic.
fn connect_in_background(handle: &RuntimeHandle) -> JoinHandle<()> {
    let handle = handle.clone();
    tokio::spawn(async move {
        if let Err(error) = handle.connect().await {
            tracing::debug!(%error, "Connect failed");
        }
    })
}

async fn recv(
    rx: &mut Option<broadcast::Receiver<RuntimeEvent>>,
) -> Option<Result<RuntimeEvent, RecvError>> {
    match rx.as_mut() {
        Some(rx) => Some(rx.recv().await),
        None => None,
    }
}

/// Rule rejections are already published as events; anything else means
/// the runtime is gone.
fn rejected(error: RuntimeError) -> Result<bool> {
    match error {
        RuntimeError::Select(_) | RuntimeError::Wager(_) => {
            tracing::debug!(%error, "Command rejected");
            Ok(false)
        }
        other => Err(other.into()),
    }
}
