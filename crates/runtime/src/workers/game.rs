//! Game worker that owns the authoritative [`GameSession`] and [`Score`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), countdown
//! messages, round reports from the contract adapter and wallet session
//! changes, and applies them one at a time. Every asynchronous input carries
//! the round generation it was started for; the session rejects the ones
//! that no longer match.

use std::sync::Arc;

use client_blockchain_core::{Address, GamePlayedEvent, SubmissionError};
use game_core::{
    Choice, GameConfig, GameSession, Generation, ResolveError, RoundOutcome, RoundRequest,
    RoundTicket, Score, Settlement, Wager,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapter::{ContractAdapter, RoundReport};
use crate::api::{Result, RuntimeError};
use crate::events::{EventBus, GameEvent};
use crate::timer::{CountdownTimer, TimerMessage};
use crate::wallet::{WalletSessionManager, WalletState};

const INTERNAL_BUFFER: usize = 16;

/// Commands that can be sent to the game worker
pub enum Command {
    /// Record a choice and start the countdown (Idle only).
    SelectChoice {
        choice: Choice,
        reply: oneshot::Sender<Result<RoundTicket>>,
    },
    /// Replace the wager; invalid input keeps the previous value.
    SetWager {
        input: String,
        reply: oneshot::Sender<Result<Wager>>,
    },
    /// Return to Idle, abandoning any round in flight.
    Reset { reply: oneshot::Sender<Generation> },
    /// Read-only copy of the session and score.
    QueryState {
        reply: oneshot::Sender<(GameSession, Score)>,
    },
    /// Stop the worker after abandoning any round in flight.
    Shutdown,
}

/// Background task that drives rounds.
pub struct GameWorker {
    session: GameSession,
    score: Score,
    config: GameConfig,
    account: Option<Address>,
    wallet: Arc<WalletSessionManager>,
    wallet_rx: watch::Receiver<WalletState>,
    adapter: Option<Arc<ContractAdapter>>,
    command_rx: mpsc::Receiver<Command>,
    timer_tx: mpsc::Sender<TimerMessage>,
    timer_rx: mpsc::Receiver<TimerMessage>,
    report_tx: mpsc::Sender<RoundReport>,
    report_rx: mpsc::Receiver<RoundReport>,
    timer: Option<CountdownTimer>,
    round: Option<JoinHandle<()>>,
    event_bus: EventBus,
}

impl GameWorker {
    pub fn new(
        config: GameConfig,
        wager: Wager,
        wallet: Arc<WalletSessionManager>,
        adapter: Option<Arc<ContractAdapter>>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::channel(INTERNAL_BUFFER);
        let (report_tx, report_rx) = mpsc::channel(INTERNAL_BUFFER);
        let mut wallet_rx = wallet.subscribe();
        let account = wallet_rx
            .borrow_and_update()
            .as_ref()
            .map(|session| session.account.clone());

        info!(
            target: "runtime::game",
            countdown = config.countdown_seconds,
            %wager,
            contract = adapter.is_some(),
            "GameWorker initialized"
        );

        Self {
            session: GameSession::new(wager),
            score: Score::new(),
            config,
            account,
            wallet,
            wallet_rx,
            adapter,
            command_rx,
            timer_tx,
            timer_rx,
            report_tx,
            report_rx,
            timer: None,
            round: None,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut wallet_open = true;
        loop {
            tokio::select! {
                biased;

                changed = self.wallet_rx.changed(), if wallet_open => {
                    if changed.is_err() {
                        wallet_open = false;
                    }
                    self.handle_wallet_change();
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(message) = self.timer_rx.recv() => {
                    self.handle_timer(message);
                }
                Some(report) = self.report_rx.recv() => {
                    self.handle_report(report);
                }
            }
        }

        self.abandon_round();
        debug!(target: "runtime::game", "GameWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        // A command issued right after connect/disconnect must see the new account.
        self.handle_wallet_change();

        match cmd {
            Command::SelectChoice { choice, reply } => {
                let result = self.select_choice(choice);
                if reply.send(result).is_err() {
                    debug!("SelectChoice reply channel closed (caller dropped)");
                }
            }
            Command::SetWager { input, reply } => {
                let result = self.set_wager(&input);
                if reply.send(result).is_err() {
                    debug!("SetWager reply channel closed (caller dropped)");
                }
            }
            Command::Reset { reply } => {
                let generation = self.reset();
                if reply.send(generation).is_err() {
                    debug!("Reset reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send((self.session.clone(), self.score)).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn select_choice(&mut self, choice: Choice) -> Result<RoundTicket> {
        let connected = self.account.is_some();
        let ticket = match self
            .session
            .select_choice(choice, connected, self.config.countdown_seconds)
        {
            Ok(ticket) => ticket,
            Err(error) => {
                warn!(target: "runtime::game", %choice, %error, "choice rejected");
                self.event_bus.publish(GameEvent::SelectionRejected {
                    reason: error.to_string(),
                });
                return Err(RuntimeError::Select(error));
            }
        };

        // Replacing the previous timer aborts it.
        self.timer = Some(CountdownTimer::start(
            ticket.generation,
            ticket.seconds,
            self.timer_tx.clone(),
        ));

        info!(
            target: "runtime::game",
            generation = %ticket.generation,
            %choice,
            seconds = ticket.seconds,
            "round started"
        );
        self.event_bus.publish(GameEvent::RoundStarted {
            generation: ticket.generation,
            choice,
            seconds: ticket.seconds,
        });
        Ok(ticket)
    }

    fn set_wager(&mut self, input: &str) -> Result<Wager> {
        match self.session.set_wager(input) {
            Ok(wager) => {
                let wager = wager.clone();
                debug!(target: "runtime::game", %wager, "wager changed");
                self.event_bus
                    .publish(GameEvent::WagerChanged { wager: wager.clone() });
                Ok(wager)
            }
            Err(error) => {
                warn!(target: "runtime::game", input, %error, "wager rejected");
                self.event_bus.publish(GameEvent::WagerRejected {
                    input: input.to_string(),
                    reason: error.to_string(),
                });
                Err(RuntimeError::Wager(error))
            }
        }
    }

    fn reset(&mut self) -> Generation {
        self.abandon_round();
        let generation = self.session.reset();
        info!(target: "runtime::game", %generation, "session reset");
        self.event_bus.publish(GameEvent::SessionReset {
            generation,
            score: self.score,
        });
        generation
    }

    fn handle_timer(&mut self, message: TimerMessage) {
        match message {
            TimerMessage::Tick {
                generation,
                remaining,
            } => {
                if self.session.tick(generation, remaining) {
                    self.event_bus.publish(GameEvent::CountdownTick {
                        generation,
                        remaining,
                    });
                } else {
                    debug!(target: "runtime::game", %generation, "stale countdown tick ignored");
                }
            }
            TimerMessage::Expired { generation } => {
                if self
                    .timer
                    .as_ref()
                    .is_some_and(|timer| timer.generation() == generation)
                {
                    self.timer = None;
                }
                match self.session.expire(generation) {
                    Some(request) => self.submit(request),
                    None => {
                        debug!(target: "runtime::game", %generation, "stale countdown expiry ignored")
                    }
                }
            }
        }
    }

    /// Hands the committed move to the adapter. Called once per round.
    fn submit(&mut self, request: RoundRequest) {
        let generation = request.generation;
        info!(
            target: "runtime::game",
            %generation,
            choice = %request.choice,
            wager = %request.wager,
            "countdown expired, submitting move"
        );
        self.event_bus.publish(GameEvent::Submitting {
            generation,
            choice: request.choice,
            wager: request.wager.clone(),
        });

        let wallet = self.wallet_rx.borrow().clone();
        let Some(wallet) = wallet else {
            self.fail_round(generation, &RuntimeError::NotConnected.to_string());
            return;
        };
        let Some(adapter) = self.adapter.clone() else {
            self.fail_round(generation, &RuntimeError::ContractNotConfigured.to_string());
            return;
        };

        let reports = self.report_tx.clone();
        self.round = Some(tokio::spawn(async move {
            adapter
                .run_round(wallet.account, wallet.balance, request, reports)
                .await;
        }));
    }

    fn handle_report(&mut self, report: RoundReport) {
        let current = self.session.generation();
        match report {
            RoundReport::Sent { generation, tx } if generation == current => {
                info!(target: "runtime::game", %generation, %tx, "transaction sent");
                self.event_bus
                    .publish(GameEvent::TransactionSent { generation, tx });
            }
            RoundReport::Confirmed {
                generation,
                tx,
                block,
            } if generation == current => {
                info!(target: "runtime::game", %generation, %tx, block, "transaction confirmed");
                self.event_bus.publish(GameEvent::TransactionConfirmed {
                    generation,
                    tx,
                    block,
                });
            }
            RoundReport::Resolved { generation, event } => self.resolve(generation, event),
            RoundReport::Failed { generation, error } => self.fail(generation, error),
            stale => {
                debug!(
                    target: "runtime::game",
                    generation = %stale.generation(),
                    %current,
                    "stale round progress ignored"
                );
            }
        }
    }

    fn resolve(&mut self, generation: Generation, event: GamePlayedEvent) {
        let outcome = RoundOutcome {
            bot_choice: event.bot_choice,
            outcome: event.outcome,
        };
        match self.session.resolve(generation, outcome) {
            Ok(round) => {
                self.round = None;
                if !self.score.record(&round) {
                    debug!(target: "runtime::game", %generation, "round already counted");
                }
                let settlement = Settlement::for_outcome(round.outcome.outcome, event.bet);
                info!(
                    target: "runtime::game",
                    %generation,
                    player = %round.player_choice,
                    bot = %round.outcome.bot_choice,
                    outcome = %round.outcome.outcome,
                    player_wins = self.score.player_wins,
                    bot_wins = self.score.bot_wins,
                    "round resolved"
                );
                self.event_bus.publish(GameEvent::RoundResolved {
                    round,
                    settlement,
                    score: self.score,
                });

                let wallet = Arc::clone(&self.wallet);
                tokio::spawn(async move { wallet.refresh_balance().await });
            }
            Err(error @ ResolveError::Stale { .. }) => {
                warn!(target: "runtime::game", %error, tx = %event.transaction_hash, "stale outcome discarded");
            }
            Err(error) => {
                debug!(target: "runtime::game", %error, "outcome not applied");
            }
        }
    }

    fn fail(&mut self, generation: Generation, error: SubmissionError) {
        match error {
            SubmissionError::UserRejected | SubmissionError::InsufficientFunds { .. } => {
                warn!(target: "runtime::game", %generation, %error, "move not submitted");
            }
            _ => warn!(target: "runtime::game", %generation, %error, "round failed"),
        }
        self.fail_round(generation, &error.to_string());
    }

    fn fail_round(&mut self, generation: Generation, reason: &str) {
        match self.session.fail(generation, reason) {
            Ok(()) => {
                self.round = None;
                self.event_bus.publish(GameEvent::RoundFailed {
                    generation,
                    reason: reason.to_string(),
                });
            }
            Err(error) => {
                debug!(target: "runtime::game", %error, "failure for settled or stale round ignored");
            }
        }
    }

    /// Resets the session and clears the score whenever the connected account
    /// changes, including connect and disconnect.
    fn handle_wallet_change(&mut self) {
        let account = self
            .wallet_rx
            .borrow_and_update()
            .as_ref()
            .map(|session| session.account.clone());
        if account == self.account {
            return;
        }

        info!(
            target: "runtime::game",
            from = ?self.account.as_ref().map(Address::as_str),
            to = ?account.as_ref().map(Address::as_str),
            "wallet account changed"
        );
        self.account = account;
        self.score.clear();
        self.reset();
    }

    fn abandon_round(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if let Some(round) = self.round.take() {
            round.abort();
        }
    }
}
