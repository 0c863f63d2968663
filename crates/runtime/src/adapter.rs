//! Contract interaction adapter.
//!
//! Turns a committed [`RoundRequest`] into a transaction, waits for it to be
//! mined and follows the contract's `GamePlayed` log until the event for that
//! transaction arrives. Progress is reported to the game worker as
//! generation-tagged [`RoundReport`]s.

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{
    Address, GamePlayedEvent, RpsContract, SubmissionError, TransactionReceipt, TxHash,
};
use game_core::{Choice, Generation, RoundRequest, Wei};
use tokio::sync::mpsc;

/// Progress of one submitted round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundReport {
    Sent {
        generation: Generation,
        tx: TxHash,
    },
    Confirmed {
        generation: Generation,
        tx: TxHash,
        block: u64,
    },
    Resolved {
        generation: Generation,
        event: GamePlayedEvent,
    },
    Failed {
        generation: Generation,
        error: SubmissionError,
    },
}

impl RoundReport {
    pub fn generation(&self) -> Generation {
        match self {
            RoundReport::Sent { generation, .. }
            | RoundReport::Confirmed { generation, .. }
            | RoundReport::Resolved { generation, .. }
            | RoundReport::Failed { generation, .. } => *generation,
        }
    }
}

/// How a `GamePlayed` event relates to the submitted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// Emitted by the submitted transaction.
    Exact,
    /// Another player's round, or an earlier round by the same player.
    Unrelated,
}

/// What the adapter knows about a submitted move while waiting for its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub player: Address,
    pub tx: TxHash,
    pub block: u64,
}

impl PendingMove {
    /// Only the log of the submitted transaction resolves the round. A log
    /// with the same player, choice and bet from an abandoned round can land
    /// in the same block.
    pub fn correlate(&self, event: &GamePlayedEvent) -> Correlation {
        if event.player == self.player && event.transaction_hash == self.tx {
            Correlation::Exact
        } else {
            Correlation::Unrelated
        }
    }
}

/// Timeouts applied to a round after the transaction is sent.
#[derive(Debug, Clone, Copy)]
pub struct AdapterConfig {
    pub confirmation_timeout: Duration,
    pub outcome_timeout: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(120),
            outcome_timeout: Duration::from_secs(120),
        }
    }
}

/// Submits moves and delivers their outcomes.
pub struct ContractAdapter {
    contract: Arc<dyn RpsContract>,
    config: AdapterConfig,
}

impl ContractAdapter {
    pub fn new(contract: Arc<dyn RpsContract>, config: AdapterConfig) -> Self {
        Self { contract, config }
    }

    pub fn contract(&self) -> &Arc<dyn RpsContract> {
        &self.contract
    }

    /// Sends `play(choice)` carrying `wager`.
    ///
    /// A known balance below the wager fails before anything is signed.
    pub async fn submit_move(
        &self,
        account: &Address,
        balance: Option<Wei>,
        choice: Choice,
        wager: Wei,
    ) -> Result<TxHash, SubmissionError> {
        if let Some(available) = balance
            && available < wager
        {
            return Err(SubmissionError::InsufficientFunds {
                required: wager,
                available: Some(available),
            });
        }
        self.contract.play(account, choice, wager).await
    }

    pub async fn await_confirmation(
        &self,
        tx: &TxHash,
    ) -> Result<TransactionReceipt, SubmissionError> {
        self.contract
            .wait_for_receipt(tx, self.config.confirmation_timeout)
            .await
    }

    /// Follows `GamePlayed` from the receipt's block until the event for
    /// `pending` arrives. The subscription is released on return.
    pub async fn await_outcome(
        &self,
        pending: &PendingMove,
    ) -> Result<GamePlayedEvent, SubmissionError> {
        let mut events = self
            .contract
            .subscribe_game_played(&pending.player, pending.block)
            .await?;

        let wait = async {
            while let Some(next) = events.next().await {
                let event = match next {
                    Ok(event) => event,
                    Err(error) => return Err(error),
                };
                match pending.correlate(&event) {
                    Correlation::Exact => return Ok(event),
                    Correlation::Unrelated => {
                        tracing::trace!(
                            target: "runtime::adapter",
                            tx = %event.transaction_hash,
                            "ignoring unrelated GamePlayed event"
                        );
                    }
                }
            }
            Err(SubmissionError::SubscriptionClosed)
        };

        tokio::time::timeout(self.config.outcome_timeout, wait)
            .await
            .map_err(|_| SubmissionError::OutcomeTimeout(pending.tx.clone()))?
    }

    /// Runs a committed round to completion, reporting each step.
    ///
    /// Exactly one `Resolved` or `Failed` report is sent per call.
    pub async fn run_round(
        &self,
        account: Address,
        balance: Option<Wei>,
        request: RoundRequest,
        reports: mpsc::Sender<RoundReport>,
    ) {
        let generation = request.generation;
        let report = match self.play(&account, balance, &request, &reports).await {
            Ok(event) => RoundReport::Resolved { generation, event },
            Err(error) => RoundReport::Failed { generation, error },
        };
        if reports.send(report).await.is_err() {
            tracing::debug!(target: "runtime::adapter", %generation, "game worker gone before round finished");
        }
    }

    async fn play(
        &self,
        account: &Address,
        balance: Option<Wei>,
        request: &RoundRequest,
        reports: &mpsc::Sender<RoundReport>,
    ) -> Result<GamePlayedEvent, SubmissionError> {
        let generation = request.generation;
        let wager = request.wager.amount();

        let tx = self
            .submit_move(account, balance, request.choice, wager)
            .await?;
        let _ = reports
            .send(RoundReport::Sent {
                generation,
                tx: tx.clone(),
            })
            .await;

        let receipt = self.await_confirmation(&tx).await?;
        let _ = reports
            .send(RoundReport::Confirmed {
                generation,
                tx: tx.clone(),
                block: receipt.block_number,
            })
            .await;

        let pending = PendingMove {
            player: account.clone(),
            tx,
            block: receipt.block_number,
        };
        self.await_outcome(&pending).await
    }

    /// Sends `withdraw()` from `account`. Only the contract's recipient can
    /// succeed; the contract reverts for anyone else.
    pub async fn withdraw(&self, account: &Address) -> Result<TransactionReceipt, SubmissionError> {
        let tx = self.contract.withdraw(account).await?;
        self.await_confirmation(&tx).await
    }

    pub async fn min_bet(&self) -> Result<Wei, SubmissionError> {
        self.contract.min_bet().await
    }

    pub async fn recipient(&self) -> Result<Address, SubmissionError> {
        self.contract.recipient().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{
        MockWalletProvider, OutcomeSubscription, ProviderContract, WalletProvider,
    };
    use game_core::{Outcome, Wager};

    const MILLI: u128 = 1_000_000_000_000_000;

    fn setup(config: AdapterConfig) -> (Arc<MockWalletProvider>, ContractAdapter, Address) {
        let mock = Arc::new(MockWalletProvider::new());
        let provider: Arc<dyn WalletProvider> = mock.clone();
        let contract = ProviderContract::new(provider, mock.contract_address().clone())
            .with_poll_interval(Duration::from_millis(100));
        let account = mock.accounts()[0].clone();
        (mock, ContractAdapter::new(Arc::new(contract), config), account)
    }

    fn request(choice: Choice) -> RoundRequest {
        RoundRequest {
            generation: Generation(1),
            choice,
            wager: Wager::default(),
        }
    }

    async fn collect(mut rx: mpsc::Receiver<RoundReport>) -> Vec<RoundReport> {
        let mut out = Vec::new();
        while let Some(report) = rx.recv().await {
            out.push(report);
        }
        out
    }

    fn played(player: &Address, tx: &str, block: u64, outcome: Outcome) -> GamePlayedEvent {
        GamePlayedEvent {
            player: player.clone(),
            bet: Wei(MILLI),
            player_choice: Choice::Paper,
            bot_choice: Choice::Rock,
            outcome,
            block_number: block,
            transaction_hash: TxHash::new(tx),
        }
    }

    /// Contract whose subscription replays a fixed list of logs.
    struct ReplayContract {
        address: Address,
        logs: Vec<GamePlayedEvent>,
    }

    #[async_trait::async_trait]
    impl RpsContract for ReplayContract {
        fn address(&self) -> &Address {
            &self.address
        }

        async fn play(&self, _: &Address, _: Choice, _: Wei) -> Result<TxHash, SubmissionError> {
            Err(SubmissionError::NotConnected)
        }

        async fn wait_for_receipt(
            &self,
            tx: &TxHash,
            _: Duration,
        ) -> Result<TransactionReceipt, SubmissionError> {
            Err(SubmissionError::ConfirmationTimeout(tx.clone()))
        }

        async fn subscribe_game_played(
            &self,
            _: &Address,
            _: u64,
        ) -> Result<OutcomeSubscription, SubmissionError> {
            let (tx, rx) = mpsc::channel(self.logs.len().max(1));
            for log in &self.logs {
                let _ = tx.try_send(Ok(log.clone()));
            }
            Ok(OutcomeSubscription::from_receiver(rx))
        }

        async fn withdraw(&self, _: &Address) -> Result<TxHash, SubmissionError> {
            Err(SubmissionError::NotConnected)
        }

        async fn min_bet(&self) -> Result<Wei, SubmissionError> {
            Ok(Wei(MILLI))
        }

        async fn recipient(&self) -> Result<Address, SubmissionError> {
            Ok(self.address.clone())
        }
    }

    #[test]
    fn correlation_requires_transaction_hash() {
        let player = client_blockchain_core::mock::mock_address(0xaa);
        let pending = PendingMove {
            player: player.clone(),
            tx: TxHash::new("0x01"),
            block: 10,
        };

        let own = played(&player, "0x01", 10, Outcome::Win);
        assert_eq!(pending.correlate(&own), Correlation::Exact);

        // Same player, choice and bet, later block, different transaction.
        let lookalike = played(&player, "0x02", 11, Outcome::Win);
        assert_eq!(pending.correlate(&lookalike), Correlation::Unrelated);

        let mut stranger = own.clone();
        stranger.player = client_blockchain_core::mock::mock_address(0xbb);
        assert_eq!(pending.correlate(&stranger), Correlation::Unrelated);
    }

    #[tokio::test]
    async fn abandoned_round_in_same_block_is_not_taken() {
        let player = client_blockchain_core::mock::mock_address(0xaa);
        let contract = ReplayContract {
            address: client_blockchain_core::mock::mock_address(0xc0),
            logs: vec![
                played(&player, "0xaaa", 10, Outcome::Lose),
                played(&player, "0xbbb", 10, Outcome::Win),
            ],
        };
        let adapter = ContractAdapter::new(Arc::new(contract), AdapterConfig::default());

        let event = adapter
            .await_outcome(&PendingMove {
                player,
                tx: TxHash::new("0xbbb"),
                block: 10,
            })
            .await
            .unwrap();

        assert_eq!(event.transaction_hash, TxHash::new("0xbbb"));
        assert_eq!(event.outcome, Outcome::Win);
    }

    #[tokio::test(start_paused = true)]
    async fn round_reports_sent_confirmed_resolved() {
        let (mock, adapter, account) = setup(AdapterConfig::default());
        mock.push_bot_choice(Choice::Rock);
        let (tx, rx) = mpsc::channel(8);

        adapter
            .run_round(account.clone(), None, request(Choice::Paper), tx)
            .await;
        let reports = collect(rx).await;

        assert_eq!(reports.len(), 3);
        assert!(matches!(reports[0], RoundReport::Sent { .. }));
        assert!(matches!(reports[1], RoundReport::Confirmed { .. }));
        let RoundReport::Resolved { event, .. } = &reports[2] else {
            panic!("expected resolution, got {:?}", reports[2]);
        };
        assert_eq!(event.player, account);
        assert_eq!(event.player_choice, Choice::Paper);
        assert_eq!(event.bot_choice, Choice::Rock);
        assert_eq!(event.outcome, Outcome::Win);
    }

    #[tokio::test(start_paused = true)]
    async fn known_low_balance_fails_before_signing() {
        let (mock, adapter, account) = setup(AdapterConfig::default());
        let (tx, rx) = mpsc::channel(8);

        adapter
            .run_round(account, Some(Wei(10)), request(Choice::Rock), tx)
            .await;

        assert_eq!(
            collect(rx).await,
            vec![RoundReport::Failed {
                generation: Generation(1),
                error: SubmissionError::InsufficientFunds {
                    required: Wei(MILLI),
                    available: Some(Wei(10)),
                },
            }]
        );
        assert!(mock.sent_transactions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_event_times_out() {
        let config = AdapterConfig {
            confirmation_timeout: Duration::from_secs(5),
            outcome_timeout: Duration::from_secs(5),
        };
        let (mock, adapter, account) = setup(config);
        mock.set_withhold_events(true);
        let (tx, rx) = mpsc::channel(8);

        adapter
            .run_round(account, None, request(Choice::Rock), tx)
            .await;
        let reports = collect(rx).await;

        assert!(matches!(
            reports.last(),
            Some(RoundReport::Failed {
                error: SubmissionError::OutcomeTimeout(_),
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_events_are_skipped() {
        let (mock, adapter, account) = setup(AdapterConfig::default());
        mock.push_bot_choice(Choice::Paper);

        let hash = adapter
            .submit_move(&account, None, Choice::Scissors, Wei(MILLI))
            .await
            .unwrap();
        let receipt = adapter.await_confirmation(&hash).await.unwrap();
        // Another round by the same player with the same choice and bet lands later.
        mock.emit_game_played(&account, Wei(MILLI), Choice::Scissors, Choice::Rock, Outcome::Lose);

        let event = adapter
            .await_outcome(&PendingMove {
                player: account,
                tx: hash.clone(),
                block: receipt.block_number,
            })
            .await
            .unwrap();
        assert_eq!(event.transaction_hash, hash);
        assert_eq!(event.outcome, Outcome::Win);
    }

    #[tokio::test]
    async fn exposes_contract_views() {
        let (mock, adapter, _account) = setup(AdapterConfig::default());
        assert_eq!(adapter.min_bet().await.unwrap(), Wei(MILLI));
        assert_eq!(&adapter.recipient().await.unwrap(), mock.recipient());
    }
}
