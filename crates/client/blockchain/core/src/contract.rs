//! [`RpsContract`] implemented on top of any [`WalletProvider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use game_core::{Choice, Wei};
use tokio::sync::mpsc;

use crate::abi::{self, MIN_BET_SIGNATURE, RECIPIENT_SIGNATURE, WITHDRAW_SIGNATURE};
use crate::subscription::{EventResult, OutcomeSubscription};
use crate::traits::{RpsContract, SubmissionError, WalletProvider};
use crate::types::{Address, TransactionReceipt, TransactionRequest, TxHash, to_quantity};

/// Buffered events per subscription before the poller waits on the reader.
const SUBSCRIPTION_BUFFER: usize = 16;

/// Contract bindings that route every call through a wallet provider.
///
/// Receipts are polled with `eth_getTransactionReceipt`; events are followed
/// by polling `eth_getLogs` over the blocks produced since the last poll.
#[derive(Clone)]
pub struct ProviderContract {
    provider: Arc<dyn WalletProvider>,
    address: Address,
    receipt_poll_interval: Duration,
    log_poll_interval: Duration,
}

impl ProviderContract {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

    pub fn new(provider: Arc<dyn WalletProvider>, address: Address) -> Self {
        Self {
            provider,
            address,
            receipt_poll_interval: Self::DEFAULT_POLL_INTERVAL,
            log_poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self.log_poll_interval = interval;
        self
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    async fn send(
        &self,
        from: &Address,
        value: Wei,
        data: String,
    ) -> Result<TxHash, SubmissionError> {
        let tx = TransactionRequest {
            from: from.clone(),
            to: self.address.clone(),
            value: to_quantity(value.get()),
            data,
        };
        self.provider
            .send_transaction(tx)
            .await
            .map_err(|error| SubmissionError::from_send(error, value))
    }
}

#[async_trait]
impl RpsContract for ProviderContract {
    fn address(&self) -> &Address {
        &self.address
    }

    async fn play(
        &self,
        from: &Address,
        choice: Choice,
        value: Wei,
    ) -> Result<TxHash, SubmissionError> {
        let hash = self.send(from, value, abi::encode_play(choice)).await?;
        tracing::info!(%hash, %choice, %value, "play transaction sent");
        Ok(hash)
    }

    async fn wait_for_receipt(
        &self,
        tx: &TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, SubmissionError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.provider.get_transaction_receipt(tx).await? {
                    return Ok::<_, SubmissionError>(receipt);
                }
                tokio::time::sleep(self.receipt_poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| SubmissionError::ConfirmationTimeout(tx.clone()))??;

        if !receipt.success {
            return Err(SubmissionError::Reverted(tx.clone()));
        }
        tracing::debug!(hash = %tx, block = receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    async fn subscribe_game_played(
        &self,
        player: &Address,
        from_block: u64,
    ) -> Result<OutcomeSubscription, SubmissionError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let poller = LogPoller {
            provider: Arc::clone(&self.provider),
            contract: self.address.clone(),
            player: player.clone(),
            topic: abi::game_played_topic(),
            next_block: from_block,
            interval: self.log_poll_interval,
        };
        let task = tokio::spawn(poller.run(sender));
        Ok(OutcomeSubscription::new(receiver, task))
    }

    async fn withdraw(&self, from: &Address) -> Result<TxHash, SubmissionError> {
        self.send(from, Wei::ZERO, abi::encode_call(WITHDRAW_SIGNATURE))
            .await
    }

    async fn min_bet(&self) -> Result<Wei, SubmissionError> {
        let data = self
            .provider
            .call(&self.address, &abi::encode_call(MIN_BET_SIGNATURE))
            .await?;
        Ok(Wei(abi::decode_uint_return(&data)?))
    }

    async fn recipient(&self) -> Result<Address, SubmissionError> {
        let data = self
            .provider
            .call(&self.address, &abi::encode_call(RECIPIENT_SIGNATURE))
            .await?;
        Ok(abi::decode_address_return(&data)?)
    }
}

/// Background task behind [`OutcomeSubscription`].
struct LogPoller {
    provider: Arc<dyn WalletProvider>,
    contract: Address,
    player: Address,
    topic: String,
    next_block: u64,
    interval: Duration,
}

impl LogPoller {
    async fn run(mut self, sender: mpsc::Sender<EventResult>) {
        loop {
            if let Err(error) = self.poll_once(&sender).await {
                // Transient provider failures are retried on the next tick.
                tracing::warn!(%error, from_block = self.next_block, "log poll failed");
            }
            if sender.is_closed() {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    async fn poll_once(&mut self, sender: &mpsc::Sender<EventResult>) -> Result<(), SubmissionError> {
        let head = self.provider.block_number().await?;
        if head < self.next_block {
            return Ok(());
        }

        let logs = self
            .provider
            .get_logs(&self.contract, &self.topic, self.next_block, head)
            .await?;
        self.next_block = head + 1;

        for log in logs {
            match abi::decode_game_played(&log) {
                Ok(event) if event.player == self.player => {
                    if sender.send(Ok(event)).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%error, tx = %log.transaction_hash, "skipping undecodable log");
                }
            }
        }
        Ok(())
    }
}
