//! Wallet session manager: connect/disconnect lifecycle and balance polling.
//!
//! The manager is the only writer of the [`WalletSession`] slot. Readers take
//! a [`watch::Receiver`] via [`WalletSessionManager::subscribe`] and observe
//! connects, account switches, balance refreshes and disconnects in order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use client_blockchain_core::{Address, WalletProvider};
use game_core::Wei;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::WalletError;
use crate::events::{EventBus, WalletEvent};

/// A connected account and its last known balance.
///
/// The slot published by the manager is `Option<WalletSession>`: a balance
/// only exists together with an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub account: Address,
    /// `None` until the first successful balance fetch.
    pub balance: Option<Wei>,
}

pub type WalletState = Option<WalletSession>;

/// Owns the wallet session and its background balance refresh.
pub struct WalletSessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    session_tx: Arc<watch::Sender<WalletState>>,
    poll_interval: Duration,
    poller: Mutex<Option<JoinHandle<()>>>,
    connect_lock: tokio::sync::Mutex<()>,
    /// Bumped by every disconnect; a connect started under an older epoch
    /// must not publish its session.
    epoch: AtomicU64,
    event_bus: EventBus,
}

impl WalletSessionManager {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        poll_interval: Duration,
        event_bus: EventBus,
    ) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            provider,
            session_tx: Arc::new(session_tx),
            poll_interval,
            poller: Mutex::new(None),
            connect_lock: tokio::sync::Mutex::new(()),
            epoch: AtomicU64::new(0),
            event_bus,
        }
    }

    /// Whether a provider capability was detected at startup.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.session_tx.subscribe()
    }

    pub fn current(&self) -> WalletState {
        self.session_tx.borrow().clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.session_tx
            .borrow()
            .as_ref()
            .map(|session| session.account.clone())
    }

    /// Requests account access and starts balance polling.
    ///
    /// Failures are logged, published on the wallet topic and returned as a
    /// status; the existing session is left untouched.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        let _guard = self.connect_lock.lock().await;

        match self.try_connect().await {
            Ok(session) => {
                tracing::info!(
                    target: "runtime::wallet",
                    account = %session.account,
                    balance = ?session.balance,
                    "wallet connected"
                );
                self.event_bus.publish(WalletEvent::Connected {
                    account: session.account.clone(),
                    balance: session.balance,
                });
                Ok(session)
            }
            Err(error) => {
                tracing::warn!(target: "runtime::wallet", %error, "wallet connection failed");
                self.event_bus.publish(WalletEvent::ConnectionFailed {
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }

    async fn try_connect(&self) -> Result<WalletSession, WalletError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let provider = self
            .provider
            .as_ref()
            .ok_or(WalletError::ProviderUnavailable)?;

        let accounts = provider.request_accounts().await?;
        let account = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;

        let balance = match provider.get_balance(&account).await {
            Ok(balance) => Some(balance),
            Err(error) => {
                tracing::warn!(target: "runtime::wallet", %error, %account, "initial balance fetch failed");
                None
            }
        };

        let session = WalletSession { account, balance };
        // The epoch is checked under the watch lock, so a disconnect either
        // lands before this check or clears the published session after it.
        let mut published = false;
        self.session_tx.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *state = Some(session.clone());
            published = true;
            true
        });
        if !published {
            return Err(WalletError::Cancelled);
        }

        self.start_polling(Arc::clone(provider), session.account.clone());
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.stop_polling();
        }
        Ok(session)
    }

    /// Clears the session unconditionally. No request reaches the provider.
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.stop_polling();
        let previous = self.session_tx.send_replace(None);
        if let Some(session) = previous {
            tracing::info!(target: "runtime::wallet", account = %session.account, "wallet disconnected");
            self.event_bus.publish(WalletEvent::Disconnected);
        }
    }

    /// Fetches the balance now, outside the polling schedule.
    pub async fn refresh_balance(&self) {
        let (Some(provider), Some(account)) = (self.provider.as_ref(), self.account()) else {
            return;
        };
        refresh(provider.as_ref(), &account, &self.session_tx, &self.event_bus).await;
    }

    /// Stops polling. Called on shutdown; the session itself is kept.
    pub fn shutdown(&self) {
        self.stop_polling();
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .map(|poller| poller.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }

    fn start_polling(&self, provider: Arc<dyn WalletProvider>, account: Address) {
        let session_tx = Arc::clone(&self.session_tx);
        let event_bus = self.event_bus.clone();
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; connect already fetched.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                refresh(provider.as_ref(), &account, &session_tx, &event_bus).await;
            }
        });

        if let Ok(mut poller) = self.poller.lock()
            && let Some(previous) = poller.replace(task)
        {
            previous.abort();
        }
    }

    fn stop_polling(&self) {
        if let Ok(mut poller) = self.poller.lock()
            && let Some(task) = poller.take()
        {
            task.abort();
        }
    }
}

impl Drop for WalletSessionManager {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// Applies a fetched balance, discarding it if the account changed while the
/// request was in flight.
async fn refresh(
    provider: &dyn WalletProvider,
    account: &Address,
    session_tx: &watch::Sender<WalletState>,
    event_bus: &EventBus,
) {
    let balance = match provider.get_balance(account).await {
        Ok(balance) => balance,
        Err(error) => {
            tracing::warn!(target: "runtime::wallet", %error, %account, "balance refresh failed");
            return;
        }
    };

    let changed = session_tx.send_if_modified(|state| match state {
        Some(session) if &session.account == account && session.balance != Some(balance) => {
            session.balance = Some(balance);
            true
        }
        _ => false,
    });

    if changed {
        tracing::debug!(target: "runtime::wallet", %account, %balance, "balance updated");
        event_bus.publish(WalletEvent::BalanceUpdated {
            account: account.clone(),
            balance,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::MockWalletProvider;

    const POLL: Duration = Duration::from_secs(10);

    fn manager(mock: &Arc<MockWalletProvider>) -> WalletSessionManager {
        let provider: Arc<dyn WalletProvider> = mock.clone();
        WalletSessionManager::new(Some(provider), POLL, EventBus::new())
    }

    #[tokio::test(start_paused = true)]
    async fn connect_takes_first_account_and_balance() {
        let mock = Arc::new(MockWalletProvider::new());
        let wallet = manager(&mock);
        let account = mock.accounts()[0].clone();

        let session = wallet.connect().await.unwrap();
        assert_eq!(session.account, account);
        assert_eq!(session.balance, Some(Wei(mock.balance_of(&account))));
        assert_eq!(wallet.current(), Some(session));
        assert!(wallet.is_polling());
    }

    #[tokio::test]
    async fn connect_without_provider_is_a_status() {
        let wallet = WalletSessionManager::new(None, POLL, EventBus::new());
        let mut events = wallet.event_bus.subscribe(crate::events::Topic::Wallet);

        assert_eq!(wallet.connect().await, Err(WalletError::ProviderUnavailable));
        assert_eq!(wallet.current(), None);
        assert!(matches!(
            events.recv().await.unwrap(),
            crate::events::Event::Wallet(WalletEvent::ConnectionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn rejected_and_empty_account_requests() {
        let mock = Arc::new(MockWalletProvider::new());
        let wallet = manager(&mock);

        mock.set_reject_accounts(true);
        assert_eq!(wallet.connect().await, Err(WalletError::ConnectionRejected));
        assert_eq!(wallet.current(), None);

        mock.set_reject_accounts(false);
        mock.set_accounts(vec![]);
        assert_eq!(wallet.connect().await, Err(WalletError::NoAccounts));
        assert_eq!(wallet.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_balance_until_disconnect() {
        let mock = Arc::new(MockWalletProvider::new());
        let wallet = manager(&mock);
        let account = mock.accounts()[0].clone();
        let mut rx = wallet.subscribe();

        wallet.connect().await.unwrap();
        rx.borrow_and_update();
        assert_eq!(mock.request_count("eth_getBalance"), 1);

        mock.set_balance(&account, 42);
        tokio::time::sleep(POLL + Duration::from_millis(1)).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().balance, Some(Wei(42)));
        assert_eq!(mock.request_count("eth_getBalance"), 2);

        wallet.disconnect();
        assert_eq!(wallet.current(), None);
        assert!(!wallet.is_polling());

        tokio::time::sleep(POLL * 5).await;
        assert_eq!(mock.request_count("eth_getBalance"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_last_balance() {
        let mock = Arc::new(MockWalletProvider::new());
        let wallet = manager(&mock);

        let session = wallet.connect().await.unwrap();
        mock.fail_method("eth_getBalance", true);
        tokio::time::sleep(POLL * 2 + Duration::from_millis(1)).await;

        assert_eq!(wallet.current().unwrap().balance, session.balance);
        assert!(wallet.is_polling());
    }

    #[tokio::test]
    async fn late_refresh_for_previous_account_is_discarded() {
        let mock = Arc::new(MockWalletProvider::new());
        let old = mock.accounts()[0].clone();
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();

        let other = client_blockchain_core::mock::mock_address(0xbb);
        mock.set_accounts(vec![other.clone()]);
        mock.set_balance(&other, 7);
        wallet.connect().await.unwrap();

        refresh(mock.as_ref(), &old, &wallet.session_tx, &wallet.event_bus).await;
        let current = wallet.current().unwrap();
        assert_eq!(current.account, other);
        assert_eq!(current.balance, Some(Wei(7)));
    }

    #[tokio::test]
    async fn disconnect_never_touches_the_provider() {
        let mock = Arc::new(MockWalletProvider::new());
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();
        let before: usize = ["eth_requestAccounts", "eth_getBalance"]
            .iter()
            .map(|m| mock.request_count(m))
            .sum();

        wallet.disconnect();
        wallet.disconnect();

        let after: usize = ["eth_requestAccounts", "eth_getBalance"]
            .iter()
            .map(|m| mock.request_count(m))
            .sum();
        assert_eq!(before, after);
    }

    /// Provider whose account request waits until the test releases it.
    struct GatedProvider {
        inner: Arc<MockWalletProvider>,
        requested: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl WalletProvider for GatedProvider {
        async fn request(
            &self,
            request: client_blockchain_core::RpcRequest,
        ) -> Result<serde_json::Value, client_blockchain_core::ProviderError> {
            if request.method == "eth_requestAccounts" {
                self.requested.notify_one();
                self.release.notified().await;
            }
            self.inner.request(request).await
        }
    }

    #[tokio::test]
    async fn disconnect_during_pending_connect_wins() {
        let requested = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let provider: Arc<dyn WalletProvider> = Arc::new(GatedProvider {
            inner: Arc::new(MockWalletProvider::new()),
            requested: Arc::clone(&requested),
            release: Arc::clone(&release),
        });
        let wallet = Arc::new(WalletSessionManager::new(Some(provider), POLL, EventBus::new()));

        let pending = tokio::spawn({
            let wallet = Arc::clone(&wallet);
            async move { wallet.connect().await }
        });
        requested.notified().await;

        wallet.disconnect();
        release.notify_one();

        assert_eq!(pending.await.unwrap(), Err(WalletError::Cancelled));
        assert_eq!(wallet.current(), None);
        assert!(!wallet.is_polling());
    }
}
