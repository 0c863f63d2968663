//! Client runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

use client_blockchain_core::ProviderContract;
use client_blockchain_evm::EvmConfig;
use game_core::{GameConfig, Wager};
use runtime::RuntimeConfig;

/// Configuration required to bootstrap a client runtime.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub runtime: RuntimeConfig,
    /// Node endpoint; `None` means no wallet provider is available.
    pub evm: Option<EvmConfig>,
    /// How often receipts and logs are polled while a round is in flight.
    pub receipt_poll_interval: Duration,
    pub session_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            evm: None,
            receipt_poll_interval: ProviderContract::DEFAULT_POLL_INTERVAL,
            session_id: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `RPS_COUNTDOWN_SECS` - Countdown before a move is committed (default: 5)
    /// - `RPS_BALANCE_POLL_SECS` - Balance refresh interval (default: 10)
    /// - `RPS_RECEIPT_POLL_MS` - Receipt and log poll interval (default: 1000)
    /// - `RPS_CONFIRMATION_TIMEOUT_SECS` - Wait for a receipt (default: 120)
    /// - `RPS_OUTCOME_TIMEOUT_SECS` - Wait for the `GamePlayed` event (default: 120)
    /// - `RPS_DEFAULT_WAGER` - Initial wager (default: 0.001)
    /// - `RPS_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `RPS_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `RPS_SESSION_ID` - Session identifier for log files (default: auto-generated)
    ///
    /// Endpoint variables (`RPS_RPC_URL`, ...) are read by [`EvmConfig::from_env`].
    /// A malformed endpoint configuration disables the provider instead of
    /// failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| env::var(key).ok());

        config.evm = match EvmConfig::from_env() {
            Ok(evm) => evm,
            Err(error) => {
                tracing::warn!(%error, "Ignoring invalid endpoint configuration");
                None
            }
        };

        config
    }

    /// Build configuration from an arbitrary variable source. Invalid values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| read_var::<u64>(&lookup, key);
        let mut config = Self::default();

        if let Some(secs) = read("RPS_COUNTDOWN_SECS") {
            config.runtime.game_config =
                GameConfig::with_countdown_seconds(u32::try_from(secs).unwrap_or(u32::MAX));
        }

        if let Some(secs) = read("RPS_BALANCE_POLL_SECS") {
            config.runtime.balance_poll_interval = Duration::from_secs(secs.max(1));
        }

        if let Some(millis) = read("RPS_RECEIPT_POLL_MS") {
            config.receipt_poll_interval = Duration::from_millis(millis.max(10));
        }

        if let Some(secs) = read("RPS_CONFIRMATION_TIMEOUT_SECS") {
            config.runtime.adapter.confirmation_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(secs) = read("RPS_OUTCOME_TIMEOUT_SECS") {
            config.runtime.adapter.outcome_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(input) = lookup("RPS_DEFAULT_WAGER") {
            match Wager::parse(&input) {
                Ok(wager) => config.runtime.default_wager = wager,
                Err(error) => {
                    tracing::warn!(%input, %error, "Ignoring invalid default wager");
                }
            }
        }

        if let Some(capacity) = read_var::<usize>(&lookup, "RPS_EVENT_BUFFER") {
            config.runtime.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_var::<usize>(&lookup, "RPS_COMMAND_BUFFER") {
            config.runtime.command_buffer_size = capacity.max(1);
        }

        config.session_id = lookup("RPS_SESSION_ID").filter(|id| !id.trim().is_empty());

        config
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
