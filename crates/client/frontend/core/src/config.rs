//! Frontend configuration structures and loaders.
//!
//! This module contains UI-specific configuration that is shared across
//! different frontend implementations (CLI, GUI, etc.).

use std::env;

/// Frontend-specific configuration.
#[derive(Clone, Debug)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    /// Ticker shown next to amounts.
    pub currency_symbol: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            messages: MessageConfig::default(),
            currency_symbol: Self::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl FrontendConfig {
    pub const DEFAULT_CURRENCY_SYMBOL: &'static str = "QUAI";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CLI_MESSAGE_CAPACITY` - Message log capacity (default: 64)
    /// - `SHOW_BALANCE_MESSAGES` - Log every balance refresh (default: false)
    /// - `SHOW_COUNTDOWN_MESSAGES` - Log every countdown tick (default: false)
    /// - `RPS_CURRENCY_SYMBOL` - Ticker for amounts (default: QUAI)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("CLI_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }

        if let Some(show) = read_env_bool("SHOW_BALANCE_MESSAGES") {
            config.messages.show_balance_updates = show;
        }
        if let Some(show) = read_env_bool("SHOW_COUNTDOWN_MESSAGES") {
            config.messages.show_countdown = show;
        }

        if let Ok(symbol) = env::var("RPS_CURRENCY_SYMBOL")
            && !symbol.trim().is_empty()
        {
            config.currency_symbol = symbol.trim().to_string();
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    /// Balance changes are already shown in the wallet panel.
    pub show_balance_updates: bool,
    /// The countdown is already shown in the round panel.
    pub show_countdown: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            show_balance_updates: false,
            show_countdown: false,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
