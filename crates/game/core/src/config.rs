/// Round configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Seconds between a choice being recorded and the move being committed.
    pub countdown_seconds: u32,
}

impl GameConfig {
    // ===== rules fixed by the contract =====
    /// Decimals of the chain's display denomination.
    pub const DISPLAY_DECIMALS: u32 = 18;
    /// Smallest accepted wager, in thousandths of the display unit (0.001).
    pub const MIN_WAGER_MILLIS: u128 = 1;
    /// Wagers must be a whole number of thousandths.
    pub const WAGER_STEP_DECIMALS: usize = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;
    pub const DEFAULT_WAGER: &'static str = "0.001";

    pub fn new() -> Self {
        Self {
            countdown_seconds: Self::DEFAULT_COUNTDOWN_SECONDS,
        }
    }

    pub fn with_countdown_seconds(countdown_seconds: u32) -> Self {
        Self {
            countdown_seconds: countdown_seconds.max(1),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
