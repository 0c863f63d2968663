//! Wager amounts and payout arithmetic.
//!
//! Wagers are entered as decimal strings in the chain's display denomination
//! and carried as [`Wei`], the smallest integer unit, for transmission.

use std::fmt;

use crate::choice::Outcome;
use crate::config::GameConfig;

/// Amount in the chain's smallest integer unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    pub const fn saturating_mul(self, factor: u128) -> Self {
        Self(self.0.saturating_mul(factor))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

/// Reasons a wager input is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WagerError {
    #[error("wager is empty")]
    Empty,

    #[error("wager {0:?} is not a decimal number")]
    NotNumeric(String),

    #[error("wager {0:?} has more precision than the chain supports")]
    TooPrecise(String),

    #[error("wager {0:?} does not fit in the smallest unit")]
    Overflow(String),

    #[error("wager {0:?} is below the minimum of 0.001")]
    BelowMinimum(String),

    #[error("wager {0:?} is not a multiple of 0.001")]
    OffStep(String),
}

/// Converts a plain decimal string into an integer amount with `decimals`
/// fractional digits.
///
/// Accepts `"1"`, `"1."`, `".5"` and `"0.001"`. Signs, exponents and
/// separators are rejected. Trailing zeros beyond `decimals` are tolerated.
pub fn parse_units(input: &str, decimals: u32) -> Result<Wei, WagerError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(WagerError::Empty);
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(WagerError::NotNumeric(text.to_string()));
    }

    let decimals = decimals as usize;
    let frac_part = if frac_part.len() > decimals {
        let (kept, excess) = frac_part.split_at(decimals);
        if excess.bytes().any(|b| b != b'0') {
            return Err(WagerError::TooPrecise(text.to_string()));
        }
        kept
    } else {
        frac_part
    };

    let overflow = || WagerError::Overflow(text.to_string());
    let scale = 10u128.checked_pow(decimals as u32).ok_or_else(overflow)?;

    let mut whole: u128 = 0;
    for digit in int_part.bytes() {
        whole = whole
            .checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(digit - b'0')))
            .ok_or_else(overflow)?;
    }

    let mut fraction: u128 = 0;
    for digit in frac_part.bytes() {
        fraction = fraction * 10 + u128::from(digit - b'0');
    }
    fraction *= 10u128.pow((decimals - frac_part.len()) as u32);

    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction))
        .map(Wei)
        .ok_or_else(overflow)
}

/// A validated wager: the text as the user entered it plus its value in wei.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wager {
    text: String,
    amount: Wei,
}

impl Wager {
    /// Parses and validates a wager (minimum 0.001, step 0.001).
    pub fn parse(input: &str) -> Result<Self, WagerError> {
        let amount = parse_units(input, GameConfig::DISPLAY_DECIMALS)?;
        let text = input.trim().to_string();

        let step = 10u128.pow(GameConfig::DISPLAY_DECIMALS - GameConfig::WAGER_STEP_DECIMALS as u32);
        if amount.get() < GameConfig::MIN_WAGER_MILLIS * step {
            return Err(WagerError::BelowMinimum(text));
        }
        if amount.get() % step != 0 {
            return Err(WagerError::OffStep(text));
        }

        Ok(Self { text, amount })
    }

    /// Decimal string in the display denomination.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Value in the smallest unit, as sent with the transaction.
    pub fn amount(&self) -> Wei {
        self.amount
    }
}

impl Default for Wager {
    fn default() -> Self {
        Self {
            text: GameConfig::DEFAULT_WAGER.to_string(),
            amount: Wei(1_000_000_000_000_000),
        }
    }
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What a resolved round means for the player's funds.
///
/// Reporting only: refunds and payouts are executed by the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Settlement {
    /// Win pays out twice the wager.
    Credited(Wei),
    /// Loss forfeits the wager.
    Forfeited(Wei),
    /// Draw returns the wager.
    Refunded(Wei),
}

impl Settlement {
    pub fn for_outcome(outcome: Outcome, wager: Wei) -> Self {
        match outcome {
            Outcome::Win => Settlement::Credited(wager.saturating_mul(2)),
            Outcome::Lose => Settlement::Forfeited(wager),
            Outcome::Draw => Settlement::Refunded(wager),
        }
    }

    pub fn amount(&self) -> Wei {
        match self {
            Settlement::Credited(amount)
            | Settlement::Forfeited(amount)
            | Settlement::Refunded(amount) => *amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MILLI: u128 = 1_000_000_000_000_000;

    #[test]
    fn parses_display_units_into_wei() {
        assert_eq!(parse_units("0.001", 18).unwrap(), Wei(MILLI));
        assert_eq!(parse_units("1", 18).unwrap(), Wei(1_000 * MILLI));
        assert_eq!(parse_units("1.", 18).unwrap(), Wei(1_000 * MILLI));
        assert_eq!(parse_units(".5", 18).unwrap(), Wei(500 * MILLI));
        assert_eq!(parse_units("2.0000000000000000000", 18).unwrap(), Wei(2_000 * MILLI));
    }

    #[test]
    fn rejects_malformed_numbers() {
        for input in ["", "  ", ".", "abc", "-1", "+1", "1e-3", "0.0.1", "1,5", "NaN"] {
            assert!(parse_units(input, 18).is_err(), "{input:?} should be rejected");
        }
        assert!(matches!(
            parse_units("0.0000000000000000001", 18),
            Err(WagerError::TooPrecise(_))
        ));
        assert!(matches!(
            parse_units("999999999999999999999999999", 18),
            Err(WagerError::Overflow(_))
        ));
    }

    #[test]
    fn accepts_wagers_on_the_step_grid() {
        for input in ["0.001", "0.002", "0.010", "0.5", "1", "12.345", " 0.003 "] {
            let wager = Wager::parse(input).unwrap_or_else(|e| panic!("{input:?}: {e}"));
            assert_eq!(wager.amount().get() % MILLI, 0);
        }
        assert_eq!(Wager::parse("12.345").unwrap().amount(), Wei(12_345 * MILLI));
    }

    #[test]
    fn rejects_wagers_below_minimum_or_off_step() {
        assert!(matches!(Wager::parse("0.0005"), Err(WagerError::BelowMinimum(_))));
        assert!(matches!(Wager::parse("0"), Err(WagerError::BelowMinimum(_))));
        assert!(matches!(Wager::parse("0.0015"), Err(WagerError::OffStep(_))));
        assert!(matches!(Wager::parse("1.0001"), Err(WagerError::OffStep(_))));
    }

    #[test]
    fn default_wager_is_minimum() {
        let wager = Wager::default();
        assert_eq!(wager.as_str(), "0.001");
        assert_eq!(wager, Wager::parse("0.001").unwrap());
    }

    #[test]
    fn settlement_reports_payout_semantics() {
        let wager = Wei(3 * MILLI);
        assert_eq!(
            Settlement::for_outcome(Outcome::Win, wager),
            Settlement::Credited(Wei(6 * MILLI))
        );
        assert_eq!(
            Settlement::for_outcome(Outcome::Lose, wager),
            Settlement::Forfeited(wager)
        );
        assert_eq!(
            Settlement::for_outcome(Outcome::Draw, wager),
            Settlement::Refunded(wager)
        );
    }
}
