//! Text formatting for amounts, accounts and runtime events.
use game_core::{Choice, GameConfig, Outcome, Settlement, Wei};
use runtime::{Event, GameEvent, WalletEvent};

use crate::config::FrontendConfig;
use crate::message::{MessageEntry, MessageLevel};

/// Renders a base-unit amount with `decimals` fractional digits, trimming
/// trailing zeros but keeping at least one (`1.0`, `0.001`, `2.5`).
pub fn format_units(amount: Wei, decimals: u32) -> String {
    if decimals == 0 {
        return amount.0.to_string();
    }

    let base = 10u128.pow(decimals);
    let whole = amount.0 / base;
    let fraction = amount.0 % base;
    if fraction == 0 {
        return format!("{whole}.0");
    }

    let digits = format!("{fraction:0width$}", width = decimals as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// [`format_units`] in the chain's display denomination.
pub fn format_ether(amount: Wei) -> String {
    format_units(amount, GameConfig::DISPLAY_DECIMALS)
}

/// `0x1234...abcd`: the first six and last four characters.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn result_message(outcome: Outcome, settlement: Settlement, symbol: &str) -> String {
    match outcome {
        Outcome::Win => format!("You win {} {symbol}!", format_ether(settlement.amount())),
        Outcome::Lose => format!("You lose {} {symbol}!", format_ether(settlement.amount())),
        Outcome::Draw => "It's a draw! Your bet is returned.".to_string(),
    }
}

pub fn choices_line(player: Choice, bot: Choice) -> String {
    format!("You chose {player}, bot chose {bot}")
}

/// Message-log line for a runtime event, or `None` if the event is not
/// worth a line under the current settings.
pub fn event_message(event: &Event, config: &FrontendConfig) -> Option<MessageEntry> {
    let symbol = config.currency_symbol.as_str();

    match event {
        Event::Wallet(wallet) => match wallet {
            WalletEvent::Connected { account, balance } => {
                let balance = balance
                    .map(|wei| format!("{} {symbol}", format_ether(wei)))
                    .unwrap_or_else(|| "unknown balance".to_string());
                Some(MessageEntry::new(
                    format!(
                        "Connected: {} ({balance})",
                        shorten_address(account.as_str())
                    ),
                    MessageLevel::Success,
                ))
            }
            WalletEvent::ConnectionFailed { reason } => Some(MessageEntry::new(
                format!("Wallet connection failed: {reason}"),
                MessageLevel::Warning,
            )),
            WalletEvent::BalanceUpdated { balance, .. } => {
                config.messages.show_balance_updates.then(|| {
                    MessageEntry::info(format!("Balance: {} {symbol}", format_ether(*balance)))
                })
            }
            WalletEvent::Disconnected => Some(MessageEntry::info("Wallet disconnected")),
        },
        Event::Game(game) => match game {
            GameEvent::RoundStarted {
                choice, seconds, ..
            } => Some(MessageEntry::info(format!(
                "You picked {choice}. Committing in {seconds} seconds..."
            ))),
            GameEvent::SelectionRejected { reason } => Some(MessageEntry::new(
                reason.clone(),
                MessageLevel::Warning,
            )),
            GameEvent::CountdownTick { remaining, .. } => config
                .messages
                .show_countdown
                .then(|| MessageEntry::info(format!("Time left: {remaining} seconds"))),
            GameEvent::Submitting { choice, wager, .. } => Some(MessageEntry::info(format!(
                "Submitting {choice} with {wager} {symbol}..."
            ))),
            GameEvent::TransactionSent { tx, .. } => Some(MessageEntry::info(format!(
                "Transaction sent: {}",
                shorten_address(tx.as_str())
            ))),
            GameEvent::TransactionConfirmed { block, .. } => Some(MessageEntry::info(format!(
                "Confirmed in block {block}, waiting for the bot..."
            ))),
            GameEvent::RoundResolved {
                round, settlement, ..
            } => {
                let level = match round.outcome.outcome {
                    Outcome::Win => MessageLevel::Success,
                    Outcome::Lose | Outcome::Draw => MessageLevel::Info,
                };
                Some(MessageEntry::new(
                    format!(
                        "{} {}",
                        result_message(round.outcome.outcome, *settlement, symbol),
                        choices_line(round.player_choice, round.outcome.bot_choice)
                    ),
                    level,
                ))
            }
            GameEvent::RoundFailed { reason, .. } => Some(MessageEntry::new(
                format!("Round failed: {reason}"),
                MessageLevel::Error,
            )),
            GameEvent::WagerChanged { wager } => {
                Some(MessageEntry::info(format!("Bet set to {wager} {symbol}")))
            }
            GameEvent::WagerRejected { input, reason } => Some(MessageEntry::new(
                format!("Bet \"{input}\" rejected: {reason}"),
                MessageLevel::Warning,
            )),
            GameEvent::SessionReset { .. } => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use client_blockchain_core::Address;
    use game_core::{Generation, ResolvedRound, RoundOutcome, Score};

    use super::*;

    const MILLI: u128 = 1_000_000_000_000_000;

    #[test]
    fn formats_ether_amounts() {
        assert_eq!(format_ether(Wei(0)), "0.0");
        assert_eq!(format_ether(Wei(1000 * MILLI)), "1.0");
        assert_eq!(format_ether(Wei(MILLI)), "0.001");
        assert_eq!(format_ether(Wei(2500 * MILLI)), "2.5");
        assert_eq!(format_ether(Wei(1)), "0.000000000000000001");
        assert_eq!(format_units(Wei(1234), 0), "1234");
        assert_eq!(format_units(Wei(1234), 2), "12.34");
    }

    #[test]
    fn shortens_addresses() {
        assert_eq!(
            shorten_address("0x1234567890abcdef1234567890abcdef1234abcd"),
            "0x1234...abcd"
        );
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }

    #[test]
    fn result_messages_follow_settlement() {
        assert_eq!(
            result_message(Outcome::Win, Settlement::Credited(Wei(2 * MILLI)), "QUAI"),
            "You win 0.002 QUAI!"
        );
        assert_eq!(
            result_message(Outcome::Lose, Settlement::Forfeited(Wei(MILLI)), "QUAI"),
            "You lose 0.001 QUAI!"
        );
        assert_eq!(
            result_message(Outcome::Draw, Settlement::Refunded(Wei(MILLI)), "QUAI"),
            "It's a draw! Your bet is returned."
        );
    }

    #[test]
    fn resolved_round_produces_success_line() {
        let round = ResolvedRound {
            generation: Generation(1),
            player_choice: Choice::Paper,
            outcome: RoundOutcome {
                bot_choice: Choice::Rock,
                outcome: Outcome::Win,
            },
        };
        let event = Event::Game(GameEvent::RoundResolved {
            round,
            settlement: Settlement::Credited(Wei(2 * MILLI)),
            score: Score::new(),
        });

        let entry = event_message(&event, &FrontendConfig::default()).unwrap();
        assert_eq!(entry.level, MessageLevel::Success);
        assert_eq!(
            entry.text,
            "You win 0.002 QUAI! You chose paper, bot chose rock"
        );
    }

    #[test]
    fn noisy_events_are_filtered_by_default() {
        let config = FrontendConfig::default();
        let account = Address::parse("0x00000000000000000000000000000000000000aa").unwrap();

        let balance = Event::Wallet(WalletEvent::BalanceUpdated {
            account,
            balance: Wei(MILLI),
        });
        let tick = Event::Game(GameEvent::CountdownTick {
            generation: Generation(1),
            remaining: 3,
        });
        assert!(event_message(&balance, &config).is_none());
        assert!(event_message(&tick, &config).is_none());

        let mut verbose = config.clone();
        verbose.messages.show_countdown = true;
        assert_eq!(
            event_message(&tick, &verbose).unwrap().text,
            "Time left: 3 seconds"
        );
    }
}
