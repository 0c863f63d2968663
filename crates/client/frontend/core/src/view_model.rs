//! Presentation-ready view of a runtime [`Snapshot`].
//!
//! The view model holds only strings and flags so renderers never touch
//! wei arithmetic or session rules.
use game_core::{Choice, GamePhase, Settlement};
use runtime::Snapshot;

use crate::format::{choices_line, format_ether, result_message, shorten_address};

/// Everything the UI renders for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub wallet: WalletView,
    pub round: RoundView,
    pub score: ScoreView,
    /// Current wager in display units, e.g. `0.001`.
    pub wager: String,
    pub currency_symbol: String,
    pub network: Option<String>,
    pub contract: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletView {
    /// No provider capability; the user is prompted to configure one.
    NoProvider,
    Disconnected,
    Connected {
        account: String,
        short_account: String,
        /// `None` until the first balance fetch succeeds.
        balance: Option<String>,
    },
}

impl WalletView {
    pub fn is_connected(&self) -> bool {
        matches!(self, WalletView::Connected { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundView {
    pub phase: GamePhase,
    pub player_choice: Option<Choice>,
    pub bot_choice: Option<Choice>,
    pub seconds_remaining: Option<u32>,
    /// "You win ...", "Waiting for the result...", or the failure reason.
    pub headline: Option<String>,
    /// "You chose ..., bot chose ..." once the verdict is in.
    pub detail: Option<String>,
    pub failed: bool,
    /// Hand buttons are enabled.
    pub can_choose: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreView {
    pub player: u32,
    pub bot: u32,
}

impl ViewModel {
    pub fn from_snapshot(
        snapshot: &Snapshot,
        currency_symbol: &str,
        network: Option<&str>,
    ) -> Self {
        let wallet = match (&snapshot.wallet, snapshot.provider_available) {
            (Some(session), _) => WalletView::Connected {
                account: session.account.to_string(),
                short_account: shorten_address(session.account.as_str()),
                balance: session.balance.map(format_ether),
            },
            (None, true) => WalletView::Disconnected,
            (None, false) => WalletView::NoProvider,
        };

        let round = RoundView::from_snapshot(snapshot, currency_symbol, wallet.is_connected());

        Self {
            wallet,
            round,
            score: ScoreView {
                player: snapshot.score.player_wins,
                bot: snapshot.score.bot_wins,
            },
            wager: snapshot.session.wager().to_string(),
            currency_symbol: currency_symbol.to_string(),
            network: network.map(str::to_string),
            contract: snapshot
                .contract
                .as_ref()
                .map(|address| shorten_address(address.as_str())),
        }
    }
}

impl RoundView {
    fn from_snapshot(snapshot: &Snapshot, symbol: &str, connected: bool) -> Self {
        let session = &snapshot.session;
        let failure = session.failure().map(str::to_string);

        let (headline, detail) = match (session.phase(), session.outcome()) {
            (GamePhase::Result, Some(outcome)) => {
                let wager = session
                    .committed_wager()
                    .unwrap_or(session.wager())
                    .amount();
                let settlement = Settlement::for_outcome(outcome, wager);
                let headline = result_message(outcome, settlement, symbol);
                let detail = session
                    .player_choice()
                    .zip(session.bot_choice())
                    .map(|(player, bot)| choices_line(player, bot));
                (Some(headline), detail)
            }
            (GamePhase::Result, None) => match &failure {
                Some(reason) => (Some(format!("Round failed: {reason}")), None),
                None => (Some("Waiting for the result...".to_string()), None),
            },
            (GamePhase::Choosing, _) => (
                session
                    .seconds_remaining()
                    .map(|secs| format!("Time left: {secs} seconds")),
                None,
            ),
            (GamePhase::Idle, _) if !connected => {
                (Some("Connect your wallet to play!".to_string()), None)
            }
            (GamePhase::Idle, _) => (None, None),
        };

        Self {
            phase: session.phase(),
            player_choice: session.player_choice(),
            bot_choice: session.bot_choice(),
            seconds_remaining: session.seconds_remaining(),
            headline,
            detail,
            failed: failure.is_some(),
            can_choose: connected && session.phase() == GamePhase::Idle,
        }
    }
}
