//! Round state machine: Idle → Choosing → Result.
//!
//! [`GameSession`] is the authoritative reducer for a single player's round.
//! Every transition that can be reached from an asynchronous callback (timer
//! ticks, expiry, chain outcomes) takes the [`Generation`] the callback was
//! spawned with and is ignored when that generation is no longer current.

use std::fmt;

use crate::choice::{Choice, Outcome};
use crate::wager::{Wager, WagerError};

/// Monotonic round marker.
///
/// Bumped on every Choosing entry and every reset; asynchronous results carry
/// the value captured when their round started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(pub u64);

impl Generation {
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Top-level phase of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Idle,
    Choosing,
    Result,
}

/// Why a choice was not accepted. Neither case changes the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectError {
    #[error("connect a wallet to play")]
    WalletRequired,

    #[error("a round is already in progress ({0})")]
    NotIdle(GamePhase),
}

/// Why an asynchronous round result was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    #[error("stale result for round {received}, current round is {current}")]
    Stale {
        current: Generation,
        received: Generation,
    },

    #[error("session is not awaiting an outcome ({0})")]
    NotAwaiting(GamePhase),

    #[error("round {0} is already settled")]
    AlreadySettled(Generation),
}

/// Returned when a choice starts a round; the caller starts the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundTicket {
    pub generation: Generation,
    pub choice: Choice,
    pub seconds: u32,
}

/// Returned on expiry; the caller submits this move exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRequest {
    pub generation: Generation,
    pub choice: Choice,
    pub wager: Wager,
}

/// Decoded contract verdict for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundOutcome {
    pub bot_choice: Choice,
    pub outcome: Outcome,
}

/// A verdict accepted into the session, identified by its round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedRound {
    pub generation: Generation,
    pub player_choice: Choice,
    pub outcome: RoundOutcome,
}

/// Live round state for the connected account. Not persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSession {
    phase: GamePhase,
    player_choice: Option<Choice>,
    bot_choice: Option<Choice>,
    outcome: Option<Outcome>,
    seconds_remaining: Option<u32>,
    wager: Wager,
    /// Wager captured on expiry; payouts for the round are reported from it.
    committed_wager: Option<Wager>,
    generation: Generation,
    failure: Option<String>,
}

impl GameSession {
    pub fn new(wager: Wager) -> Self {
        Self {
            wager,
            ..Self::default()
        }
    }

    /// Idle → Choosing. Records the choice and hands back the ticket for the
    /// countdown; the countdown can therefore never expire without a choice.
    pub fn select_choice(
        &mut self,
        choice: Choice,
        wallet_connected: bool,
        countdown_seconds: u32,
    ) -> Result<RoundTicket, SelectError> {
        if !wallet_connected {
            return Err(SelectError::WalletRequired);
        }
        if self.phase != GamePhase::Idle {
            return Err(SelectError::NotIdle(self.phase));
        }

        self.generation = self.generation.next();
        self.phase = GamePhase::Choosing;
        self.player_choice = Some(choice);
        self.bot_choice = None;
        self.outcome = None;
        self.failure = None;
        self.committed_wager = None;
        self.seconds_remaining = Some(countdown_seconds);

        Ok(RoundTicket {
            generation: self.generation,
            choice,
            seconds: countdown_seconds,
        })
    }

    /// Countdown tick. Returns `false` when the tick belongs to another round
    /// or the session already left Choosing.
    pub fn tick(&mut self, generation: Generation, remaining: u32) -> bool {
        if generation != self.generation || self.phase != GamePhase::Choosing {
            return false;
        }
        self.seconds_remaining = Some(remaining);
        true
    }

    /// Choosing → Result. Returns the move to submit, or `None` if the expiry
    /// is stale.
    pub fn expire(&mut self, generation: Generation) -> Option<RoundRequest> {
        if generation != self.generation || self.phase != GamePhase::Choosing {
            return None;
        }
        let choice = self.player_choice?;

        self.phase = GamePhase::Result;
        self.seconds_remaining = Some(0);
        self.committed_wager = Some(self.wager.clone());

        Some(RoundRequest {
            generation,
            choice,
            wager: self.wager.clone(),
        })
    }

    /// Applies the contract verdict for the current round.
    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: RoundOutcome,
    ) -> Result<ResolvedRound, ResolveError> {
        self.ensure_awaiting(generation)?;
        let player_choice = self
            .player_choice
            .ok_or(ResolveError::NotAwaiting(self.phase))?;

        self.bot_choice = Some(outcome.bot_choice);
        self.outcome = Some(outcome.outcome);

        Ok(ResolvedRound {
            generation,
            player_choice,
            outcome,
        })
    }

    /// Marks the current round as failed. The session stays in Result with
    /// the outcome absent until [`GameSession::reset`].
    pub fn fail(
        &mut self,
        generation: Generation,
        reason: impl Into<String>,
    ) -> Result<(), ResolveError> {
        self.ensure_awaiting(generation)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    /// Any phase → Idle. Invalidates every in-flight callback of the
    /// abandoned round and returns the new generation.
    pub fn reset(&mut self) -> Generation {
        self.phase = GamePhase::Idle;
        self.player_choice = None;
        self.bot_choice = None;
        self.outcome = None;
        self.seconds_remaining = None;
        self.failure = None;
        self.committed_wager = None;
        self.generation = self.generation.next();
        self.generation
    }

    /// Replaces the wager if `input` is valid; otherwise the prior value is
    /// retained and the rejection returned.
    pub fn set_wager(&mut self, input: &str) -> Result<&Wager, WagerError> {
        self.wager = Wager::parse(input)?;
        Ok(&self.wager)
    }

    fn ensure_awaiting(&self, generation: Generation) -> Result<(), ResolveError> {
        if generation != self.generation {
            return Err(ResolveError::Stale {
                current: self.generation,
                received: generation,
            });
        }
        if self.phase != GamePhase::Result {
            return Err(ResolveError::NotAwaiting(self.phase));
        }
        if self.outcome.is_some() || self.failure.is_some() {
            return Err(ResolveError::AlreadySettled(generation));
        }
        Ok(())
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player_choice(&self) -> Option<Choice> {
        self.player_choice
    }

    pub fn bot_choice(&self) -> Option<Choice> {
        self.bot_choice
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        self.seconds_remaining
    }

    pub fn wager(&self) -> &Wager {
        &self.wager
    }

    /// Wager the current round was submitted with; `None` before expiry.
    pub fn committed_wager(&self) -> Option<&Wager> {
        self.committed_wager.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// True while in Result with neither an outcome nor a failure recorded.
    pub fn is_awaiting_outcome(&self) -> bool {
        self.phase == GamePhase::Result && self.outcome.is_none() && self.failure.is_none()
    }
}
