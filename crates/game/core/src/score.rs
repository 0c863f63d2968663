//! Running tally of confirmed round outcomes.

use crate::choice::Outcome;
use crate::session::{Generation, ResolvedRound};

/// Wins per side for the connected session.
///
/// Recording is idempotent per round: each round generation is counted at
/// most once, and generations are monotonic, so a replayed or duplicated
/// resolution never increments twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    pub player_wins: u32,
    pub bot_wins: u32,
    last_recorded: Option<Generation>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a resolved round. Returns `true` if the tally changed or the
    /// round was newly recorded, `false` if it had already been applied.
    pub fn record(&mut self, round: &ResolvedRound) -> bool {
        if self
            .last_recorded
            .is_some_and(|last| round.generation <= last)
        {
            return false;
        }
        self.last_recorded = Some(round.generation);

        match round.outcome.outcome {
            Outcome::Win => self.player_wins = self.player_wins.saturating_add(1),
            Outcome::Lose => self.bot_wins = self.bot_wins.saturating_add(1),
            Outcome::Draw => {}
        }
        true
    }

    /// Zeroes the tally. The high-water mark is kept so rounds recorded
    /// before the clear cannot be applied again afterwards.
    pub fn clear(&mut self) {
        self.player_wins = 0;
        self.bot_wins = 0;
    }

    pub fn last_recorded(&self) -> Option<Generation> {
        self.last_recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::Choice;
    use crate::session::RoundOutcome;

    fn resolved(generation: u64, outcome: Outcome) -> ResolvedRound {
        ResolvedRound {
            generation: Generation(generation),
            player_choice: Choice::Rock,
            outcome: RoundOutcome {
                bot_choice: Choice::Scissors,
                outcome,
            },
        }
    }

    #[test]
    fn win_increments_player_only() {
        let mut score = Score::new();
        assert!(score.record(&resolved(1, Outcome::Win)));
        assert_eq!((score.player_wins, score.bot_wins), (1, 0));
    }

    #[test]
    fn lose_increments_bot_only() {
        let mut score = Score::new();
        assert!(score.record(&resolved(1, Outcome::Lose)));
        assert_eq!((score.player_wins, score.bot_wins), (0, 1));
    }

    #[test]
    fn draw_leaves_tally_unchanged() {
        let mut score = Score::new();
        assert!(score.record(&resolved(1, Outcome::Draw)));
        assert_eq!((score.player_wins, score.bot_wins), (0, 0));
    }

    #[test]
    fn same_round_is_counted_once() {
        let mut score = Score::new();
        let round = resolved(4, Outcome::Win);
        assert!(score.record(&round));
        assert!(!score.record(&round));
        assert!(!score.record(&resolved(3, Outcome::Lose)));
        assert_eq!((score.player_wins, score.bot_wins), (1, 0));

        assert!(score.record(&resolved(5, Outcome::Lose)));
        assert_eq!((score.player_wins, score.bot_wins), (1, 1));
    }

    #[test]
    fn clear_keeps_rounds_from_being_replayed() {
        let mut score = Score::new();
        let round = resolved(2, Outcome::Win);
        score.record(&round);
        score.clear();
        assert_eq!(score, Score { player_wins: 0, bot_wins: 0, last_recorded: Some(Generation(2)) });
        assert!(!score.record(&round));
        assert_eq!(score.player_wins, 0);
    }
}
