//! Deterministic round rules shared by the runtime and frontends.
//!
//! `game-core` defines the canonical value types (choices, outcomes, wagers)
//! and the [`GameSession`] state machine. All session mutation flows through
//! the transitions declared on [`GameSession`]; asynchronous results are
//! correlated with a round through [`Generation`] tokens so that results from
//! abandoned rounds can be rejected.
pub mod choice;
pub mod config;
pub mod score;
pub mod session;
pub mod wager;

pub use choice::{Choice, Outcome};
pub use config::GameConfig;
pub use score::Score;
pub use session::{
    GamePhase, GameSession, Generation, ResolveError, ResolvedRound, RoundOutcome, RoundRequest,
    RoundTicket, SelectError,
};
pub use wager::{Settlement, Wager, WagerError, Wei, parse_units};
