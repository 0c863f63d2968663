//! Worker tasks that back the runtime orchestration.
//!
//! The game worker owns the round state machine; countdowns and contract
//! rounds run as short-lived tasks that report back to it.

mod game;

pub use game::{Command, GameWorker};
