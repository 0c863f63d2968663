//! Runtime orchestration for wagered rock-paper-scissors rounds.
//!
//! This crate wires together the wallet session, the round state machine,
//! countdowns and contract submissions into a cohesive runtime API.
//! Consumers embed [`Runtime`] to play rounds, subscribe to events, and manage
//! the wallet through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`wallet`] owns the wallet session and balance polling
//! - [`timer`] implements the choice countdown
//! - [`adapter`] submits moves and correlates their on-chain outcomes
//! - [`workers`] keeps background tasks internal to the crate
pub mod adapter;
pub mod api;
pub mod events;
pub mod runtime;
pub mod timer;
pub mod wallet;

mod workers;

pub use adapter::{AdapterConfig, ContractAdapter, Correlation, PendingMove, RoundReport};
pub use api::{Result, RuntimeError, RuntimeHandle, Snapshot, WalletError};
pub use events::{Event, EventBus, GameEvent, Topic, WalletEvent};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use timer::{CountdownTimer, TimerMessage};
pub use wallet::{WalletSession, WalletSessionManager, WalletState};
