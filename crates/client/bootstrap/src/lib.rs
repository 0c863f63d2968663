//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, wallet provider detection, and runtime
//! setup that can be reused by CLI, UI, or other front-end crates.
pub mod builder;
pub mod config;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::ClientConfig;
