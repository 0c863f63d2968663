//! Cross-frontend primitives for presenting the game.
//!
//! Houses message logging, event handling, unit formatting and view-model
//! types that both CLI and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod message;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig};
pub use event::{EventConsumer, EventImpact};
pub use frontend::Frontend;
pub use view_model::ViewModel;
