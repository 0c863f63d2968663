//! Widget modules for UI rendering.
//!
//! Each widget is a pure function that reads the ViewModel and renders to a
//! terminal frame. Widgets never mutate state or talk to the runtime.

pub mod footer;
pub mod header;
pub mod messages;
pub mod round;
pub mod wallet;
