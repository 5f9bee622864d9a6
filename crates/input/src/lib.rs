//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. Fast drop is
//! held, so presses and releases map to `FastDropStart` / `FastDropEnd`.
//! Terminals that never report releases fall back to [`toggle_fast_drop`].

pub mod map;

pub use breakout_types as types;

pub use map::{handle_key_event, handle_key_release, map_key, should_quit, toggle_fast_drop};
