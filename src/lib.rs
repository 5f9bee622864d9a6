//! Blockchain Breakout (workspace facade crate).
//!
//! Re-exports the workspace members under short names so the binary, tests
//! and benches can write `blockchain_breakout::core::Game` regardless of how
//! the crates under `crates/` are split.

pub use breakout_core as core;
pub use breakout_input as input;
pub use breakout_term as term;
pub use breakout_types as types;
