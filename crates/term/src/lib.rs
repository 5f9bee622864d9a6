//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and renders into a plain framebuffer that is diffed and flushed to
//! the terminal with crossterm.
//!
//! - [`GameView`] draws a [`core::GameSnapshot`]: board, side panel, market table
//! - [`TerminalRenderer`] owns the terminal and flushes frames
//! - [`StatusLine`] receives effect and HUD events from the core

pub mod fb;
pub mod game_view;
pub mod hud;
pub mod renderer;

pub use breakout_core as core;
pub use breakout_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Viewport};
pub use hud::StatusLine;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
