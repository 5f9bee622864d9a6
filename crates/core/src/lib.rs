//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the game and no I/O. Rendering, effects and
//! HUD updates leave the core as [`GameEvent`]s that a host drains and routes to
//! its [`Renderer`], [`EffectsPlayer`] and [`UiNotifier`] implementations.
//!
//! # Module Structure
//!
//! - [`board`]: the authoritative cell grid, `y = 0` at the floor
//! - [`shapes`]: tetromino offsets and the full-width officer row
//! - [`piece`]: the falling piece: spawn, move, rotate, lock, officer countdown
//! - [`matching`]: line clears, detonations, formations and pair explosions
//! - [`gravity`]: per-column settling after removals
//! - [`market`], [`combo`], [`scoring`]: currency prices, combo target, clamped arithmetic
//! - [`session`]: level table and the terminal game-over state
//! - [`scheduler`], [`animation`]: named timers and two-phase animations
//! - [`game`]: the running session tying it all together
//! - [`config`]: serde-backed tables with validated defaults
//!
//! # Example
//!
//! ```
//! use breakout_core::Game;
//! use breakout_types::GameAction;
//!
//! let mut game = Game::new(12345);
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::FastDropStart);
//! for _ in 0..200 {
//!     game.tick(16);
//! }
//!
//! let snapshot = game.snapshot();
//! assert_eq!(snapshot.width, 15);
//! assert!(!game.drain_events().is_empty());
//! ```
//!
//! # Timing
//!
//! [`Game::tick`] consumes wall time in fixed 16ms steps. Each step advances
//! the [`scheduler::Scheduler`], whose handlers run to completion one after
//! another.

pub mod animation;
pub mod board;
pub mod combo;
pub mod config;
pub mod events;
pub mod game;
pub mod gravity;
pub mod market;
pub mod matching;
pub mod piece;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod shapes;
pub mod snapshot;

pub use breakout_types as types;

pub use board::{Block, BlockId, Board, Cell};
pub use combo::ComboState;
pub use config::{ConfigError, GameConfig, LevelConfig};
pub use events::{dispatch, EffectsPlayer, GameEvent, NullHost, Renderer, SoundCue, UiNotifier};
pub use game::Game;
pub use market::{CurrencyValue, Market};
pub use matching::{find_component, Formation, FormationKind, MatchContext, MatchEngine, PassOutcome};
pub use piece::{ActivePiece, PieceController, PieceTemplate, StepResult};
pub use rng::SimpleRng;
pub use shapes::{PieceShape, ShapeKind};
pub use snapshot::{ActiveSnapshot, CellSnapshot, GameSnapshot};
