//! Shared types for Blockchain Breakout.
//!
//! Everything here is plain data: currency kinds, grid coordinates, block flags,
//! player intents and the timing constants the simulation is tuned with. The
//! core, the terminal view and the input map all depend on this crate and on
//! nothing else of each other.
//!
//! # Coordinates
//!
//! The board is indexed `(x, y)` with `y = 0` at the floor and `y` growing
//! upward. Pieces spawn above the top row and fall toward `y = 0`.
//!
//! World space uses a fixed affine mapping (cell size [`CELL_SIZE`], x origin
//! [`WORLD_ORIGIN_X`]); [`GridPos::from_world`] and [`GridPos::to_world`] are the
//! only conversions the crates use.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed simulation step |
//! | `FAST_FALL_MS` | 50 | Gravity while fast-drop is held |
//! | `BULL_RUN_FALL_MS` | 700 | Gravity during a BullRun |
//! | `CRYPTO_CRASH_FALL_MS` | 200 | Gravity during a CryptoCrash |
//! | `MARKET_TICK_MS` | 1000 | Price update period |
//! | `CASCADE_STEP_MS` | 200 | Delay between cascade passes |
//! | `GLOW_DURATION_MS` | 250 | Formation glow before merge |
//!
//! # Examples
//!
//! ```
//! use breakout_types::{CurrencyKind, GameAction, GridPos};
//!
//! assert_eq!(CurrencyKind::from_str("BTC"), Some(CurrencyKind::Bitcoin));
//! assert!(CurrencyKind::Tether.is_stablecoin());
//!
//! let pos = GridPos::from_world(-200.0, 2000.0);
//! assert_eq!(pos, GridPos::new(8, 20));
//!
//! assert_eq!(GameAction::from_str("rotateCw"), Some(GameAction::RotateCw));
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells.
pub const DEFAULT_BOARD_WIDTH: u8 = 15;

/// Default board height in cells.
pub const DEFAULT_BOARD_HEIGHT: u8 = 20;

/// World units per grid cell.
pub const CELL_SIZE: f32 = 100.0;

/// World x coordinate of grid column 0.
pub const WORLD_ORIGIN_X: f32 = -1000.0;

/// Fixed timestep interval in milliseconds.
pub const TICK_MS: u32 = 16;

/// Combo counter ceiling.
pub const MAX_COMBO: u8 = 5;

/// Largest score or price value the simulation will hold.
pub const VALUE_CEILING: u32 = i32::MAX as u32 - 1;

/// Lowest price a currency can fall to.
pub const PRICE_FLOOR: u32 = 2;

/// Gravity interval while fast-drop is engaged.
pub const FAST_FALL_MS: u32 = 50;

/// Gravity interval while a BullRun is active.
pub const BULL_RUN_FALL_MS: u32 = 700;

/// Gravity interval while a CryptoCrash is active.
pub const CRYPTO_CRASH_FALL_MS: u32 = 200;

/// Market price update period.
pub const MARKET_TICK_MS: u32 = 1000;

/// Lower bound of the randomized market-event period.
pub const MARKET_EVENT_MIN_MS: u32 = 30_000;

/// Upper bound of the randomized market-event period.
pub const MARKET_EVENT_MAX_MS: u32 = 45_000;

/// Lower bound of the randomized combo-target period.
pub const COMBO_TARGET_MIN_MS: u32 = 30_000;

/// Upper bound of the randomized combo-target period.
pub const COMBO_TARGET_MAX_MS: u32 = 45_000;

/// Delay between two cascade passes.
pub const CASCADE_STEP_MS: u32 = 200;

/// Animation timer resolution.
pub const ANIMATION_STEP_MS: u32 = 10;

/// Glow animation length before a formation merges.
pub const GLOW_DURATION_MS: u32 = 250;

/// Victory blink length before the next level starts.
pub const VICTORY_DURATION_MS: u32 = 1500;

/// Pieces locked between two officer rows.
pub const ROUNDS_BEFORE_SEC_SPAWN: u32 = 5;


/// The seven currencies a block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyKind {
    Bitcoin,
    Ethereum,
    Xrp,
    Polkadot,
    Solana,
    Tether,
    Usdc,
}

impl CurrencyKind {
    /// All currencies in table order.
    pub const ALL: [CurrencyKind; 7] = [
        CurrencyKind::Bitcoin,
        CurrencyKind::Ethereum,
        CurrencyKind::Xrp,
        CurrencyKind::Polkadot,
        CurrencyKind::Solana,
        CurrencyKind::Tether,
        CurrencyKind::Usdc,
    ];

    /// Parse from the lowercase name or the ticker symbol (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use breakout_types::CurrencyKind;
    ///
    /// assert_eq!(CurrencyKind::from_str("ethereum"), Some(CurrencyKind::Ethereum));
    /// assert_eq!(CurrencyKind::from_str("usdt"), Some(CurrencyKind::Tether));
    /// assert_eq!(CurrencyKind::from_str("doge"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Some(CurrencyKind::Bitcoin),
            "ethereum" | "eth" => Some(CurrencyKind::Ethereum),
            "xrp" => Some(CurrencyKind::Xrp),
            "polkadot" | "dot" => Some(CurrencyKind::Polkadot),
            "solana" | "sol" => Some(CurrencyKind::Solana),
            "tether" | "usdt" => Some(CurrencyKind::Tether),
            "usdc" => Some(CurrencyKind::Usdc),
            _ => None,
        }
    }

    /// Lowercase name, used as the table key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyKind::Bitcoin => "bitcoin",
            CurrencyKind::Ethereum => "ethereum",
            CurrencyKind::Xrp => "xrp",
            CurrencyKind::Polkadot => "polkadot",
            CurrencyKind::Solana => "solana",
            CurrencyKind::Tether => "tether",
            CurrencyKind::Usdc => "usdc",
        }
    }

    /// Matching two of these pushes every price down on the next market tick.
    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            CurrencyKind::Bitcoin | CurrencyKind::Ethereum | CurrencyKind::Solana
        )
    }

    /// Matching two of these pushes every price up on the next market tick.
    pub fn is_stablecoin(&self) -> bool {
        matches!(self, CurrencyKind::Tether | CurrencyKind::Usdc)
    }
}

/// Fixed set of per-block flags.
///
/// Replaces free-form string tags with a small bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockFlags(u8);

impl BlockFlags {
    /// Ordinary tetromino block; counts toward full rows and falls under gravity.
    pub const TETRIS: BlockFlags = BlockFlags(1 << 0);
    pub const SUPER: BlockFlags = BlockFlags(1 << 1);
    pub const BOMB: BlockFlags = BlockFlags(1 << 2);
    pub const OFFICER: BlockFlags = BlockFlags(1 << 3);
    pub const CLEAR_THREE_ROWS: BlockFlags = BlockFlags(1 << 4);
    /// One-lock grace period after a formation is created.
    pub const CANNOT_BLOW_UP_YET: BlockFlags = BlockFlags(1 << 5);
    pub const GLOWING: BlockFlags = BlockFlags(1 << 6);

    pub const fn empty() -> Self {
        BlockFlags(0)
    }

    /// True if every flag in `other` is set.
    pub const fn contains(&self, other: BlockFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag in `other` is set.
    pub const fn intersects(&self, other: BlockFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: BlockFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: BlockFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for BlockFlags {
    type Output = BlockFlags;

    fn bitor(self, rhs: BlockFlags) -> BlockFlags {
        BlockFlags(self.0 | rhs.0)
    }
}

/// Integer grid coordinate. `y = 0` is the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Map world space (horizontal, vertical) to the nearest grid cell.
    pub fn from_world(wx: f32, wz: f32) -> Self {
        Self {
            x: ((wx - WORLD_ORIGIN_X) / CELL_SIZE).round() as i32,
            y: (wz / CELL_SIZE).round() as i32,
        }
    }

    /// World-space position of this cell.
    pub fn to_world(self) -> (f32, f32) {
        (
            self.x as f32 * CELL_SIZE + WORLD_ORIGIN_X,
            self.y as f32 * CELL_SIZE,
        )
    }
}

/// Global market modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketEvent {
    #[default]
    None,
    BullRun,
    CryptoCrash,
}

impl MarketEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketEvent::None => "none",
            MarketEvent::BullRun => "bull run",
            MarketEvent::CryptoCrash => "crypto crash",
        }
    }
}

/// Player intents delivered to the game.
///
/// Fast-drop is a held input, so it arrives as a start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise around its first block
    RotateCw,
    /// Switch gravity to the fast interval
    FastDropStart,
    /// Return gravity to the level or event interval
    FastDropEnd,
    /// Freeze or resume time
    Pause,
    /// Clear every officer block (SEC raid)
    ClearOfficers,
    /// Start a fresh session with the same configuration
    Restart,
}

impl GameAction {
    /// Parse action from a camelCase or lowercase name.
    ///
    /// # Examples
    ///
    /// ```
    /// use breakout_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("fastDropStart"), Some(GameAction::FastDropStart));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "rotatecw" => Some(GameAction::RotateCw),
            "fastdropstart" => Some(GameAction::FastDropStart),
            "fastdropend" => Some(GameAction::FastDropEnd),
            "pause" => Some(GameAction::Pause),
            "clearofficers" => Some(GameAction::ClearOfficers),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::RotateCw => "rotateCw",
            GameAction::FastDropStart => "fastDropStart",
            GameAction::FastDropEnd => "fastDropEnd",
            GameAction::Pause => "pause",
            GameAction::ClearOfficers => "clearOfficers",
            GameAction::Restart => "restart",
        }
    }
}
