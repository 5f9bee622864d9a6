//! Game configuration - level table, currency table and timing
//!
//! Configuration is plain serde data. Every field has a default, so a JSON
//! document only needs the keys it wants to override; a missing file is not
//! an error for callers that fall back to [`GameConfig::default`].
//!
//! ```
//! use breakout_core::config::GameConfig;
//!
//! let cfg = GameConfig::from_json_str(r#"{ "seed": 7, "board": { "width": 10 } }"#).unwrap();
//! assert_eq!(cfg.seed, 7);
//! assert_eq!(cfg.board.width, 10);
//! assert_eq!(cfg.board.height, 20);
//! assert_eq!(cfg.levels.len(), 8);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use breakout_types::*;

use crate::shapes::ShapeKind;

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyLevels,
    EmptyCurrencies,
    InvalidBoard { width: u8, height: u8 },
    InvalidSpawnColumn(i32),
    InvalidInterval(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid config JSON: {}", e),
            ConfigError::EmptyLevels => write!(f, "level table is empty"),
            ConfigError::EmptyCurrencies => write!(f, "currency table is empty"),
            ConfigError::InvalidBoard { width, height } => {
                write!(f, "board {}x{} is too small (minimum 4x4)", width, height)
            }
            ConfigError::InvalidSpawnColumn(x) => write!(f, "spawn column {} puts piece blocks off the board", x),
            ConfigError::InvalidInterval(name) => write!(f, "interval `{}` must be positive and ordered", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// One row of the level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// Lower thresholds enable more formation types (<=4 bombs, <=3 supers, <=2 pairs).
    pub pairing_threshold: u8,
    pub target_score: u32,
    pub fall_interval_ms: u32,
    pub background: [u8; 3],
    /// Overrides [`GameConfig::rounds_before_sec_spawn`] for this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_before_sec_spawn: Option<u32>,
}

impl LevelConfig {
    fn new(name: &str, pairing_threshold: u8, target_score: u32, fall_interval_ms: u32, background: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            pairing_threshold,
            target_score,
            fall_interval_ms,
            background,
            rounds_before_sec_spawn: None,
        }
    }
}

/// Starting market data for one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDef {
    pub kind: CurrencyKind,
    pub display_name: String,
    pub symbol: String,
    pub price: u32,
    pub volatility_up: bool,
    pub color: [u8; 3],
}

impl CurrencyDef {
    fn new(kind: CurrencyKind, display_name: &str, symbol: &str, price: u32, volatility_up: bool, color: [u8; 3]) -> Self {
        Self {
            kind,
            display_name: display_name.to_string(),
            symbol: symbol.to_string(),
            price,
            volatility_up,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    /// Column of the pivot block when a tetromino spawns.
    pub spawn_column: i32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            spawn_column: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fast_fall_ms: u32,
    pub bull_run_fall_ms: u32,
    pub crypto_crash_fall_ms: u32,
    pub market_tick_ms: u32,
    pub market_event_min_ms: u32,
    pub market_event_max_ms: u32,
    pub combo_target_min_ms: u32,
    pub combo_target_max_ms: u32,
    pub cascade_step_ms: u32,
    pub animation_step_ms: u32,
    pub glow_duration_ms: u32,
    pub victory_duration_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fast_fall_ms: FAST_FALL_MS,
            bull_run_fall_ms: BULL_RUN_FALL_MS,
            crypto_crash_fall_ms: CRYPTO_CRASH_FALL_MS,
            market_tick_ms: MARKET_TICK_MS,
            market_event_min_ms: MARKET_EVENT_MIN_MS,
            market_event_max_ms: MARKET_EVENT_MAX_MS,
            combo_target_min_ms: COMBO_TARGET_MIN_MS,
            combo_target_max_ms: COMBO_TARGET_MAX_MS,
            cascade_step_ms: CASCADE_STEP_MS,
            animation_step_ms: ANIMATION_STEP_MS,
            glow_duration_ms: GLOW_DURATION_MS,
            victory_duration_ms: VICTORY_DURATION_MS,
        }
    }
}

/// Complete, validated game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u32,
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub rounds_before_sec_spawn: u32,
    pub levels: Vec<LevelConfig>,
    pub currencies: Vec<CurrencyDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            board: BoardConfig::default(),
            timing: TimingConfig::default(),
            rounds_before_sec_spawn: ROUNDS_BEFORE_SEC_SPAWN,
            levels: default_levels(),
            currencies: default_currencies(),
        }
    }
}

pub fn default_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig::new("1", 2, 100_000, 500, [0, 100, 255]),
        LevelConfig::new("2", 2, 500_000, 400, [255, 0, 0]),
        LevelConfig::new("3", 2, 1_000_000, 400, [255, 255, 0]),
        LevelConfig::new("4", 3, 2_000_000, 400, [0, 255, 0]),
        LevelConfig::new("5", 3, 1_000_000, 300, [255, 204, 0]),
        LevelConfig::new("6", 4, 4_000_000, 300, [128, 0, 128]),
        LevelConfig::new("7", 4, 7_000_000, 300, [255, 0, 194]),
        LevelConfig::new("8", 4, 9_000_000, 300, [0, 255, 191]),
    ]
}

pub fn default_currencies() -> Vec<CurrencyDef> {
    vec![
        CurrencyDef::new(CurrencyKind::Bitcoin, "Bitcoin", "BTC", 20_000, true, [247, 147, 26]),
        CurrencyDef::new(CurrencyKind::Ethereum, "Ethereum", "ETH", 12_000, false, [160, 160, 200]),
        CurrencyDef::new(CurrencyKind::Xrp, "XRP", "XRP", 15_000, true, [235, 235, 235]),
        CurrencyDef::new(CurrencyKind::Polkadot, "Polkadot", "DOT", 10, false, [230, 0, 122]),
        CurrencyDef::new(CurrencyKind::Solana, "Solana", "SOL", 505, true, [20, 241, 149]),
        CurrencyDef::new(CurrencyKind::Tether, "Tether", "USDT", 100, true, [38, 161, 123]),
        CurrencyDef::new(CurrencyKind::Usdc, "USDC", "USDC", 110, true, [39, 117, 202]),
    ]
}

impl GameConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width < 4 || self.board.height < 4 {
            return Err(ConfigError::InvalidBoard {
                width: self.board.width,
                height: self.board.height,
            });
        }
        // Every shape must fit on the board at the spawn column.
        let (left, right) = ShapeKind::horizontal_reach();
        let column = self.board.spawn_column;
        if column + left < 0 || column + right >= self.board.width as i32 {
            return Err(ConfigError::InvalidSpawnColumn(column));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLevels);
        }
        if self.currencies.is_empty() {
            return Err(ConfigError::EmptyCurrencies);
        }

        let t = &self.timing;
        let positive = [
            ("fast_fall_ms", t.fast_fall_ms),
            ("bull_run_fall_ms", t.bull_run_fall_ms),
            ("crypto_crash_fall_ms", t.crypto_crash_fall_ms),
            ("market_tick_ms", t.market_tick_ms),
            ("market_event_min_ms", t.market_event_min_ms),
            ("combo_target_min_ms", t.combo_target_min_ms),
            ("cascade_step_ms", t.cascade_step_ms),
            ("animation_step_ms", t.animation_step_ms),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::InvalidInterval(*name));
        }
        if t.market_event_max_ms < t.market_event_min_ms {
            return Err(ConfigError::InvalidInterval("market_event_max_ms"));
        }
        if t.combo_target_max_ms < t.combo_target_min_ms {
            return Err(ConfigError::InvalidInterval("combo_target_max_ms"));
        }
        if self.levels.iter().any(|l| l.fall_interval_ms == 0) {
            return Err(ConfigError::InvalidInterval("fall_interval_ms"));
        }
        if self.rounds_before_sec_spawn == 0
            || self.levels.iter().any(|l| l.rounds_before_sec_spawn == Some(0))
        {
            return Err(ConfigError::InvalidInterval("rounds_before_sec_spawn"));
        }
        Ok(())
    }
}
