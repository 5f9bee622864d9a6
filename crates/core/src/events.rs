//! Outbound events and the host capability traits
//!
//! The simulation never renders, plays effects or updates widgets itself. It
//! appends [`GameEvent`]s to an outbox; the host drains them each frame and
//! hands them to a host implementing [`Renderer`], [`EffectsPlayer`] and
//! [`UiNotifier`] via [`dispatch`]. All trait methods default to no-ops so a
//! host only overrides what it draws.
//!
//! Block identity is assigned by the board. A renderer keeps its own
//! `BlockId -> handle` map from `BlockSpawned` onward.

use breakout_types::{BlockFlags, CurrencyKind, GridPos, MarketEvent};

use crate::board::BlockId;
use crate::market::CurrencyValue;

/// Sound cues the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Explosion,
    RowClear,
    LaserBurst,
    Glow,
    Victory,
    GameOver,
    SecRaid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BlockSpawned {
        id: BlockId,
        currency: Option<CurrencyKind>,
        flags: BlockFlags,
        pos: GridPos,
    },
    BlockMoved {
        id: BlockId,
        to: GridPos,
    },
    BlockDestroyed {
        id: BlockId,
    },
    BlockScaled {
        id: BlockId,
        factor: f32,
    },
    Explosion {
        pos: GridPos,
        color1: [u8; 3],
        color2: [u8; 3],
    },
    RowCleared {
        row: i32,
        color: [u8; 3],
    },
    Glow {
        blocks: Vec<BlockId>,
        duration_ms: u32,
    },
    CameraShake,
    Sound(SoundCue),
    ScoreChanged(u32),
    MarketUpdated(Vec<CurrencyValue>),
    ComboChanged(u8),
    LevelChanged(usize),
    MarketEventChanged(MarketEvent),
    Victory,
    GameOver,
}

/// Draws blocks. Ids come from [`GameEvent::BlockSpawned`].
pub trait Renderer {
    fn spawn_block(&mut self, _id: BlockId, _currency: Option<CurrencyKind>, _flags: BlockFlags, _pos: GridPos) {}
    fn destroy(&mut self, _id: BlockId) {}
    fn move_to(&mut self, _id: BlockId, _pos: GridPos) {}
    fn set_scale(&mut self, _id: BlockId, _factor: f32) {}
}

/// Fire-and-forget visual and audio effects.
pub trait EffectsPlayer {
    fn play_explosion(&mut self, _pos: GridPos, _color1: [u8; 3], _color2: [u8; 3]) {}
    fn play_row_clear(&mut self, _row: i32, _color: [u8; 3]) {}
    fn play_glow(&mut self, _blocks: &[BlockId], _duration_ms: u32) {}
    fn shake_camera(&mut self) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
    fn play_victory(&mut self) {}
    fn play_game_over(&mut self) {}
}

/// Broadcast-style HUD updates.
pub trait UiNotifier {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_market_updated(&mut self, _table: &[CurrencyValue]) {}
    fn on_combo_changed(&mut self, _count: u8) {}
    fn on_level_changed(&mut self, _level: usize) {}
    fn on_market_event(&mut self, _event: MarketEvent) {}
}

/// Route drained events to a host implementing the collaborator traits.
pub fn dispatch<H>(events: &[GameEvent], host: &mut H)
where
    H: Renderer + EffectsPlayer + UiNotifier + ?Sized,
{
    for event in events {
        match event {
            GameEvent::BlockSpawned {
                id,
                currency,
                flags,
                pos,
            } => host.spawn_block(*id, *currency, *flags, *pos),
            GameEvent::BlockMoved { id, to } => host.move_to(*id, *to),
            GameEvent::BlockDestroyed { id } => host.destroy(*id),
            GameEvent::BlockScaled { id, factor } => host.set_scale(*id, *factor),
            GameEvent::Explosion { pos, color1, color2 } => host.play_explosion(*pos, *color1, *color2),
            GameEvent::RowCleared { row, color } => host.play_row_clear(*row, *color),
            GameEvent::Glow {
                blocks,
                duration_ms,
            } => host.play_glow(blocks, *duration_ms),
            GameEvent::CameraShake => host.shake_camera(),
            GameEvent::Sound(cue) => host.play_sound(*cue),
            GameEvent::ScoreChanged(score) => host.on_score_changed(*score),
            GameEvent::MarketUpdated(table) => host.on_market_updated(table),
            GameEvent::ComboChanged(count) => host.on_combo_changed(*count),
            GameEvent::LevelChanged(level) => host.on_level_changed(*level),
            GameEvent::MarketEventChanged(ev) => host.on_market_event(*ev),
            GameEvent::Victory => host.play_victory(),
            GameEvent::GameOver => host.play_game_over(),
        }
    }
}

/// A host that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Renderer for NullHost {}
impl EffectsPlayer for NullHost {}
impl UiNotifier for NullHost {}
