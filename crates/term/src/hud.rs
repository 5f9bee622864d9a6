//! Terminal stand-ins for the effects and HUD collaborators.
//!
//! A terminal cannot play particles or sounds, so [`StatusLine`] turns effect
//! requests into a short-lived text banner under the board and a brief
//! sideways jitter for camera shake. Board blocks are drawn from the snapshot,
//! so the renderer side only counts what it is told.

use crate::core::{BlockId, CurrencyValue, EffectsPlayer, Renderer, SoundCue, UiNotifier};
use crate::types::{BlockFlags, CurrencyKind, GridPos, MarketEvent};

const MESSAGE_MS: u32 = 1200;
const SHAKE_MS: u32 = 240;

#[derive(Debug, Default, Clone)]
pub struct StatusLine {
    message: Option<String>,
    message_ms: u32,
    shake_ms: u32,
    blocks_destroyed: u64,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Total blocks the core reported destroyed.
    pub fn blocks_destroyed(&self) -> u64 {
        self.blocks_destroyed
    }

    /// Column offset for the board frame: alternates while a shake runs.
    pub fn shake_offset(&self) -> u16 {
        if self.shake_ms == 0 {
            0
        } else {
            ((self.shake_ms / 40) % 2) as u16
        }
    }

    /// Age the banner and shake.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.shake_ms = self.shake_ms.saturating_sub(elapsed_ms);
        self.message_ms = self.message_ms.saturating_sub(elapsed_ms);
        if self.message_ms == 0 {
            self.message = None;
        }
    }

    fn say(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
        self.message_ms = MESSAGE_MS;
    }
}

impl Renderer for StatusLine {
    fn destroy(&mut self, _id: BlockId) {
        self.blocks_destroyed += 1;
    }

    fn spawn_block(&mut self, _id: BlockId, _currency: Option<CurrencyKind>, flags: BlockFlags, _pos: GridPos) {
        if flags.contains(BlockFlags::BOMB) {
            self.say("BOMB FORMED");
        } else if flags.contains(BlockFlags::SUPER) {
            self.say("SUPER BLOCK");
        }
    }
}

impl EffectsPlayer for StatusLine {
    fn shake_camera(&mut self) {
        self.shake_ms = SHAKE_MS;
    }

    fn play_sound(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::RowClear => self.say("ROW CLEARED"),
            SoundCue::LaserBurst => self.say("LASER BURST"),
            SoundCue::SecRaid => self.say("SEC RAID"),
            SoundCue::Explosion | SoundCue::Glow | SoundCue::Victory | SoundCue::GameOver => {}
        }
    }

    fn play_victory(&mut self) {
        self.say("TARGET REACHED");
    }
}

impl UiNotifier for StatusLine {
    fn on_combo_changed(&mut self, count: u8) {
        if count > 1 {
            self.say(format!("COMBO x{count}"));
        }
    }

    fn on_level_changed(&mut self, level: usize) {
        if level > 0 {
            self.say(format!("LEVEL {}", level + 1));
        }
    }

    fn on_market_event(&mut self, event: MarketEvent) {
        match event {
            MarketEvent::BullRun => self.say("BULL RUN: scores doubled"),
            MarketEvent::CryptoCrash => self.say("CRYPTO CRASH: scores halved"),
            MarketEvent::None => {}
        }
    }

    fn on_market_updated(&mut self, _table: &[CurrencyValue]) {}
}
