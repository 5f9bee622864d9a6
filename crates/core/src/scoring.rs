//! Scoring module - market-event scaling and clamped accumulation
//!
//! Every scoring path in the match engine goes through these two functions, so
//! the overflow clamp is applied uniformly.

use breakout_types::{MarketEvent, VALUE_CEILING};

/// Scale a block value by the active market event.
///
/// BullRun doubles, CryptoCrash halves (truncating). The result never exceeds
/// [`VALUE_CEILING`].
pub fn apply_event(value: u32, event: MarketEvent) -> u32 {
    let scaled = match event {
        MarketEvent::None => value,
        MarketEvent::BullRun => value.saturating_mul(2),
        MarketEvent::CryptoCrash => value / 2,
    };
    scaled.min(VALUE_CEILING)
}

/// Add `points` to `score`, clamped to [`VALUE_CEILING`].
pub fn add_points(score: u32, points: u32) -> u32 {
    score.saturating_add(points).min(VALUE_CEILING)
}
