//! Combo bookkeeping.

use breakout_types::{CurrencyKind, MAX_COMBO};

use crate::rng::SimpleRng;

/// Combo counter plus the currency that currently feeds it.
///
/// The count is clamped to `0..=MAX_COMBO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboState {
    count: u8,
    target: Option<CurrencyKind>,
}

impl ComboState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn target(&self) -> Option<CurrencyKind> {
        self.target
    }

    /// Returns true if the count actually changed.
    pub fn increment(&mut self) -> bool {
        let next = (self.count + 1).min(MAX_COMBO);
        let changed = next != self.count;
        self.count = next;
        changed
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn is_target(&self, kind: CurrencyKind) -> bool {
        self.target == Some(kind)
    }

    /// Pick a new target currency.
    pub fn retarget(&mut self, rng: &mut SimpleRng, kinds: &[CurrencyKind]) {
        self.target = rng.pick(kinds);
    }

    pub fn set_target(&mut self, target: Option<CurrencyKind>) {
        self.target = target;
    }
}
