//! Market model - per-currency prices and the periodic valuation update
//!
//! Each market tick draws a multiplier per currency from the half-open range
//! `[0.8, 1.2)`. A pending force flag overrides the draw. Down wins over up,
//! and only the flag that supplied the multiplier is consumed, so a pending
//! up-bias survives to the following tick. Prices are floored at [`PRICE_FLOOR`] so a crashed currency can always
//! recover, and capped at [`VALUE_CEILING`].

use log::warn;
use serde::{Deserialize, Serialize};

use breakout_types::{CurrencyKind, MarketEvent, PRICE_FLOOR, VALUE_CEILING};

use crate::config::CurrencyDef;
use crate::rng::SimpleRng;
use crate::scoring::apply_event;

const MULTIPLIER_MIN: f64 = 0.8;
const MULTIPLIER_MAX: f64 = 1.2;
const FORCED_DOWN: f64 = 0.99;
const FORCED_UP: f64 = 1.2;

/// Live market data for one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub kind: CurrencyKind,
    pub display_name: String,
    pub symbol: String,
    pub price: u32,
    pub volatility_up: bool,
    pub force_up: bool,
    pub force_down: bool,
    pub color: [u8; 3],
}

impl From<&CurrencyDef> for CurrencyValue {
    fn from(def: &CurrencyDef) -> Self {
        Self {
            kind: def.kind,
            display_name: def.display_name.clone(),
            symbol: def.symbol.clone(),
            price: def.price.clamp(PRICE_FLOOR, VALUE_CEILING),
            volatility_up: def.volatility_up,
            force_up: false,
            force_down: false,
            color: def.color,
        }
    }
}

/// The currency table.
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    values: Vec<CurrencyValue>,
}

impl Market {
    pub fn new(defs: &[CurrencyDef]) -> Self {
        Self {
            values: defs.iter().map(CurrencyValue::from).collect(),
        }
    }

    pub fn values(&self) -> &[CurrencyValue] {
        &self.values
    }

    /// Currencies in table order. Spawns draw from this list.
    pub fn kinds(&self) -> Vec<CurrencyKind> {
        self.values.iter().map(|v| v.kind).collect()
    }

    pub fn get(&self, kind: CurrencyKind) -> Option<&CurrencyValue> {
        self.values.iter().find(|v| v.kind == kind)
    }

    /// Current price of `kind`. A currency missing from the table is logged
    /// and reads as absent.
    pub fn price_of(&self, kind: CurrencyKind) -> Option<u32> {
        match self.get(kind) {
            Some(v) => Some(v.price),
            None => {
                warn!("[Market] no value for currency {}", kind.as_str());
                None
            }
        }
    }

    /// Score contribution of one block of `kind` under `event`.
    pub fn scaled_value(&self, kind: CurrencyKind, event: MarketEvent) -> u32 {
        self.price_of(kind)
            .map(|p| apply_event(p, event))
            .unwrap_or(0)
    }

    pub fn color_of(&self, kind: CurrencyKind) -> [u8; 3] {
        self.get(kind).map(|v| v.color).unwrap_or([255, 255, 255])
    }

    /// Bias every currency down on the next tick.
    pub fn force_all_down(&mut self) {
        for v in &mut self.values {
            v.force_down = true;
        }
    }

    /// Bias every currency up on the next tick.
    pub fn force_all_up(&mut self) {
        for v in &mut self.values {
            v.force_up = true;
        }
    }

    /// Apply one valuation update to every currency.
    pub fn tick(&mut self, rng: &mut SimpleRng) {
        for v in &mut self.values {
            let multiplier = if v.force_down {
                v.force_down = false;
                FORCED_DOWN
            } else if v.force_up {
                v.force_up = false;
                FORCED_UP
            } else {
                rng.range_f64(MULTIPLIER_MIN, MULTIPLIER_MAX)
            };

            let next = (v.price as f64 * multiplier) as u64;
            v.price = next.clamp(PRICE_FLOOR as u64, VALUE_CEILING as u64) as u32;
            v.volatility_up = multiplier > 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_currencies;

    fn market() -> Market {
        Market::new(&default_currencies())
    }

    #[test]
    fn test_force_down_takes_priority() {
        let mut m = market();
        m.force_all_up();
        m.force_all_down();
        let before = m.price_of(CurrencyKind::Bitcoin).unwrap();
        m.tick(&mut SimpleRng::new(1));
        let v = m.get(CurrencyKind::Bitcoin).unwrap();
        assert_eq!(v.price, (before as f64 * 0.99) as u32);
        assert!(!v.volatility_up);
        assert!(!v.force_down);
        assert!(v.force_up);
    }

    #[test]
    fn test_pending_up_bias_applies_after_down() {
        let mut m = market();
        m.force_all_up();
        m.force_all_down();
        let mut rng = SimpleRng::new(1);
        m.tick(&mut rng);
        let after_down = m.price_of(CurrencyKind::Ethereum).unwrap();
        m.tick(&mut rng);
        let v = m.get(CurrencyKind::Ethereum).unwrap();
        assert_eq!(v.price, (after_down as f64 * 1.2) as u32);
        assert!(v.volatility_up);
        assert!(!v.force_up && !v.force_down);
    }

    #[test]
    fn test_force_up_applies_once() {
        let mut m = market();
        m.force_all_up();
        m.tick(&mut SimpleRng::new(1));
        let v = m.get(CurrencyKind::Ethereum).unwrap();
        assert_eq!(v.price, (12_000f64 * 1.2) as u32);
        assert!(v.volatility_up);
        assert!(!v.force_up);
    }

    #[test]
    fn test_price_floor_allows_recovery() {
        let mut m = market();
        let mut rng = SimpleRng::new(5);
        for _ in 0..500 {
            m.force_all_down();
            m.tick(&mut rng);
        }
        let dot = m.get(CurrencyKind::Polkadot).unwrap();
        assert_eq!(dot.price, PRICE_FLOOR);

        m.force_all_up();
        m.tick(&mut rng);
        assert!(m.get(CurrencyKind::Polkadot).unwrap().price >= PRICE_FLOOR);
    }

    #[test]
    fn test_random_tick_stays_within_band() {
        let mut m = market();
        let mut rng = SimpleRng::new(77);
        let before = m.price_of(CurrencyKind::Xrp).unwrap() as f64;
        m.tick(&mut rng);
        let after = m.price_of(CurrencyKind::Xrp).unwrap() as f64;
        assert!(after >= (before * 0.8).floor() && after <= before * 1.2);
    }

    #[test]
    fn test_missing_currency_scores_zero() {
        let defs: Vec<_> = default_currencies()
            .into_iter()
            .filter(|s| s.kind != CurrencyKind::Xrp)
            .collect();
        let m = Market::new(&defs);
        assert_eq!(m.price_of(CurrencyKind::Xrp), None);
        assert_eq!(m.scaled_value(CurrencyKind::Xrp, MarketEvent::BullRun), 0);
    }
}
