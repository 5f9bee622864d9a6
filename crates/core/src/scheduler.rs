//! Cooperative scheduler - named repeating timers on one thread
//!
//! The game owns a single [`Scheduler`] and feeds it elapsed time. Each call to
//! [`Scheduler::advance`] reports which timers came due and how many times, in
//! [`TimerId`] declaration order. Handlers run to completion between calls, so
//! nothing here needs locking.

use arrayvec::ArrayVec;

/// Every timer the game uses. Declaration order is firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    Animation,
    Cascade,
    Gravity,
    Market,
    MarketEvent,
    ComboTarget,
}

impl TimerId {
    pub const ALL: [TimerId; 6] = [
        TimerId::Animation,
        TimerId::Cascade,
        TimerId::Gravity,
        TimerId::Market,
        TimerId::MarketEvent,
        TimerId::ComboTarget,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Timer {
    period_ms: u32,
    elapsed_ms: u32,
    armed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scheduler {
    timers: [Timer; 6],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a timer from zero. A zero period is treated as 1ms.
    pub fn arm(&mut self, id: TimerId, period_ms: u32) {
        self.timers[id.slot()] = Timer {
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            armed: true,
        };
    }

    /// Change a timer's period, keeping the time already accumulated up to one
    /// period short of firing. Arms the timer if it was idle.
    pub fn rearm(&mut self, id: TimerId, period_ms: u32) {
        let t = &mut self.timers[id.slot()];
        if !t.armed {
            t.elapsed_ms = 0;
        }
        t.period_ms = period_ms.max(1);
        t.elapsed_ms = t.elapsed_ms.min(t.period_ms - 1);
        t.armed = true;
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers[id.slot()] = Timer::default();
    }

    pub fn cancel_all(&mut self) {
        self.timers = [Timer::default(); 6];
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers[id.slot()].armed
    }

    pub fn period(&self, id: TimerId) -> Option<u32> {
        let t = &self.timers[id.slot()];
        t.armed.then_some(t.period_ms)
    }

    /// Advance every armed timer. Returns the timers that fired with their
    /// fire counts.
    pub fn advance(&mut self, elapsed_ms: u32) -> ArrayVec<(TimerId, u32), 6> {
        let mut fired = ArrayVec::new();
        for id in TimerId::ALL {
            let t = &mut self.timers[id.slot()];
            if !t.armed {
                continue;
            }
            t.elapsed_ms = t.elapsed_ms.saturating_add(elapsed_ms);
            let count = t.elapsed_ms / t.period_ms;
            if count > 0 {
                t.elapsed_ms %= t.period_ms;
                fired.push((id, count));
            }
        }
        fired
    }
}
