//! Two-phase animation state
//!
//! A multi-step visual (the glow before a formation merges, the victory
//! sequence) is `Animating` until its duration elapses, then hands back its
//! continuation exactly once and returns to `Idle`. The game advances it from
//! the animation timer.

use crate::matching::Formation;

/// What to do when an animation finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    CompleteFormation(Formation),
    AdvanceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Animation {
    #[default]
    Idle,
    Animating {
        elapsed_ms: u32,
        duration_ms: u32,
        on_complete: Continuation,
    },
}

impl Animation {
    /// Begin a new animation. One that was already running is replaced.
    pub fn start(&mut self, duration_ms: u32, on_complete: Continuation) {
        *self = Animation::Animating {
            elapsed_ms: 0,
            duration_ms,
            on_complete,
        };
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Animation::Idle)
    }

    /// Add `step_ms`. Returns the continuation on the step that reaches the
    /// duration, and `None` before and after.
    pub fn advance(&mut self, step_ms: u32) -> Option<Continuation> {
        let Animation::Animating {
            elapsed_ms,
            duration_ms,
            ..
        } = self
        else {
            return None;
        };
        *elapsed_ms = elapsed_ms.saturating_add(step_ms);
        if *elapsed_ms < *duration_ms {
            return None;
        }
        match std::mem::take(self) {
            Animation::Animating { on_complete, .. } => Some(on_complete),
            Animation::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_fires_once() {
        let mut a = Animation::default();
        a.start(30, Continuation::AdvanceLevel);
        assert_eq!(a.advance(10), None);
        assert_eq!(a.advance(10), None);
        assert_eq!(a.advance(10), Some(Continuation::AdvanceLevel));
        assert!(a.is_idle());
        assert_eq!(a.advance(10), None);
    }

    #[test]
    fn test_idle_animation_never_completes() {
        let mut a = Animation::Idle;
        assert_eq!(a.advance(1_000), None);
        a.start(100, Continuation::AdvanceLevel);
        a.advance(25);
        assert!(!a.is_idle());
    }
}
