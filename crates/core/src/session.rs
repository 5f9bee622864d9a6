//! Session controller - level progression and the terminal state.

use log::info;

use crate::config::LevelConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    levels: Vec<LevelConfig>,
    index: usize,
    ended: bool,
}

impl Session {
    /// `levels` must be non-empty; [`GameConfig::validate`](crate::config::GameConfig::validate)
    /// guarantees it. An empty table falls back to the default levels.
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        let levels = if levels.is_empty() {
            crate::config::default_levels()
        } else {
            levels
        };
        Self {
            levels,
            index: 0,
            ended: false,
        }
    }

    pub fn level(&self) -> &LevelConfig {
        &self.levels[self.index]
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Score reached the current level's target.
    pub fn check_victory(&self, score: u32) -> bool {
        !self.ended && score >= self.level().target_score
    }

    /// Move to the next level, staying on the last one past the end of the table.
    /// Returns the new index.
    pub fn advance_level(&mut self) -> usize {
        self.index = (self.index + 1).min(self.levels.len() - 1);
        info!("[Session] level {} ({})", self.index, self.level().name);
        self.index
    }

    pub fn end(&mut self) {
        if !self.ended {
            info!("[Session] game over on level {}", self.index);
        }
        self.ended = true;
    }

    pub fn is_over(&self) -> bool {
        self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_levels;

    #[test]
    fn test_advance_clamps_to_last_level() {
        let mut s = Session::new(default_levels());
        for _ in 0..20 {
            s.advance_level();
        }
        assert_eq!(s.level_index(), s.level_count() - 1);
        assert_eq!(s.level().name, "8");
    }

    #[test]
    fn test_victory_uses_current_target() {
        let s = Session::new(default_levels());
        assert!(!s.check_victory(99_999));
        assert!(s.check_victory(100_000));
    }

    #[test]
    fn test_ended_session_never_wins() {
        let mut s = Session::new(default_levels());
        s.end();
        assert!(s.is_over());
        assert!(!s.check_victory(u32::MAX));
    }

    #[test]
    fn test_empty_table_falls_back_to_defaults() {
        let s = Session::new(Vec::new());
        assert_eq!(s.level_count(), 8);
    }
}
