//! Game module - the complete running session
//!
//! [`Game`] owns the board and every component that mutates it, and drives them
//! from one [`Scheduler`]. Hosts call [`Game::tick`] every frame with elapsed
//! wall time, forward player intents through [`Game::apply_action`], and drain
//! [`GameEvent`]s afterwards.
//!
//! Timer handlers, in firing order:
//!
//! | Timer       | Period                          | Handler                                  |
//! |-------------|---------------------------------|------------------------------------------|
//! | Animation   | `animation_step_ms`             | advance glow/victory, run continuation   |
//! | Cascade     | `cascade_step_ms`               | one match pass, then gravity             |
//! | Gravity     | fall interval (level/fast/event)| move the piece down or lock it           |
//! | Market      | `market_tick_ms`                | revalue currencies                       |
//! | MarketEvent | random in the configured window | draw BullRun or CryptoCrash              |
//! | ComboTarget | random in the configured window | pick a new combo currency                |
//!
//! A new piece spawns only once the cascade started by the previous lock has
//! settled and no animation is running.

use log::{debug, info};

use breakout_types::{BlockFlags, GameAction, MarketEvent, TICK_MS};

use crate::animation::{Animation, Continuation};
use crate::board::Board;
use crate::combo::ComboState;
use crate::config::{GameConfig, LevelConfig};
use crate::events::{GameEvent, SoundCue};
use crate::market::Market;
use crate::matching::{MatchContext, MatchEngine, PassOutcome};
use crate::piece::{ActivePiece, PieceController, PieceTemplate, StepResult};
use crate::rng::SimpleRng;
use crate::scheduler::{Scheduler, TimerId};
use crate::session::Session;
use crate::snapshot::{ActiveSnapshot, GameSnapshot, MarketRow};

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    pieces: PieceController,
    market: Market,
    combo: ComboState,
    session: Session,
    scheduler: Scheduler,
    animation: Animation,
    engine: MatchEngine,
    rng: SimpleRng,
    score: u32,
    event: MarketEvent,
    fast_drop: bool,
    drop_in_progress: bool,
    paused: bool,
    started: bool,
    game_over: bool,
    episode_id: u32,
    tick_accumulator_ms: u32,
    events: Vec<GameEvent>,
}

impl Game {
    /// Default tables with the given seed.
    pub fn new(seed: u32) -> Self {
        Self::with_config(GameConfig {
            seed,
            ..GameConfig::default()
        })
    }

    /// Build a game from a configuration. Callers validate the configuration
    /// first; [`GameConfig::from_json_str`] already does.
    pub fn with_config(config: GameConfig) -> Self {
        let board = Board::new(config.board.width, config.board.height);
        let market = Market::new(&config.currencies);
        let session = Session::new(config.levels.clone());
        let rounds = session
            .level()
            .rounds_before_sec_spawn
            .unwrap_or(config.rounds_before_sec_spawn);
        let pieces = PieceController::new(config.board.spawn_column, rounds);
        let engine = MatchEngine::new(config.timing.glow_duration_ms);
        let rng = SimpleRng::new(config.seed);
        Self {
            config,
            board,
            pieces,
            market,
            combo: ComboState::new(),
            session,
            scheduler: Scheduler::new(),
            animation: Animation::Idle,
            engine,
            rng,
            score: 0,
            event: MarketEvent::None,
            fast_drop: false,
            drop_in_progress: false,
            paused: false,
            started: false,
            game_over: false,
            episode_id: 0,
            tick_accumulator_ms: 0,
            events: Vec::new(),
        }
    }

    /// Spawn the first piece and arm the timers.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let kinds = self.market.kinds();
        self.combo.retarget(&mut self.rng, &kinds);

        self.scheduler.arm(TimerId::Gravity, self.fall_interval_ms());
        self.scheduler.arm(TimerId::Market, self.config.timing.market_tick_ms);
        self.arm_market_event_timer();
        self.arm_combo_target_timer();

        self.events.push(GameEvent::LevelChanged(self.session.level_index()));
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.events.push(GameEvent::ComboChanged(self.combo.count()));
        self.events.push(GameEvent::MarketEventChanged(self.event));
        self.events
            .push(GameEvent::MarketUpdated(self.market.values().to_vec()));

        info!(
            "[Game] episode {} started, seed {}, level {}",
            self.episode_id,
            self.config.seed,
            self.session.level().name
        );
        self.spawn_next();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> &ComboState {
        &self.combo
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn market_event(&self) -> MarketEvent {
        self.event
    }

    pub fn level(&self) -> &LevelConfig {
        self.session.level()
    }

    pub fn level_index(&self) -> usize {
        self.session.level_index()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for hosts that set up scenarios.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.pieces.active()
    }

    /// Preview of the piece the next spawn will produce.
    pub fn next_piece(&self) -> Option<PieceTemplate> {
        self.pieces.upcoming(self.board.width())
    }

    pub fn fast_drop(&self) -> bool {
        self.fast_drop
    }

    /// A cascade started by a lock (or an officer clear) is still resolving.
    pub fn drop_in_progress(&self) -> bool {
        self.drop_in_progress
    }

    pub fn is_animating(&self) -> bool {
        !self.animation.is_idle()
    }

    fn playable(&self) -> bool {
        self.started && !self.paused && !self.game_over
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current fall interval: fast drop wins, then a market event, then the level.
    pub fn fall_interval_ms(&self) -> u32 {
        let timing = &self.config.timing;
        if self.fast_drop {
            return timing.fast_fall_ms;
        }
        match self.event {
            MarketEvent::BullRun => timing.bull_run_fall_ms,
            MarketEvent::CryptoCrash => timing.crypto_crash_fall_ms,
            MarketEvent::None => self.session.level().fall_interval_ms,
        }
    }

    /// Advance the simulation by wall-clock time. Time is consumed in fixed
    /// `TICK_MS` steps; the remainder carries over. Returns true if any step ran.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.playable() {
            return false;
        }
        self.tick_accumulator_ms = self.tick_accumulator_ms.saturating_add(elapsed_ms);

        let mut stepped = false;
        while self.tick_accumulator_ms >= TICK_MS && !self.game_over {
            self.tick_accumulator_ms -= TICK_MS;
            self.step(TICK_MS);
            stepped = true;
        }
        stepped
    }

    fn step(&mut self, step_ms: u32) {
        let fired = self.scheduler.advance(step_ms);
        for (id, count) in fired {
            for _ in 0..count {
                // an earlier handler may have cancelled this timer
                if self.game_over || !self.scheduler.is_armed(id) {
                    break;
                }
                match id {
                    TimerId::Animation => self.on_animation_step(),
                    TimerId::Cascade => self.on_cascade_step(),
                    TimerId::Gravity => self.on_gravity(),
                    TimerId::Market => self.on_market_tick(),
                    TimerId::MarketEvent => self.on_market_event(),
                    TimerId::ComboTarget => self.on_combo_target(),
                }
            }
        }
    }

    /// Apply a player intent. Returns true if it changed anything.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if action == GameAction::Restart {
            self.restart();
            return true;
        }
        if !self.started || self.game_over {
            return false;
        }

        match action {
            GameAction::MoveLeft => self.translate(-1),
            GameAction::MoveRight => self.translate(1),
            GameAction::RotateCw => {
                if !self.playable() {
                    return false;
                }
                let rotated = self.pieces.try_rotate(&self.board);
                if rotated {
                    self.emit_active_moved();
                }
                rotated
            }
            GameAction::FastDropStart => self.set_fast_drop(true),
            GameAction::FastDropEnd => self.set_fast_drop(false),
            GameAction::Pause => {
                self.paused = !self.paused;
                info!("[Game] {}", if self.paused { "paused" } else { "resumed" });
                true
            }
            GameAction::ClearOfficers => self.clear_officer_blocks(),
            GameAction::Restart => false,
        }
    }

    fn translate(&mut self, dx: i32) -> bool {
        if !self.playable() {
            return false;
        }
        let moved = self.pieces.try_translate(&self.board, dx);
        if moved {
            self.emit_active_moved();
        }
        moved
    }

    /// Switch fall rates. The gravity timer keeps its accumulated time.
    fn set_fast_drop(&mut self, on: bool) -> bool {
        if self.fast_drop == on {
            return false;
        }
        self.fast_drop = on;
        if self.scheduler.is_armed(TimerId::Gravity) {
            self.scheduler.rearm(TimerId::Gravity, self.fall_interval_ms());
        }
        true
    }

    /// Replace the active market event and re-arm gravity for it.
    pub fn set_market_event(&mut self, event: MarketEvent) {
        self.event = event;
        if self.scheduler.is_armed(TimerId::Gravity) {
            self.scheduler.rearm(TimerId::Gravity, self.fall_interval_ms());
        }
        self.events.push(GameEvent::MarketEventChanged(event));
        info!("[Game] market event: {}", event.as_str());
    }

    /// Remove every officer block, reset the combo and let the board settle.
    /// Ignored while an animation runs.
    pub fn clear_officer_blocks(&mut self) -> bool {
        if !self.playable() || !self.animation.is_idle() {
            return false;
        }
        let officers: Vec<_> = self
            .board
            .blocks()
            .filter(|(_, b)| b.flags.contains(BlockFlags::OFFICER))
            .map(|(_, b)| b.id)
            .collect();
        if officers.is_empty() {
            return false;
        }

        for id in &officers {
            if self.board.remove_block(*id).is_some() {
                self.events.push(GameEvent::BlockDestroyed { id: *id });
            }
        }
        self.combo.reset();
        self.events.push(GameEvent::ComboChanged(0));
        self.events.push(GameEvent::Sound(SoundCue::SecRaid));
        info!("[Game] cleared {} officer blocks", officers.len());

        self.run_gravity();
        if !self.drop_in_progress {
            self.drop_in_progress = true;
            self.scheduler
                .arm(TimerId::Cascade, self.config.timing.cascade_step_ms);
        }
        true
    }

    fn restart(&mut self) {
        let next_episode = self.episode_id.wrapping_add(1);
        *self = Self::with_config(self.config.clone());
        self.episode_id = next_episode;
        self.start();
    }

    fn spawn_next(&mut self) {
        let kinds = self.market.kinds();
        let piece = self.pieces.spawn(&mut self.board, &mut self.rng, &kinds);
        let officer = piece.is_officer();
        for b in &piece.blocks {
            self.events.push(GameEvent::BlockSpawned {
                id: b.id,
                currency: b.currency,
                flags: b.flags,
                pos: b.pos,
            });
        }
        if officer {
            self.events.push(GameEvent::Sound(SoundCue::SecRaid));
            info!("[Game] SEC officers incoming");
        }
    }

    fn emit_active_moved(&mut self) {
        if let Some(piece) = self.pieces.active() {
            for b in &piece.blocks {
                self.events.push(GameEvent::BlockMoved { id: b.id, to: b.pos });
            }
        }
    }

    fn on_gravity(&mut self) {
        if self.drop_in_progress || !self.animation.is_idle() {
            return;
        }
        match self.pieces.gravity_step(&mut self.board) {
            StepResult::Idle => {}
            StepResult::Moved => self.emit_active_moved(),
            StepResult::Locked { game_over: true } => self.end_game(),
            StepResult::Locked { game_over: false } => {
                self.board.clear_flag(BlockFlags::CANNOT_BLOW_UP_YET);
                self.drop_in_progress = true;
                self.scheduler
                    .arm(TimerId::Cascade, self.config.timing.cascade_step_ms);
                self.on_cascade_step();
            }
        }
    }

    fn run_pass(&mut self) -> PassOutcome {
        let threshold = self.session.level().pairing_threshold;
        let mut ctx = MatchContext::new(
            &mut self.market,
            &mut self.combo,
            &mut self.score,
            self.event,
            threshold,
            &mut self.events,
        );
        self.engine.run_pass(&mut self.board, &mut ctx)
    }

    fn run_gravity(&mut self) -> usize {
        let threshold = self.session.level().pairing_threshold;
        let mut ctx = MatchContext::new(
            &mut self.market,
            &mut self.combo,
            &mut self.score,
            self.event,
            threshold,
            &mut self.events,
        );
        self.engine.apply_gravity(&mut self.board, &mut ctx)
    }

    fn on_cascade_step(&mut self) {
        match self.run_pass() {
            PassOutcome::Changed => {
                self.run_gravity();
            }
            PassOutcome::Forming(formation) => {
                self.scheduler.cancel(TimerId::Cascade);
                self.animation.start(
                    self.config.timing.glow_duration_ms,
                    Continuation::CompleteFormation(formation),
                );
                self.scheduler
                    .arm(TimerId::Animation, self.config.timing.animation_step_ms);
            }
            PassOutcome::Stable => {
                self.scheduler.cancel(TimerId::Cascade);
                self.drop_in_progress = false;
                debug!("[Game] board settled, score {}", self.score);
                self.after_settle();
            }
        }
    }

    fn after_settle(&mut self) {
        if self.session.check_victory(self.score) {
            self.begin_victory();
        } else if !self.pieces.has_active() {
            self.spawn_next();
        }
    }

    fn on_animation_step(&mut self) {
        let Some(continuation) = self.animation.advance(self.config.timing.animation_step_ms) else {
            return;
        };
        self.scheduler.cancel(TimerId::Animation);
        match continuation {
            Continuation::CompleteFormation(formation) => {
                let threshold = self.session.level().pairing_threshold;
                let mut ctx = MatchContext::new(
                    &mut self.market,
                    &mut self.combo,
                    &mut self.score,
                    self.event,
                    threshold,
                    &mut self.events,
                );
                self.engine
                    .complete_formation(&mut self.board, &formation, &mut ctx);
                self.engine.apply_gravity(&mut self.board, &mut ctx);
                self.scheduler
                    .arm(TimerId::Cascade, self.config.timing.cascade_step_ms);
            }
            Continuation::AdvanceLevel => self.advance_level(),
        }
    }

    fn begin_victory(&mut self) {
        info!(
            "[Game] level {} cleared with {} points",
            self.session.level().name,
            self.score
        );
        for (_, b) in self.board.blocks() {
            self.events.push(GameEvent::BlockDestroyed { id: b.id });
        }
        if let Some(piece) = self.pieces.active() {
            for b in &piece.blocks {
                self.events.push(GameEvent::BlockDestroyed { id: b.id });
            }
        }
        self.board.clear();
        self.pieces.clear();
        self.events.push(GameEvent::Victory);
        self.events.push(GameEvent::Sound(SoundCue::Victory));
        self.animation.start(
            self.config.timing.victory_duration_ms,
            Continuation::AdvanceLevel,
        );
        self.scheduler
            .arm(TimerId::Animation, self.config.timing.animation_step_ms);
    }

    fn advance_level(&mut self) {
        let index = self.session.advance_level();
        self.score = 0;
        let rounds = self
            .session
            .level()
            .rounds_before_sec_spawn
            .unwrap_or(self.config.rounds_before_sec_spawn);
        self.pieces.set_rounds_before_sec_spawn(rounds);
        let kinds = self.market.kinds();
        self.pieces.refill(&mut self.rng, &kinds);
        self.combo.retarget(&mut self.rng, &kinds);
        self.arm_combo_target_timer();
        self.scheduler.arm(TimerId::Gravity, self.fall_interval_ms());

        self.events.push(GameEvent::LevelChanged(index));
        self.events.push(GameEvent::ScoreChanged(0));
        self.spawn_next();
    }

    fn on_market_tick(&mut self) {
        self.market.tick(&mut self.rng);
        self.events
            .push(GameEvent::MarketUpdated(self.market.values().to_vec()));
    }

    fn on_market_event(&mut self) {
        let event = if self.rng.next_range(2) == 0 {
            MarketEvent::BullRun
        } else {
            MarketEvent::CryptoCrash
        };
        self.set_market_event(event);
        self.arm_market_event_timer();
    }

    fn on_combo_target(&mut self) {
        let kinds = self.market.kinds();
        self.combo.retarget(&mut self.rng, &kinds);
        self.arm_combo_target_timer();
        debug!(
            "[Game] combo target now {}",
            self.combo.target().map(|k| k.as_str()).unwrap_or("none")
        );
    }

    fn arm_market_event_timer(&mut self) {
        let t = &self.config.timing;
        let period = self.rng.range_u32(t.market_event_min_ms, t.market_event_max_ms);
        self.scheduler.arm(TimerId::MarketEvent, period);
    }

    fn arm_combo_target_timer(&mut self) {
        let t = &self.config.timing;
        let period = self.rng.range_u32(t.combo_target_min_ms, t.combo_target_max_ms);
        self.scheduler.arm(TimerId::ComboTarget, period);
    }

    fn end_game(&mut self) {
        self.game_over = true;
        self.scheduler.cancel_all();
        self.animation = Animation::Idle;
        self.drop_in_progress = false;
        self.session.end();
        self.events.push(GameEvent::GameOver);
        self.events.push(GameEvent::Sound(SoundCue::GameOver));
        info!("[Game] game over with {} points", self.score);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let level = self.session.level();
        GameSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            cells: GameSnapshot::board_cells(&self.board),
            active: self.pieces.active().map(ActiveSnapshot::from),
            upcoming: self.next_piece(),
            score: self.score,
            target_score: level.target_score,
            level: self.session.level_index(),
            level_name: level.name.clone(),
            pairing_threshold: level.pairing_threshold,
            combo: self.combo.count(),
            combo_target: self.combo.target(),
            market_event: self.event,
            market: self
                .market
                .values()
                .iter()
                .map(|v| MarketRow {
                    kind: v.kind,
                    symbol: v.symbol.clone(),
                    price: v.price,
                    volatility_up: v.volatility_up,
                    color: v.color,
                })
                .collect(),
            paused: self.paused,
            game_over: self.game_over,
            fast_drop: self.fast_drop,
            animating: !self.animation.is_idle(),
            victory: matches!(
                self.animation,
                Animation::Animating {
                    on_complete: Continuation::AdvanceLevel,
                    ..
                }
            ),
            rounds_until_officer: self.pieces.rounds_until_officer(),
            episode_id: self.episode_id,
            seed: self.config.seed,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Block;

    fn run_until(game: &mut Game, max_ms: u32, mut done: impl FnMut(&Game) -> bool) -> bool {
        let mut t = 0;
        while t < max_ms {
            game.tick(TICK_MS);
            t += TICK_MS;
            if done(game) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_new_game_is_idle() {
        let mut game = Game::new(12345);
        assert!(!game.started());
        assert!(game.active_piece().is_none());
        assert!(!game.tick(1000));
        assert!(!game.apply_action(GameAction::MoveLeft));
    }

    #[test]
    fn test_start_spawns_and_arms_timers() {
        let mut game = Game::new(12345);
        game.start();
        assert!(game.active_piece().is_some());
        assert!(game.next_piece().is_some());
        for id in [TimerId::Gravity, TimerId::Market, TimerId::MarketEvent, TimerId::ComboTarget] {
            assert!(game.scheduler.is_armed(id), "{:?} not armed", id);
        }
        assert!(game.combo().target().is_some());
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::LevelChanged(0)));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_restart_increments_episode_id() {
        let mut game = Game::new(12345);
        game.start();
        assert_eq!(game.episode_id(), 0);
        assert!(game.apply_action(GameAction::Restart));
        assert_eq!(game.episode_id(), 1);
        assert!(game.started());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut game = Game::new(7);
        game.start();
        let before = game.active_piece().cloned();
        assert!(game.apply_action(GameAction::Pause));
        assert!(!game.tick(5000));
        assert_eq!(game.active_piece().cloned(), before);
        assert!(!game.apply_action(GameAction::MoveLeft));
        game.apply_action(GameAction::Pause);
        assert!(game.tick(TICK_MS));
    }

    #[test]
    fn test_fast_drop_rearms_gravity() {
        let mut game = Game::new(7);
        game.start();
        assert_eq!(game.scheduler.period(TimerId::Gravity), Some(500));
        assert!(game.apply_action(GameAction::FastDropStart));
        assert!(!game.apply_action(GameAction::FastDropStart));
        assert_eq!(game.scheduler.period(TimerId::Gravity), Some(50));
        game.apply_action(GameAction::FastDropEnd);
        assert_eq!(game.scheduler.period(TimerId::Gravity), Some(500));
    }

    #[test]
    fn test_fast_drop_late_in_interval_moves_one_row_per_step() {
        let mut game = Game::new(7);
        game.start();
        for _ in 0..30 {
            game.tick(TICK_MS);
        }
        let pivot_y = |g: &Game| g.active_piece().and_then(|p| p.pivot()).map(|p| p.y);
        let mut last = pivot_y(&game);
        assert!(game.apply_action(GameAction::FastDropStart));
        for _ in 0..10 {
            game.tick(TICK_MS);
            let now = pivot_y(&game);
            if let (Some(a), Some(b)) = (last, now) {
                assert!(a - b <= 1, "piece fell {} rows in one step", a - b);
            }
            last = now;
        }
    }

    #[test]
    fn test_market_event_draw_is_not_alternating() {
        let mut game = Game::new(7);
        game.start();
        let mut draws = Vec::new();
        for _ in 0..200 {
            game.on_market_event();
            draws.push(game.market_event());
        }
        let bull = draws.iter().filter(|e| **e == MarketEvent::BullRun).count();
        assert!((60..=140).contains(&bull), "bull runs = {}", bull);
        assert!(draws.windows(2).any(|w| w[0] == w[1]));
    }

    #[test]
    fn test_market_event_changes_fall_interval() {
        let mut game = Game::new(7);
        game.start();
        game.set_market_event(MarketEvent::CryptoCrash);
        assert_eq!(game.fall_interval_ms(), 200);
        game.apply_action(GameAction::FastDropStart);
        assert_eq!(game.fall_interval_ms(), 50);
    }

    #[test]
    fn test_first_piece_merges_into_bomb() {
        let mut game = Game::new(3);
        game.start();
        game.apply_action(GameAction::FastDropStart);
        let formed = run_until(&mut game, 3000, |g| {
            g.board()
                .blocks()
                .any(|(_, b)| b.flags.contains(BlockFlags::BOMB))
        });
        assert!(formed);
        assert!(game.score() > 0);
        assert!(game
            .board()
            .blocks()
            .all(|(_, b)| b.flags.contains(BlockFlags::CANNOT_BLOW_UP_YET)));
    }

    #[test]
    fn test_lock_near_top_ends_game() {
        let mut game = Game::new(11);
        game.start();
        let (w, h) = (game.board().width(), game.board().height());
        for y in 0..h - 2 {
            for x in 0..w {
                let id = game.board_mut().alloc_id();
                game.board_mut()
                    .set(x, y, Some(Block::new(id, None, BlockFlags::OFFICER)));
            }
        }
        game.apply_action(GameAction::FastDropStart);
        assert!(run_until(&mut game, 5000, |g| g.game_over()));
        assert!(TimerId::ALL.iter().all(|id| !game.scheduler.is_armed(*id)));
        assert!(game.drain_events().contains(&GameEvent::GameOver));
        assert!(!game.tick(1000));
        assert!(game.apply_action(GameAction::Restart));
        assert!(!game.game_over());
    }

    #[test]
    fn test_clear_officers_resets_combo() {
        let mut game = Game::new(5);
        game.start();
        game.combo.increment();
        for x in 0..game.board().width() {
            let id = game.board_mut().alloc_id();
            game.board_mut()
                .set(x, 0, Some(Block::new(id, None, BlockFlags::OFFICER)));
        }
        assert!(game.apply_action(GameAction::ClearOfficers));
        assert_eq!(game.combo().count(), 0);
        assert_eq!(game.board().block_count(), 0);
        assert!(game.drop_in_progress());
        assert!(!game.apply_action(GameAction::ClearOfficers));

        assert!(run_until(&mut game, 1000, |g| !g.drop_in_progress()));
        assert!(game.active_piece().is_some());
    }
}
