//! Match engine - line clears, detonations, formations and pair explosions
//!
//! After a piece locks the engine runs passes over the board until one finds
//! nothing to do. Each pass checks, in order:
//!
//! 1. Full rows (every cell a tetris block): scored, removed, rows above shift down.
//! 2. Armed super blocks clear the three rows around them; armed bombs blow up
//!    their 8-neighbourhood. "Armed" means the one-lock grace flag is gone.
//! 3. Four connected same-currency blocks start a bomb formation.
//! 4. Three connected same-currency blocks start a super block formation.
//! 5. Same-currency right/up neighbours explode as a pair.
//!
//! Steps 3-5 are gated by the level's pairing threshold. A formation does not
//! finish inside the pass: its members start glowing and the pass returns
//! [`PassOutcome::Forming`]; the caller completes it with
//! [`MatchEngine::complete_formation`] once the glow has played.
//!
//! Every pass that reports a change strictly reduces the number of blocks on
//! the board, so [`MatchEngine::settle`] terminates within `width * height`
//! passes.

use log::{debug, warn};

use breakout_types::{BlockFlags, CurrencyKind, GridPos, MarketEvent};

use crate::board::{Block, BlockId, Board};
use crate::combo::ComboState;
use crate::events::{GameEvent, SoundCue};
use crate::gravity;
use crate::market::Market;
use crate::scoring::{add_points, apply_event};

/// Offsets of the 8 cells around a block.
const NEIGHBOURS_8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Flood-fill visiting order.
const NEIGHBOURS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Extra cells a bomb claims beside its anchor.
const BOMB_FOOTPRINT: [(i32, i32); 3] = [(1, 0), (0, 1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormationKind {
    /// Three connected blocks merge into a block that clears three rows.
    Super,
    /// Four connected blocks merge into a 2x2 bomb.
    Bomb,
}

impl FormationKind {
    pub fn size(&self) -> usize {
        match self {
            FormationKind::Super => 3,
            FormationKind::Bomb => 4,
        }
    }

    pub fn enabled(&self, pairing_threshold: u8) -> bool {
        match self {
            FormationKind::Super => pairing_threshold <= 3,
            FormationKind::Bomb => pairing_threshold <= 4,
        }
    }
}

/// A group of blocks waiting to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formation {
    pub kind: FormationKind,
    pub currency: CurrencyKind,
    /// Where the merged block lands: the block the search started from.
    pub anchor: GridPos,
    pub members: Vec<(GridPos, BlockId)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Stable,
    Changed,
    Forming(Formation),
}

/// Summary of a synchronous [`MatchEngine::settle`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettleReport {
    pub passes: usize,
    pub formations: usize,
    pub settled: bool,
}

/// Mutable state the engine reads and updates while resolving a board.
pub struct MatchContext<'a> {
    pub market: &'a mut Market,
    pub combo: &'a mut ComboState,
    pub score: &'a mut u32,
    pub event: MarketEvent,
    pub pairing_threshold: u8,
    pub events: &'a mut Vec<GameEvent>,
    reported_score: u32,
    reported_combo: u8,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        market: &'a mut Market,
        combo: &'a mut ComboState,
        score: &'a mut u32,
        event: MarketEvent,
        pairing_threshold: u8,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        let reported_score = *score;
        let reported_combo = combo.count();
        Self {
            market,
            combo,
            score,
            event,
            pairing_threshold,
            events,
            reported_score,
            reported_combo,
        }
    }

    fn add_score(&mut self, points: u32) {
        *self.score = add_points(*self.score, points);
    }

    /// Record a destroyed block and score it if it carries a currency.
    fn destroyed(&mut self, block: Block, scored: bool) {
        self.events.push(GameEvent::BlockDestroyed { id: block.id });
        if scored {
            if let Some(kind) = block.currency {
                let value = self.market.scaled_value(kind, self.event);
                self.add_score(value);
            }
        }
    }

    fn color(&self, currency: Option<CurrencyKind>) -> [u8; 3] {
        currency
            .map(|k| self.market.color_of(k))
            .unwrap_or([255, 255, 255])
    }

    /// Emit score/combo notifications if either moved since the last flush.
    fn flush(&mut self) {
        if *self.score != self.reported_score {
            self.reported_score = *self.score;
            self.events.push(GameEvent::ScoreChanged(*self.score));
        }
        if self.combo.count() != self.reported_combo {
            self.reported_combo = self.combo.count();
            self.events.push(GameEvent::ComboChanged(self.combo.count()));
        }
    }
}

/// Connected same-currency component containing `start`.
///
/// Visits right, left, up, down, depth first. Super and glowing blocks are
/// excluded. The result starts with `start` and holds each cell once; the set
/// of cells is the same whichever member the search starts from.
pub fn find_component(board: &Board, start: GridPos) -> Vec<GridPos> {
    let Some(origin) = board.block_at(start) else {
        return Vec::new();
    };
    if !origin.is_matchable() {
        return Vec::new();
    }

    let width = board.width();
    let mut visited = vec![false; (board.width() * board.height()) as usize];
    let mut out = Vec::new();
    visit(board, start, origin.currency, width, &mut visited, &mut out);
    out
}

fn visit(
    board: &Board,
    pos: GridPos,
    currency: Option<CurrencyKind>,
    width: i32,
    visited: &mut [bool],
    out: &mut Vec<GridPos>,
) {
    if !board.in_bounds(pos.x, pos.y) {
        return;
    }
    let idx = (pos.y * width + pos.x) as usize;
    if visited[idx] {
        return;
    }
    match board.block_at(pos) {
        Some(b) if b.is_matchable() && b.currency == currency => {}
        _ => return,
    }
    visited[idx] = true;
    out.push(pos);
    for (dx, dy) in NEIGHBOURS_4 {
        visit(board, pos.offset(dx, dy), currency, width, visited, out);
    }
}

/// Resolves matches on a board. Holds only tuning; all game state is passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEngine {
    glow_duration_ms: u32,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(breakout_types::GLOW_DURATION_MS)
    }
}

impl MatchEngine {
    pub fn new(glow_duration_ms: u32) -> Self {
        Self { glow_duration_ms }
    }

    /// One ordered pass over the board.
    pub fn run_pass(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> PassOutcome {
        let mut changed = self.clear_full_rows(board, ctx);
        changed |= self.detonate_armed(board, ctx);

        let outcome = if let Some(formation) = self.find_formation(board, ctx.pairing_threshold) {
            self.begin_formation(board, &formation, ctx);
            PassOutcome::Forming(formation)
        } else {
            if ctx.pairing_threshold <= 2 {
                changed |= self.explode_pairs(board, ctx);
            }
            if changed {
                PassOutcome::Changed
            } else {
                PassOutcome::Stable
            }
        };

        ctx.flush();
        outcome
    }

    /// Run passes, completing formations immediately and settling gravity after
    /// every change, until a pass finds nothing. Bounded by the board size.
    pub fn settle(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> SettleReport {
        let bound = (board.width() * board.height()) as usize + 1;
        let mut report = SettleReport::default();

        while report.passes < bound {
            report.passes += 1;
            match self.run_pass(board, ctx) {
                PassOutcome::Stable => {
                    report.settled = true;
                    return report;
                }
                PassOutcome::Changed => {
                    self.apply_gravity(board, ctx);
                }
                PassOutcome::Forming(formation) => {
                    report.formations += 1;
                    self.complete_formation(board, &formation, ctx);
                    self.apply_gravity(board, ctx);
                }
            }
        }

        warn!("[MatchEngine] board did not settle after {} passes", bound);
        report
    }

    /// Let blocks above gaps fall and report the moves.
    pub fn apply_gravity(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> usize {
        let drops = gravity::settle(board);
        for d in &drops {
            ctx.events.push(GameEvent::BlockMoved { id: d.id, to: d.to });
        }
        drops.len()
    }

    fn clear_full_rows(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> bool {
        let mut changed = false;
        let mut y = 0;
        while y < board.height() {
            if !board.is_row_clearable(y) {
                y += 1;
                continue;
            }

            let removed = board.clear_row_and_shift(y);
            let mut raw: u32 = 0;
            for b in &removed {
                if let Some(kind) = b.currency {
                    raw = raw.saturating_add(ctx.market.price_of(kind).unwrap_or(0));
                }
                ctx.destroyed(*b, false);
            }
            let points = apply_event(raw, ctx.event);
            ctx.add_score(points);

            let color = ctx.color(removed.first().and_then(|b| b.currency));
            ctx.events.push(GameEvent::RowCleared { row: y, color });
            ctx.events.push(GameEvent::Sound(SoundCue::RowClear));
            emit_positions_from(board, y, ctx.events);

            ctx.combo.increment();
            debug!("[MatchEngine] cleared row {} for {} points", y, points);
            changed = true;
            // the row above now sits at `y`; check it again
        }
        changed
    }

    fn detonate_armed(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> bool {
        let mut armed: Vec<(GridPos, Block)> = Vec::new();
        for (pos, b) in board.blocks() {
            if b.flags.contains(BlockFlags::CANNOT_BLOW_UP_YET) {
                continue;
            }
            let is_super = b.flags.contains(BlockFlags::SUPER | BlockFlags::CLEAR_THREE_ROWS);
            let is_bomb = b.flags.contains(BlockFlags::BOMB);
            if (is_super || is_bomb) && !armed.iter().any(|(_, a)| a.id == b.id) {
                armed.push((pos, b));
            }
        }

        let mut changed = false;
        for (pos, b) in armed {
            if board.block_at(pos).map(|c| c.id) != Some(b.id) {
                continue;
            }
            if b.flags.contains(BlockFlags::BOMB) {
                self.explode_bomb(board, pos, b, ctx);
            } else {
                self.clear_three_rows(board, pos, b, ctx);
            }
            changed = true;
        }
        changed
    }

    fn clear_three_rows(&self, board: &mut Board, pos: GridPos, block: Block, ctx: &mut MatchContext<'_>) {
        let color = ctx.color(block.currency);
        for y in (pos.y - 1)..=(pos.y + 1) {
            if y < 0 || y >= board.height() {
                continue;
            }
            for x in 0..board.width() {
                match board.block(x, y) {
                    Some(b) if !b.flags.contains(BlockFlags::OFFICER) => {
                        if let Some(removed) = board.destroy_at(x, y) {
                            ctx.destroyed(removed, true);
                        }
                    }
                    _ => {}
                }
            }
            ctx.events.push(GameEvent::RowCleared { row: y, color });
        }
        ctx.events.push(GameEvent::Explosion {
            pos,
            color1: color,
            color2: color,
        });
        ctx.events.push(GameEvent::Sound(SoundCue::LaserBurst));
        debug!("[MatchEngine] super block cleared rows around y={}", pos.y);
    }

    fn explode_bomb(&self, board: &mut Board, anchor: GridPos, bomb: Block, ctx: &mut MatchContext<'_>) {
        if let Some(removed) = board.remove_block(bomb.id) {
            ctx.destroyed(removed, true);
        }
        for (dx, dy) in NEIGHBOURS_8 {
            let p = anchor.offset(dx, dy);
            let Some(b) = board.block_at(p) else {
                continue;
            };
            if b.flags.intersects(BlockFlags::BOMB | BlockFlags::SUPER | BlockFlags::OFFICER) {
                continue;
            }
            if let Some(removed) = board.take(p.x, p.y) {
                ctx.destroyed(removed, false);
            }
        }
        let color = ctx.color(bomb.currency);
        ctx.events.push(GameEvent::Explosion {
            pos: anchor,
            color1: color,
            color2: color,
        });
        ctx.events.push(GameEvent::CameraShake);
        ctx.events.push(GameEvent::Sound(SoundCue::Explosion));
        debug!("[MatchEngine] bomb detonated at ({}, {})", anchor.x, anchor.y);
    }

    /// First formation on the board, bombs before supers.
    pub fn find_formation(&self, board: &Board, pairing_threshold: u8) -> Option<Formation> {
        for kind in [FormationKind::Bomb, FormationKind::Super] {
            if !kind.enabled(pairing_threshold) {
                continue;
            }
            let width = board.width();
            let mut tried = vec![false; (board.width() * board.height()) as usize];
            for (pos, b) in board.blocks() {
                let idx = (pos.y * width + pos.x) as usize;
                if tried[idx] || !b.is_matchable() {
                    continue;
                }
                let component = find_component(board, pos);
                for p in &component {
                    tried[(p.y * width + p.x) as usize] = true;
                }
                if component.len() < kind.size() {
                    continue;
                }
                let Some(currency) = b.currency else {
                    continue;
                };
                let members = component
                    .iter()
                    .take(kind.size())
                    .filter_map(|p| board.block_at(*p).map(|m| (*p, m.id)))
                    .collect();
                return Some(Formation {
                    kind,
                    currency,
                    anchor: pos,
                    members,
                });
            }
        }
        None
    }

    fn begin_formation(&self, board: &mut Board, formation: &Formation, ctx: &mut MatchContext<'_>) {
        for (pos, _) in &formation.members {
            if let Some(b) = board.block_mut(pos.x, pos.y) {
                b.flags.insert(BlockFlags::GLOWING);
            }
        }
        ctx.events.push(GameEvent::Glow {
            blocks: formation.members.iter().map(|(_, id)| *id).collect(),
            duration_ms: self.glow_duration_ms,
        });
        ctx.events.push(GameEvent::Sound(SoundCue::Glow));
        debug!(
            "[MatchEngine] {:?} formation of {} at ({}, {})",
            formation.kind,
            formation.currency.as_str(),
            formation.anchor.x,
            formation.anchor.y
        );
    }

    /// Merge a glowing formation into its super block or bomb.
    ///
    /// Members that are no longer where the formation found them are skipped.
    pub fn complete_formation(&self, board: &mut Board, formation: &Formation, ctx: &mut MatchContext<'_>) {
        for (pos, id) in &formation.members {
            if board.block_at(*pos).map(|b| b.id) == Some(*id) {
                if let Some(removed) = board.take(pos.x, pos.y) {
                    ctx.destroyed(removed, true);
                }
            }
        }

        let anchor = formation.anchor;
        let id = board.alloc_id();
        match formation.kind {
            FormationKind::Super => {
                let flags = BlockFlags::TETRIS
                    | BlockFlags::SUPER
                    | BlockFlags::CLEAR_THREE_ROWS
                    | BlockFlags::CANNOT_BLOW_UP_YET;
                let block = Block::new(id, Some(formation.currency), flags);
                board.set(anchor.x, anchor.y, Some(block));
                ctx.events.push(GameEvent::BlockSpawned {
                    id,
                    currency: block.currency,
                    flags,
                    pos: anchor,
                });
            }
            FormationKind::Bomb => {
                let flags = BlockFlags::BOMB | BlockFlags::CANNOT_BLOW_UP_YET;
                let block = Block::new(id, Some(formation.currency), flags);
                let mut footprint = vec![anchor];
                for (dx, dy) in BOMB_FOOTPRINT {
                    let p = anchor.offset(dx, dy);
                    if !board.in_bounds(p.x, p.y) {
                        continue;
                    }
                    if let Some(occupant) = board.block_at(p) {
                        if occupant.flags.contains(BlockFlags::OFFICER) {
                            continue;
                        }
                        if let Some(removed) = board.destroy_at(p.x, p.y) {
                            ctx.destroyed(removed, true);
                        }
                    }
                    footprint.push(p);
                }
                for p in &footprint {
                    board.set(p.x, p.y, Some(block));
                }
                ctx.events.push(GameEvent::BlockSpawned {
                    id,
                    currency: block.currency,
                    flags,
                    pos: anchor,
                });
                ctx.events.push(GameEvent::BlockScaled { id, factor: 2.0 });
            }
        }
        ctx.flush();
    }

    fn explode_pairs(&self, board: &mut Board, ctx: &mut MatchContext<'_>) -> bool {
        let candidates: Vec<GridPos> = board
            .blocks()
            .filter(|(_, b)| b.is_matchable())
            .map(|(p, _)| p)
            .collect();

        let mut changed = false;
        for pos in candidates {
            let Some(a) = board.block_at(pos) else {
                continue;
            };
            if !a.is_matchable() {
                continue;
            }
            for (dx, dy) in [(1, 0), (0, 1)] {
                let other = pos.offset(dx, dy);
                match board.block_at(other) {
                    Some(b) if b.is_matchable() && b.currency == a.currency => {
                        self.explode_pair(board, pos, other, ctx);
                        changed = true;
                        break;
                    }
                    _ => {}
                }
            }
        }
        changed
    }

    fn explode_pair(&self, board: &mut Board, a: GridPos, b: GridPos, ctx: &mut MatchContext<'_>) {
        let first = board.take(a.x, a.y);
        let second = board.take(b.x, b.y);
        let kind = first.and_then(|blk| blk.currency);
        for blk in [first, second].into_iter().flatten() {
            ctx.destroyed(blk, true);
        }

        let color1 = ctx.color(kind);
        let color2 = ctx.color(second.and_then(|blk| blk.currency));
        for (dx, dy) in NEIGHBOURS_8 {
            ctx.events.push(GameEvent::Explosion {
                pos: a.offset(dx, dy),
                color1,
                color2,
            });
        }
        ctx.events.push(GameEvent::Sound(SoundCue::Explosion));

        if let Some(kind) = kind {
            if kind.is_high_risk() {
                ctx.market.force_all_down();
            } else if kind.is_stablecoin() {
                ctx.market.force_all_up();
            }
            if ctx.combo.is_target(kind) {
                ctx.combo.increment();
            }
            debug!("[MatchEngine] {} pair exploded at ({}, {})", kind.as_str(), a.x, a.y);
        }
    }
}

/// Report the new position of every block at or above row `from`, one event per block.
fn emit_positions_from(board: &Board, from: i32, events: &mut Vec<GameEvent>) {
    let mut seen: Vec<BlockId> = Vec::new();
    for (pos, b) in board.blocks() {
        if pos.y < from || seen.contains(&b.id) {
            continue;
        }
        seen.push(b.id);
        events.push(GameEvent::BlockMoved { id: b.id, to: pos });
    }
}
