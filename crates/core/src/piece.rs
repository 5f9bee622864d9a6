//! Piece controller - the falling piece and its fall state machine
//!
//! | State   | Entered by            | Left by                      |
//! |---------|-----------------------|------------------------------|
//! | Empty   | lock, level clear     | [`PieceController::spawn`]   |
//! | Falling | spawn                 | a gravity step that collides |
//!
//! The active piece is not part of the board until it locks. Moves and
//! rotations are all-or-nothing: every block is checked before any moves.
//! Pieces spawn with their pivot above the visible rows; cells above the top
//! row are free.

use breakout_types::{BlockFlags, CurrencyKind, GridPos};

use crate::board::{Block, BlockId, Board};
use crate::rng::SimpleRng;
use crate::shapes::{PieceShape, ShapeKind};

/// One block of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceBlock {
    pub id: BlockId,
    pub pos: GridPos,
    pub currency: Option<CurrencyKind>,
    pub flags: BlockFlags,
}

impl PieceBlock {
    fn to_block(self) -> Block {
        Block::new(self.id, self.currency, self.flags)
    }
}

/// The falling piece. `blocks[0]` is the rotation pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub shape: PieceShape,
    pub blocks: Vec<PieceBlock>,
}

impl ActivePiece {
    pub fn pivot(&self) -> Option<GridPos> {
        self.blocks.first().map(|b| b.pos)
    }

    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.blocks.iter().map(|b| b.pos)
    }

    pub fn is_officer(&self) -> bool {
        self.shape == PieceShape::Officer
    }
}

/// A piece that has been chosen but not placed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTemplate {
    pub shape: PieceShape,
    /// One entry per block offset. `None` for officer blocks.
    pub currencies: Vec<Option<CurrencyKind>>,
}

impl PieceTemplate {
    /// Random shape with an independently random currency per block.
    pub fn random(rng: &mut SimpleRng, kinds: &[CurrencyKind]) -> Self {
        let kind = rng.pick(&ShapeKind::ALL).unwrap_or(ShapeKind::O);
        let currencies = kind.offsets().iter().map(|_| rng.pick(kinds)).collect();
        Self {
            shape: PieceShape::Tetromino(kind),
            currencies,
        }
    }

    /// Every block the same currency.
    pub fn uniform(kind: ShapeKind, currency: CurrencyKind) -> Self {
        Self {
            shape: PieceShape::Tetromino(kind),
            currencies: vec![Some(currency); kind.offsets().len()],
        }
    }

    pub fn officer(width: i32) -> Self {
        Self {
            shape: PieceShape::Officer,
            currencies: vec![None; width.max(0) as usize],
        }
    }
}

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// No active piece.
    Idle,
    Moved,
    /// The piece was written into the board.
    Locked { game_over: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceController {
    active: Option<ActivePiece>,
    next: Option<PieceTemplate>,
    spawn_column: i32,
    rounds_before_sec_spawn: u32,
    rounds_until_officer: u32,
    officer_due: bool,
}

impl PieceController {
    pub fn new(spawn_column: i32, rounds_before_sec_spawn: u32) -> Self {
        Self {
            active: None,
            next: None,
            spawn_column,
            rounds_before_sec_spawn,
            rounds_until_officer: rounds_before_sec_spawn,
            officer_due: false,
        }
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn next(&self) -> Option<&PieceTemplate> {
        self.next.as_ref()
    }

    pub fn officer_due(&self) -> bool {
        self.officer_due
    }

    pub fn rounds_until_officer(&self) -> u32 {
        self.rounds_until_officer
    }

    /// The piece the next spawn will produce: the officer row when one is due,
    /// otherwise the queued preview.
    pub fn upcoming(&self, board_width: i32) -> Option<PieceTemplate> {
        if self.officer_due {
            Some(PieceTemplate::officer(board_width))
        } else {
            self.next.clone()
        }
    }

    /// Spawn the next piece.
    ///
    /// The very first piece of a session is a random shape made entirely of the
    /// first listed currency. An officer row replaces the tetromino when due and
    /// leaves the preview untouched.
    pub fn spawn(&mut self, board: &mut Board, rng: &mut SimpleRng, kinds: &[CurrencyKind]) -> &ActivePiece {
        let template = if self.officer_due {
            self.officer_due = false;
            PieceTemplate::officer(board.width())
        } else {
            let current = match self.next.take() {
                Some(t) => t,
                None => {
                    let shape = rng.pick(&ShapeKind::ALL).unwrap_or(ShapeKind::O);
                    let first = kinds.first().copied().unwrap_or(CurrencyKind::Bitcoin);
                    PieceTemplate::uniform(shape, first)
                }
            };
            self.next = Some(PieceTemplate::random(rng, kinds));
            current
        };
        self.spawn_template(board, &template)
    }

    /// Place a specific piece at the spawn point, replacing any active piece.
    pub fn spawn_template(&mut self, board: &mut Board, template: &PieceTemplate) -> &ActivePiece {
        let pivot = match template.shape {
            PieceShape::Officer => GridPos::new(0, board.height()),
            PieceShape::Tetromino(_) => GridPos::new(self.spawn_column, board.height()),
        };
        self.spawn_at(board, template, pivot)
    }

    /// Place a specific piece with its pivot at `pivot`.
    pub fn spawn_at(&mut self, board: &mut Board, template: &PieceTemplate, pivot: GridPos) -> &ActivePiece {
        let flags = match template.shape {
            PieceShape::Officer => BlockFlags::OFFICER,
            PieceShape::Tetromino(_) => BlockFlags::TETRIS,
        };
        let blocks = template
            .shape
            .offsets(board.width())
            .into_iter()
            .zip(template.currencies.iter())
            .map(|((dx, dy), currency)| PieceBlock {
                id: board.alloc_id(),
                pos: pivot.offset(dx, dy),
                currency: *currency,
                flags,
            })
            .collect();
        self.active.insert(ActivePiece {
            shape: template.shape,
            blocks,
        })
    }

    /// Shift the piece sideways. All-or-nothing.
    pub fn try_translate(&mut self, board: &Board, dx: i32) -> bool {
        self.try_move(board, dx, 0)
    }

    fn try_move(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let fits = piece
            .blocks
            .iter()
            .all(|b| board.is_free_for_piece(b.pos.x + dx, b.pos.y + dy));
        if !fits {
            return false;
        }
        for b in &mut piece.blocks {
            b.pos = b.pos.offset(dx, dy);
        }
        true
    }

    /// Rotate 90 degrees clockwise about the first block, `(dx, dy) -> (-dy, dx)`.
    ///
    /// One attempt with the natural pivot; there are no wall kicks. Officer rows
    /// never rotate.
    pub fn try_rotate(&mut self, board: &Board) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if !piece.shape.can_rotate() {
            return false;
        }
        let Some(pivot) = piece.pivot() else {
            return false;
        };

        let rotated: Vec<GridPos> = piece
            .blocks
            .iter()
            .map(|b| {
                let dx = b.pos.x - pivot.x;
                let dy = b.pos.y - pivot.y;
                GridPos::new(pivot.x - dy, pivot.y + dx)
            })
            .collect();
        if !rotated.iter().all(|p| board.is_free_for_piece(p.x, p.y)) {
            return false;
        }
        for (b, p) in piece.blocks.iter_mut().zip(rotated) {
            b.pos = p;
        }
        true
    }

    /// Move the piece down one row, or lock it where it is.
    ///
    /// Locking writes every block into the board and counts down to the next
    /// officer row. A block locked at `y >= height - 1` ends the game.
    pub fn gravity_step(&mut self, board: &mut Board) -> StepResult {
        if self.active.is_none() {
            return StepResult::Idle;
        }
        if self.try_move(board, 0, -1) {
            return StepResult::Moved;
        }

        let Some(piece) = self.active.take() else {
            return StepResult::Idle;
        };
        let mut game_over = false;
        for b in &piece.blocks {
            board.set(b.pos.x, b.pos.y, Some(b.to_block()));
            if b.pos.y >= board.height() - 1 {
                game_over = true;
            }
        }

        self.rounds_until_officer = self.rounds_until_officer.saturating_sub(1);
        if self.rounds_until_officer == 0 {
            self.officer_due = true;
            self.rounds_until_officer = self.rounds_before_sec_spawn;
        }
        StepResult::Locked { game_over }
    }

    /// Drop the active and queued pieces. Used when a level is cleared.
    pub fn clear(&mut self) {
        self.active = None;
        self.next = None;
    }

    /// Queue a random preview if none is held, so the next spawn skips the
    /// first-of-session rule.
    pub fn refill(&mut self, rng: &mut SimpleRng, kinds: &[CurrencyKind]) {
        if self.next.is_none() {
            self.next = Some(PieceTemplate::random(rng, kinds));
        }
    }

    /// Change how many locks separate officer rows and restart the countdown.
    pub fn set_rounds_before_sec_spawn(&mut self, rounds: u32) {
        self.rounds_before_sec_spawn = rounds.max(1);
        self.reset_rounds();
    }

    /// Restart the officer countdown.
    pub fn reset_rounds(&mut self) {
        self.rounds_until_officer = self.rounds_before_sec_spawn;
        self.officer_due = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [CurrencyKind; 2] = [CurrencyKind::Bitcoin, CurrencyKind::Tether];

    fn drop_to_lock(ctl: &mut PieceController, board: &mut Board) -> StepResult {
        loop {
            match ctl.gravity_step(board) {
                StepResult::Moved => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn test_first_piece_uses_first_currency() {
        let mut board = Board::default();
        let mut ctl = PieceController::new(8, 5);
        let mut rng = SimpleRng::new(9);
        let piece = ctl.spawn(&mut board, &mut rng, &KINDS);
        assert_eq!(piece.blocks.len(), 4);
        assert!(piece
            .blocks
            .iter()
            .all(|b| b.currency == Some(CurrencyKind::Bitcoin) && b.flags == BlockFlags::TETRIS));
        assert_eq!(piece.pivot(), Some(GridPos::new(8, 20)));
        assert!(ctl.next().is_some());
    }

    #[test]
    fn test_translate_is_blocked_by_walls() {
        let mut board = Board::new(6, 10);
        let mut ctl = PieceController::new(0, 5);
        ctl.spawn_at(
            &mut board,
            &PieceTemplate::uniform(ShapeKind::O, CurrencyKind::Xrp),
            GridPos::new(0, 3),
        );
        assert!(!ctl.try_translate(&board, -1));
        for _ in 0..4 {
            assert!(ctl.try_translate(&board, 1));
        }
        assert!(!ctl.try_translate(&board, 1));
        assert_eq!(ctl.active().and_then(|p| p.pivot()), Some(GridPos::new(4, 3)));
    }

    #[test]
    fn test_rotation_about_pivot() {
        let mut board = Board::new(10, 10);
        let mut ctl = PieceController::new(0, 5);
        ctl.spawn_at(
            &mut board,
            &PieceTemplate::uniform(ShapeKind::T, CurrencyKind::Xrp),
            GridPos::new(4, 4),
        );
        assert!(ctl.try_rotate(&board));
        let cells: Vec<GridPos> = ctl.active().map(|p| p.cells().collect()).unwrap_or_default();
        assert_eq!(
            cells,
            vec![
                GridPos::new(4, 4),
                GridPos::new(4, 3),
                GridPos::new(4, 5),
                GridPos::new(3, 4),
            ]
        );
    }

    #[test]
    fn test_rotation_rejected_when_blocked() {
        let mut board = Board::new(10, 10);
        let id = board.alloc_id();
        board.set(4, 3, Some(Block::new(id, Some(CurrencyKind::Usdc), BlockFlags::TETRIS)));
        let mut ctl = PieceController::new(0, 5);
        ctl.spawn_at(
            &mut board,
            &PieceTemplate::uniform(ShapeKind::T, CurrencyKind::Xrp),
            GridPos::new(4, 4),
        );
        let before = ctl.active().cloned();
        assert!(!ctl.try_rotate(&board));
        assert_eq!(ctl.active().cloned(), before);
    }

    #[test]
    fn test_officer_rows_do_not_rotate() {
        let mut board = Board::new(8, 10);
        let mut ctl = PieceController::new(0, 5);
        ctl.spawn_template(&mut board, &PieceTemplate::officer(8));
        assert!(ctl.active().is_some_and(|p| p.is_officer() && p.blocks.len() == 8));
        assert!(!ctl.try_rotate(&board));
    }

    #[test]
    fn test_lock_writes_blocks_and_counts_rounds() {
        let mut board = Board::new(8, 10);
        let mut ctl = PieceController::new(3, 2);
        let mut rng = SimpleRng::new(1);

        ctl.spawn(&mut board, &mut rng, &KINDS);
        assert_eq!(drop_to_lock(&mut ctl, &mut board), StepResult::Locked { game_over: false });
        assert_eq!(board.block_count(), 4);
        assert!(!ctl.officer_due());

        ctl.spawn(&mut board, &mut rng, &KINDS);
        drop_to_lock(&mut ctl, &mut board);
        assert!(ctl.officer_due());
        assert_eq!(ctl.upcoming(8).map(|t| t.shape), Some(PieceShape::Officer));

        let queued = ctl.next().cloned();
        let piece = ctl.spawn(&mut board, &mut rng, &KINDS);
        assert!(piece.is_officer());
        assert_eq!(ctl.next().cloned(), queued);
        assert!(!ctl.officer_due());
        assert_eq!(ctl.rounds_until_officer(), 2);
    }

    #[test]
    fn test_lock_at_top_is_game_over() {
        let mut board = Board::new(4, 4);
        for y in 0..3 {
            let id = board.alloc_id();
            board.set(1, y, Some(Block::new(id, Some(CurrencyKind::Xrp), BlockFlags::TETRIS)));
        }
        let mut ctl = PieceController::new(1, 5);
        ctl.spawn_at(
            &mut board,
            &PieceTemplate::uniform(ShapeKind::O, CurrencyKind::Xrp),
            GridPos::new(1, 4),
        );
        assert_eq!(drop_to_lock(&mut ctl, &mut board), StepResult::Locked { game_over: true });
        assert_eq!(ctl.gravity_step(&mut board), StepResult::Idle);
    }
}
