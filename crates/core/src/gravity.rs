//! Gravity resolver - settles blocks above gaps after removals
//!
//! Each column is scanned from the floor up, counting empty cells. A tetris
//! block drops by the running count. Anchored blocks (officer rows, bombs) do
//! not move and reset the count, so blocks above them come to rest on them.
//! Columns are independent.
//!
//! Applying a plan leaves a board on which [`plan_drops`] is empty, so the
//! resolver is idempotent.

use breakout_types::GridPos;

use crate::board::{Board, BlockId};

/// One scheduled block descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDrop {
    pub id: BlockId,
    pub from: GridPos,
    pub to: GridPos,
}

/// Compute per-column drop distances. Moves are ordered bottom-up per column.
pub fn plan_drops(board: &Board) -> Vec<BlockDrop> {
    let mut drops = Vec::new();
    for x in 0..board.width() {
        let mut gap = 0;
        for y in 0..board.height() {
            match board.block(x, y) {
                None => gap += 1,
                Some(b) if b.is_anchored() => gap = 0,
                Some(b) => {
                    if gap > 0 {
                        drops.push(BlockDrop {
                            id: b.id,
                            from: GridPos::new(x, y),
                            to: GridPos::new(x, y - gap),
                        });
                    }
                }
            }
        }
    }
    drops
}

/// Apply a plan produced by [`plan_drops`] on the same board.
pub fn apply_drops(board: &mut Board, drops: &[BlockDrop]) {
    for d in drops {
        let cell = board.take(d.from.x, d.from.y);
        board.set(d.to.x, d.to.y, cell);
    }
}

/// Plan and apply in one go. Returns the moves made.
pub fn settle(board: &mut Board) -> Vec<BlockDrop> {
    let drops = plan_drops(board);
    apply_drops(board, &drops);
    drops
}
