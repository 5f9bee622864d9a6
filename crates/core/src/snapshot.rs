use breakout_types::{BlockFlags, CurrencyKind, GridPos, MarketEvent};

use crate::board::Board;
use crate::piece::{ActivePiece, PieceTemplate};
use crate::shapes::PieceShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSnapshot {
    pub currency: Option<CurrencyKind>,
    pub flags: BlockFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSnapshot {
    pub shape: PieceShape,
    pub cells: Vec<(GridPos, CellSnapshot)>,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            shape: value.shape,
            cells: value
                .blocks
                .iter()
                .map(|b| {
                    (
                        b.pos,
                        CellSnapshot {
                            currency: b.currency,
                            flags: b.flags,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRow {
    pub kind: CurrencyKind,
    pub symbol: String,
    pub price: u32,
    pub volatility_up: bool,
    pub color: [u8; 3],
}

/// Plain-data view of a game for hosts.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major, `y = 0` first.
    pub cells: Vec<Option<CellSnapshot>>,
    pub active: Option<ActiveSnapshot>,
    pub upcoming: Option<PieceTemplate>,
    pub score: u32,
    pub target_score: u32,
    pub level: usize,
    pub level_name: String,
    pub pairing_threshold: u8,
    pub combo: u8,
    pub combo_target: Option<CurrencyKind>,
    pub market_event: MarketEvent,
    pub market: Vec<MarketRow>,
    pub paused: bool,
    pub game_over: bool,
    pub fast_drop: bool,
    pub animating: bool,
    /// The level-cleared sequence is playing.
    pub victory: bool,
    pub rounds_until_officer: u32,
    pub episode_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub(crate) fn board_cells(board: &Board) -> Vec<Option<CellSnapshot>> {
        board
            .cells()
            .iter()
            .map(|c| {
                c.map(|b| CellSnapshot {
                    currency: b.currency,
                    flags: b.flags,
                })
            })
            .collect()
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<CellSnapshot> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get((y * self.width + x) as usize)
            .copied()
            .flatten()
    }

    /// Active piece cell at (x, y), if the piece covers it.
    pub fn active_cell(&self, x: i32, y: i32) -> Option<CellSnapshot> {
        self.active
            .as_ref()?
            .cells
            .iter()
            .find(|(p, _)| p.x == x && p.y == y)
            .map(|(_, c)| *c)
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Block;

    #[test]
    fn test_board_cells_are_row_major_from_floor() {
        let mut board = Board::new(3, 2);
        let id = board.alloc_id();
        board.set(2, 1, Some(Block::new(id, Some(CurrencyKind::Xrp), BlockFlags::TETRIS)));
        let cells = GameSnapshot::board_cells(&board);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[5].and_then(|c| c.currency), Some(CurrencyKind::Xrp));
        assert!(cells[..5].iter().all(|c| c.is_none()));
    }
}
