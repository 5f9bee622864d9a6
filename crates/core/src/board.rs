//! Board module - the authoritative cell grid
//!
//! The board is a `width x height` grid stored as a flat row-major vector.
//! Coordinates: `(x, y)` where `x` runs left to right and `y = 0` is the floor.
//! Every accessor is bounds-checked; out-of-range coordinates read as `None`
//! and writes to them are ignored.
//!
//! A bomb block covers a 2x2 footprint, so one [`Block`] (one [`BlockId`]) can
//! occupy several cells. [`Board::destroy_at`] removes the whole footprint.

use breakout_types::{BlockFlags, CurrencyKind, GridPos};

/// Stable identity of a placed block. Hosts map ids to their visuals.
pub type BlockId = u32;

/// One placed block unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    /// `None` for officer blocks, which carry no market value.
    pub currency: Option<CurrencyKind>,
    pub flags: BlockFlags,
}

impl Block {
    pub fn new(id: BlockId, currency: Option<CurrencyKind>, flags: BlockFlags) -> Self {
        Self {
            id,
            currency,
            flags,
        }
    }

    /// Ordinary tetromino block that can take part in matches.
    pub fn is_matchable(&self) -> bool {
        self.currency.is_some()
            && self.flags.contains(BlockFlags::TETRIS)
            && !self.flags.intersects(BlockFlags::SUPER | BlockFlags::GLOWING)
    }

    /// Officer and bomb blocks do not fall under the gravity resolver.
    pub fn is_anchored(&self) -> bool {
        !self.flags.contains(BlockFlags::TETRIS)
    }
}

/// A cell on the board: empty or occupied by a block.
pub type Cell = Option<Block>;

/// The game board using flat vector storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: i32,
    height: i32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    next_id: BlockId,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: u8, height: u8) -> Self {
        let width = width as i32;
        let height = height as i32;
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
            next_id: 1,
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Hand out a fresh block id. Ids are never reused within a board.
    pub fn alloc_id(&mut self) -> BlockId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Get cell at position (x, y).
    /// Returns None if out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Block at (x, y), if any.
    pub fn block(&self, x: i32, y: i32) -> Option<Block> {
        self.get(x, y).flatten()
    }

    pub fn block_at(&self, pos: GridPos) -> Option<Block> {
        self.block(pos.x, pos.y)
    }

    pub fn block_mut(&mut self, x: i32, y: i32) -> Option<&mut Block> {
        let idx = self.index(x, y)?;
        self.cells[idx].as_mut()
    }

    /// Set cell at position (x, y).
    /// Returns false if out of bounds; the board is left untouched.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Empty a single cell and return what was there.
    pub fn take(&mut self, x: i32, y: i32) -> Cell {
        let idx = self.index(x, y)?;
        self.cells[idx].take()
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Free for a falling piece: inside the side walls, at or above the floor,
    /// and not occupied. Cells above the top row are always free.
    pub fn is_free_for_piece(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 {
            return false;
        }
        !self.is_occupied(x, y)
    }

    /// A row clears only when every cell holds a tetris block.
    /// Officer and bomb cells keep a row from clearing.
    pub fn is_row_clearable(&self, y: i32) -> bool {
        if y < 0 || y >= self.height {
            return false;
        }
        let width = self.width as usize;
        let start = y as usize * width;
        self.cells[start..start + width]
            .iter()
            .all(|cell| matches!(cell, Some(b) if b.flags.contains(BlockFlags::TETRIS)))
    }

    /// Remove every block in row `y`, shift every row above down by one and
    /// empty the top row. Returns the removed blocks.
    pub fn clear_row_and_shift(&mut self, y: i32) -> Vec<Block> {
        if y < 0 || y >= self.height {
            return Vec::new();
        }
        let width = self.width as usize;
        let row = y as usize;
        let height = self.height as usize;

        let removed: Vec<Block> = self.cells[row * width..(row + 1) * width]
            .iter()
            .flatten()
            .copied()
            .collect();

        for r in row..height - 1 {
            let src = (r + 1) * width;
            self.cells.copy_within(src..src + width, r * width);
        }
        let top = (height - 1) * width;
        self.cells[top..top + width].fill(None);

        removed
    }

    /// Remove every cell occupied by the block with this id.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let mut removed = None;
        for cell in self.cells.iter_mut() {
            if matches!(cell, Some(b) if b.id == id) {
                removed = cell.take();
            }
        }
        removed
    }

    /// Destroy whatever occupies (x, y), including the rest of a multi-cell block.
    pub fn destroy_at(&mut self, x: i32, y: i32) -> Option<Block> {
        let block = self.block(x, y)?;
        if block.flags.contains(BlockFlags::BOMB) {
            self.remove_block(block.id)
        } else {
            self.take(x, y)
        }
    }

    /// Clear a flag on every placed block.
    pub fn clear_flag(&mut self, flag: BlockFlags) {
        for block in self.cells.iter_mut().flatten() {
            block.flags.remove(flag);
        }
    }

    /// Iterate occupied cells bottom row first, left to right.
    pub fn blocks(&self) -> impl Iterator<Item = (GridPos, Block)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|b| (GridPos::new(i as i32 % width, i as i32 / width), b))
        })
    }

    /// First cell (bottom-left scan) holding this block.
    pub fn position_of(&self, id: BlockId) -> Option<GridPos> {
        self.blocks().find(|(_, b)| b.id == id).map(|(p, _)| p)
    }

    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Empty the whole board. Id allocation keeps counting.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(
            breakout_types::DEFAULT_BOARD_WIDTH,
            breakout_types::DEFAULT_BOARD_HEIGHT,
        )
    }
}
