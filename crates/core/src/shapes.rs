//! Shape catalog - tetromino offsets relative to a pivot block
//!
//! Offsets are `(dx, dy)` in grid space with `y` growing upward. The first
//! offset of every shape is the pivot used for rotation.

use serde::{Deserialize, Serialize};

/// The seven tetromino shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const I_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 0), (0, 1), (0, 2)];
const O_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];
const T_OFFSETS: [(i32, i32); 4] = [(0, 0), (-1, 0), (1, 0), (0, 1)];
const S_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (-1, 1)];
const Z_OFFSETS: [(i32, i32); 4] = [(0, 0), (-1, 0), (0, 1), (1, 1)];
const J_OFFSETS: [(i32, i32); 4] = [(0, 0), (-1, 0), (-1, 1), (1, 0)];
const L_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (-1, 0)];

impl ShapeKind {
    /// Every shape, in catalog order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    /// Leftmost and rightmost column offsets reached by any shape.
    pub fn horizontal_reach() -> (i32, i32) {
        Self::ALL
            .iter()
            .flat_map(|k| k.offsets().iter())
            .fold((0, 0), |(lo, hi), &(dx, _)| (lo.min(dx), hi.max(dx)))
    }

    /// Block offsets for this shape.
    pub fn offsets(&self) -> &'static [(i32, i32); 4] {
        match self {
            ShapeKind::I => &I_OFFSETS,
            ShapeKind::O => &O_OFFSETS,
            ShapeKind::T => &T_OFFSETS,
            ShapeKind::S => &S_OFFSETS,
            ShapeKind::Z => &Z_OFFSETS,
            ShapeKind::J => &J_OFFSETS,
            ShapeKind::L => &L_OFFSETS,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            ShapeKind::I => "I",
            ShapeKind::O => "O",
            ShapeKind::T => "T",
            ShapeKind::S => "S",
            ShapeKind::Z => "Z",
            ShapeKind::J => "J",
            ShapeKind::L => "L",
        }
    }
}

/// What a piece is made of: a tetromino or a full-width officer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceShape {
    Tetromino(ShapeKind),
    Officer,
}

impl PieceShape {
    /// Offsets relative to the pivot. Officer rows span the full board width
    /// with the pivot at column 0.
    pub fn offsets(&self, board_width: i32) -> Vec<(i32, i32)> {
        match self {
            PieceShape::Tetromino(kind) => kind.offsets().to_vec(),
            PieceShape::Officer => (0..board_width).map(|dx| (dx, 0)).collect(),
        }
    }

    pub fn can_rotate(&self) -> bool {
        matches!(self, PieceShape::Tetromino(_))
    }
}
