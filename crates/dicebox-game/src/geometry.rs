//! Line and square addressing for an N×N board.
//!
//! Nothing here holds state. The grid layout is:
//!
//! ```text
//!   h[0][0]   h[0][1]
//!  +-------+-------+
//!  |       |       |
//!  v[0][0] v[0][1] v[0][2]
//!  |       |       |
//!  +-------+-------+
//!   h[1][0]   h[1][1]
//! ```
//!
//! Horizontal lines form an (N+1) × N grid, vertical lines an N × (N+1)
//! grid. Square `(r, c)` is bounded by `h[r][c]` (top), `h[r+1][c]`
//! (bottom), `v[r][c]` (left) and `v[r][c+1]` (right).

use serde::{Deserialize, Serialize};

use crate::GameError;

/// Side length of the board, in squares. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BoardSize(usize);

impl BoardSize {
    /// Validates a raw board size.
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size == 0 {
            return Err(GameError::InvalidBoardSize(size));
        }
        Ok(Self(size))
    }

    /// Returns the raw side length.
    pub fn get(self) -> usize {
        self.0
    }

    /// Total number of squares (N²).
    pub fn square_count(self) -> usize {
        self.0 * self.0
    }

    /// Number of horizontal line slots, (N+1)·N.
    pub fn horizontal_slots(self) -> usize {
        (self.0 + 1) * self.0
    }

    /// Number of vertical line slots, N·(N+1).
    pub fn vertical_slots(self) -> usize {
        self.0 * (self.0 + 1)
    }
}

impl TryFrom<usize> for BoardSize {
    type Error = GameError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<BoardSize> for usize {
    fn from(size: BoardSize) -> Self {
        size.0
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0}x{0}", self.0)
    }
}

/// Orientation of a line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    Horizontal,
    Vertical,
}

/// A single unit edge on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub kind: LineKind,
    pub row: usize,
    pub col: usize,
}

impl Line {
    pub fn horizontal(row: usize, col: usize) -> Self {
        Self {
            kind: LineKind::Horizontal,
            row,
            col,
        }
    }

    pub fn vertical(row: usize, col: usize) -> Self {
        Self {
            kind: LineKind::Vertical,
            row,
            col,
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.kind {
            LineKind::Horizontal => 'h',
            LineKind::Vertical => 'v',
        };
        write!(f, "{tag}({},{})", self.row, self.col)
    }
}

/// A unit cell, addressed by its row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

/// Returns `true` if `line` addresses an existing slot on a board of `size`.
pub fn line_in_bounds(size: BoardSize, line: Line) -> bool {
    let n = size.get();
    match line.kind {
        LineKind::Horizontal => line.row <= n && line.col < n,
        LineKind::Vertical => line.row < n && line.col <= n,
    }
}

/// The squares that drawing `line` can possibly close: at most two.
///
/// `line` must be in bounds.
pub fn candidate_squares(
    size: BoardSize,
    line: Line,
) -> impl Iterator<Item = Square> {
    let n = size.get();
    let Line { kind, row, col } = line;
    let pair = match kind {
        LineKind::Horizontal => [
            (row < n).then_some(Square { row, col }),
            (row > 0).then(|| Square { row: row - 1, col }),
        ],
        LineKind::Vertical => [
            (col < n).then_some(Square { row, col }),
            (col > 0).then(|| Square { row, col: col - 1 }),
        ],
    };
    pair.into_iter().flatten()
}

/// Returns `true` if all four edges of `square` are drawn.
pub fn is_square_closed(
    horizontal: &[Vec<bool>],
    vertical: &[Vec<bool>],
    square: Square,
) -> bool {
    let Square { row, col } = square;
    horizontal[row][col]
        && horizontal[row + 1][col]
        && vertical[row][col]
        && vertical[row][col + 1]
}
