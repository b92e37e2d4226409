//! Discrete positions and movement directions.
//!
//! Successor enumeration order is a normative part of the engine contract:
//! orthogonal moves are always generated `Up, Right, Down, Left`, and the
//! eight-direction order interleaves diagonals clockwise from `Up`. Paths
//! are reproducible only because this order never changes.

use serde::{Deserialize, Serialize};

/// A row/column cell coordinate. Identity is by value.
///
/// `Ord` follows `(row, col)` so position sets iterate in reading order,
/// which keeps derived artifacts deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbor one step in `direction`, or `None` if the step would
    /// leave the non-negative quadrant. Upper-bound checks belong to the
    /// grid, which knows its dimensions.
    #[must_use]
    pub fn step(&self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Self { row, col })
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Chebyshev distance to `other` (diagonal moves count as one step).
    #[must_use]
    pub fn chebyshev(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// True when `other` is exactly one orthogonal step away.
    #[must_use]
    pub fn is_orthogonal_neighbor(&self, other: &Self) -> bool {
        self.manhattan(other) == 1
    }

    /// Canonical identity bytes: `row` then `col`, little-endian `u64`.
    #[must_use]
    pub fn identity_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&(self.row as u64).to_le_bytes());
        bytes[8..].copy_from_slice(&(self.col as u64).to_le_bytes());
        bytes
    }
}

/// A movement direction on the grid.
///
/// Orthogonal enumeration order: `Up, Right, Down, Left`.
/// Eight-direction order: clockwise from `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

/// The four orthogonal directions in normative enumeration order.
pub const ORTHOGONAL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// All eight directions, clockwise from `Up`.
pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

impl Direction {
    /// Row/column offset of one step in this direction.
    /// Row grows downward, column grows rightward.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::UpRight => (-1, 1),
            Self::Right => (0, 1),
            Self::DownRight => (1, 1),
            Self::Down => (1, 0),
            Self::DownLeft => (1, -1),
            Self::Left => (0, -1),
            Self::UpLeft => (-1, -1),
        }
    }

    /// True for the four non-diagonal directions.
    #[must_use]
    pub const fn is_orthogonal(self) -> bool {
        matches!(self, Self::Up | Self::Right | Self::Down | Self::Left)
    }

    /// Lower-case label used in trace artifacts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::UpRight => "up_right",
            Self::Right => "right",
            Self::DownRight => "down_right",
            Self::Down => "down",
            Self::DownLeft => "down_left",
            Self::Left => "left",
            Self::UpLeft => "up_left",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_order_is_up_right_down_left() {
        assert_eq!(
            ORTHOGONAL_DIRECTIONS,
            [
                Direction::Up,
                Direction::Right,
                Direction::Down,
                Direction::Left
            ]
        );
    }

    #[test]
    fn step_clamps_at_quadrant_edge() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(0, 1)));
    }

    #[test]
    fn manhattan_and_chebyshev() {
        let a = Position::new(1, 2);
        let b = Position::new(4, 0);
        assert_eq!(a.manhattan(&b), 5);
        assert_eq!(a.chebyshev(&b), 3);
    }

    #[test]
    fn identity_bytes_are_stable() {
        let p = Position::new(3, 7);
        assert_eq!(p.identity_bytes(), p.identity_bytes());
        assert_ne!(
            p.identity_bytes(),
            Position::new(7, 3).identity_bytes(),
            "transposed coordinates must not collide"
        );
    }

    #[test]
    fn orthogonal_neighbor_detection() {
        let p = Position::new(2, 2);
        assert!(p.is_orthogonal_neighbor(&Position::new(1, 2)));
        assert!(!p.is_orthogonal_neighbor(&Position::new(1, 1)));
        assert!(!p.is_orthogonal_neighbor(&p));
    }
}
