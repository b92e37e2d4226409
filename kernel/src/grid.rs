//! Bounds-checked obstacle grids.
//!
//! A `Grid` is immutable after construction. Worlds read cells through
//! [`Grid::cell`]; there is no mutable access, so a grid can back any number
//! of concurrent solve runs.

use crate::position::{Direction, Position, ALL_DIRECTIONS, ORTHOGONAL_DIRECTIONS};

/// The kind of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Open,
    Wall,
    Start,
    Goal,
}

impl CellKind {
    /// Walls are the only impassable kind.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Error constructing a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Zero rows or zero columns.
    EmptyDimensions,
    /// A cell coordinate is outside `rows x cols`.
    OutOfBounds { position: Position },
    /// The grid must contain exactly one start cell.
    StartCount { found: usize },
    /// The grid must contain exactly one goal cell.
    GoalCount { found: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDimensions => write!(f, "grid dimensions must be non-zero"),
            Self::OutOfBounds { position } => {
                write!(f, "cell ({}, {}) is out of bounds", position.row, position.col)
            }
            Self::StartCount { found } => {
                write!(f, "grid must have exactly one start cell, found {found}")
            }
            Self::GoalCount { found } => {
                write!(f, "grid must have exactly one goal cell, found {found}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// A fixed-size 2-D cell array with exactly one start and one goal.
///
/// Row-major storage; `rows * cols` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    start: Position,
    goal: Position,
}

impl Grid {
    /// Build a grid from explicit wall positions and start/goal cells.
    ///
    /// `start == goal` is legal (a solver reports a zero-length path); the
    /// shared cell is painted as the goal.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] on empty dimensions or out-of-bounds positions.
    /// Walls on the start or goal cell are the caller's validation concern
    /// and are rejected by the definition layer before this point.
    pub fn from_layout(
        rows: usize,
        cols: usize,
        walls: &[Position],
        start: Position,
        goal: Position,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyDimensions);
        }
        for &position in walls.iter().chain([&start, &goal]) {
            if position.row >= rows || position.col >= cols {
                return Err(GridError::OutOfBounds { position });
            }
        }
        let mut cells = vec![CellKind::Open; rows * cols];
        for wall in walls {
            cells[wall.row * cols + wall.col] = CellKind::Wall;
        }
        cells[start.row * cols + start.col] = CellKind::Start;
        cells[goal.row * cols + goal.col] = CellKind::Goal;
        Ok(Self {
            rows,
            cols,
            cells,
            start,
            goal,
        })
    }

    /// Build a grid from row-major cells, validating the one-start/one-goal
    /// invariant.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] on empty dimensions, a cell count mismatch
    /// (reported as `OutOfBounds` at the first excess index), or a start/goal
    /// count other than one.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<CellKind>) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyDimensions);
        }
        if cells.len() != rows * cols {
            let index = cells.len().min(rows * cols);
            return Err(GridError::OutOfBounds {
                position: Position::new(index / cols, index % cols),
            });
        }

        let mut start = None;
        let mut goal = None;
        let mut start_count = 0usize;
        let mut goal_count = 0usize;
        for (index, kind) in cells.iter().enumerate() {
            let position = Position::new(index / cols, index % cols);
            match kind {
                CellKind::Start => {
                    start_count += 1;
                    start = Some(position);
                }
                CellKind::Goal => {
                    goal_count += 1;
                    goal = Some(position);
                }
                CellKind::Open | CellKind::Wall => {}
            }
        }
        if start_count != 1 {
            return Err(GridError::StartCount { found: start_count });
        }
        if goal_count != 1 {
            return Err(GridError::GoalCount { found: goal_count });
        }

        // Both are Some: counts were checked above.
        let (Some(start), Some(goal)) = (start, goal) else {
            return Err(GridError::StartCount { found: 0 });
        };

        Ok(Self {
            rows,
            cols,
            cells,
            start,
            goal,
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    #[must_use]
    pub const fn goal(&self) -> Position {
        self.goal
    }

    /// True when `position` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// The cell at `position`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<CellKind> {
        if !self.contains(position) {
            return None;
        }
        Some(self.cells[position.row * self.cols + position.col])
    }

    /// True when `position` is in bounds and not a wall.
    #[must_use]
    pub fn is_passable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(CellKind::is_passable)
    }

    /// In-bounds passable neighbors of `position` in normative order
    /// (`Up, Right, Down, Left`; clockwise-from-`Up` when `diagonals`).
    pub fn passable_neighbors(
        &self,
        position: Position,
        diagonals: bool,
    ) -> impl Iterator<Item = (Direction, Position)> + '_ {
        let directions: &'static [Direction] = if diagonals {
            &ALL_DIRECTIONS
        } else {
            &ORTHOGONAL_DIRECTIONS
        };
        directions.iter().filter_map(move |&direction| {
            let next = position.step(direction)?;
            self.is_passable(next).then_some((direction, next))
        })
    }
}
