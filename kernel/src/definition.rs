//! Puzzle definitions: the structured-data input seam.
//!
//! Definitions arrive from the presentation layer as plain data and are
//! validated here, before any search step runs. A malformed definition is
//! rejected as a [`DefinitionError`]; an unsolvable-but-well-formed puzzle
//! is NOT an error — it surfaces later as an exhausted search.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridError};
use crate::position::Position;

/// Typed rejection of a malformed puzzle definition.
///
/// Reported before a run is created; a run never starts on invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Grid construction failed (missing/duplicate start or goal, bounds).
    Grid(GridError),
    /// The start cell was declared as a wall.
    StartOnWall { position: Position },
    /// The goal cell was declared as a wall.
    GoalOnWall { position: Position },
    /// Both jug capacities are zero.
    EmptyCapacities,
    /// A wumpus-world coordinate is outside the arena.
    HazardOutOfBounds { position: Position },
    /// The entry cell coincides with a pit or the wumpus.
    HazardOnEntry { position: Position },
    /// The same pit cell was declared twice.
    DuplicatePit { position: Position },
    /// The arena is too small to hold an episode.
    ArenaTooSmall { size: usize },
}

impl std::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "invalid grid: {e}"),
            Self::StartOnWall { position } => {
                write!(f, "start cell ({}, {}) is a wall", position.row, position.col)
            }
            Self::GoalOnWall { position } => {
                write!(f, "goal cell ({}, {}) is a wall", position.row, position.col)
            }
            Self::EmptyCapacities => write!(f, "both jug capacities are zero"),
            Self::HazardOutOfBounds { position } => write!(
                f,
                "hazard cell ({}, {}) is outside the arena",
                position.row, position.col
            ),
            Self::HazardOnEntry { position } => write!(
                f,
                "entry cell ({}, {}) coincides with a hazard",
                position.row, position.col
            ),
            Self::DuplicatePit { position } => write!(
                f,
                "pit cell ({}, {}) declared twice",
                position.row, position.col
            ),
            Self::ArenaTooSmall { size } => {
                write!(f, "arena size {size} is too small (minimum 2)")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

impl From<GridError> for DefinitionError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// A maze layout: dimensions, wall cells, start, goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeDefinition {
    pub rows: usize,
    pub cols: usize,
    pub walls: Vec<Position>,
    pub start: Position,
    pub goal: Position,
    /// Allow the eight-direction move set. Default: orthogonal only.
    #[serde(default)]
    pub diagonals: bool,
}

impl MazeDefinition {
    /// Validate and build the immutable [`Grid`] this maze describes.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the start or goal sits on a declared
    /// wall, or when the grid invariants (bounds, exactly one start and one
    /// goal) do not hold.
    pub fn build_grid(&self) -> Result<Grid, DefinitionError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::EmptyDimensions.into());
        }
        for wall in &self.walls {
            if wall.row >= self.rows || wall.col >= self.cols {
                return Err(GridError::OutOfBounds { position: *wall }.into());
            }
            if *wall == self.start {
                return Err(DefinitionError::StartOnWall { position: *wall });
            }
            if *wall == self.goal {
                return Err(DefinitionError::GoalOnWall { position: *wall });
            }
        }
        if self.start.row >= self.rows || self.start.col >= self.cols {
            return Err(GridError::OutOfBounds {
                position: self.start,
            }
            .into());
        }
        if self.goal.row >= self.rows || self.goal.col >= self.cols {
            return Err(GridError::OutOfBounds {
                position: self.goal,
            }
            .into());
        }

        Grid::from_layout(self.rows, self.cols, &self.walls, self.start, self.goal)
            .map_err(Into::into)
    }
}

/// A water-jug puzzle: two capacities and a target volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotsDefinition {
    pub left_capacity: u32,
    pub right_capacity: u32,
    pub target: u32,
}

impl PotsDefinition {
    /// Reject structurally broken definitions.
    ///
    /// A target that is merely unreachable is well-formed; it exhausts the
    /// finite state space and comes back as a not-found result.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyCapacities`] when both jugs have
    /// capacity zero and the target is non-zero.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.left_capacity == 0 && self.right_capacity == 0 && self.target != 0 {
            return Err(DefinitionError::EmptyCapacities);
        }
        Ok(())
    }

    /// Number-theoretic reachability from (0, 0): the target must fit in the
    /// larger jug and be a multiple of `gcd(capacities)`.
    #[must_use]
    pub fn solvable(&self) -> bool {
        if self.target == 0 {
            return true;
        }
        if self.target > self.left_capacity.max(self.right_capacity) {
            return false;
        }
        self.target % gcd(self.left_capacity, self.right_capacity) == 0
    }
}

/// Greatest common divisor; `gcd(n, 0) == gcd(0, n) == n`.
#[must_use]
pub fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// A wumpus-world arena: size, entry, hidden hazards, gold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WumpusDefinition {
    /// Arena side length (size x size cells).
    pub size: usize,
    pub entry: Position,
    pub wumpus: Position,
    pub pits: Vec<Position>,
    pub gold: Position,
}

impl WumpusDefinition {
    /// Reject malformed arenas before an episode is created.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for an arena smaller than 2x2,
    /// out-of-bounds coordinates, duplicate pits, or a hazard on the entry
    /// cell (the agent would die before acting).
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.size < 2 {
            return Err(DefinitionError::ArenaTooSmall { size: self.size });
        }
        let in_bounds = |p: Position| p.row < self.size && p.col < self.size;
        for position in [self.entry, self.wumpus, self.gold]
            .into_iter()
            .chain(self.pits.iter().copied())
        {
            if !in_bounds(position) {
                return Err(DefinitionError::HazardOutOfBounds { position });
            }
        }
        if self.wumpus == self.entry {
            return Err(DefinitionError::HazardOnEntry {
                position: self.entry,
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        for pit in &self.pits {
            if *pit == self.entry {
                return Err(DefinitionError::HazardOnEntry { position: *pit });
            }
            if !seen.insert(*pit) {
                return Err(DefinitionError::DuplicatePit { position: *pit });
            }
        }
        Ok(())
    }

    /// True when `position` lies inside the arena.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row < self.size && position.col < self.size
    }
}
