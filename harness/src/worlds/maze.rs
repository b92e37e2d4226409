//! `MazeWorld`: grid pathfinding over a validated obstacle grid.
//!
//! States are positions, actions are directions, every step costs 1.
//! Successors follow the grid's normative enumeration order, so FIFO search
//! sweeps the maze reproducibly.

use parlor_kernel::definition::{DefinitionError, MazeDefinition};
use parlor_kernel::grid::Grid;
use parlor_kernel::position::{Direction, Position};

use parlor_search::contract::{SearchWorldV1, SuccessorV1};
use parlor_search::error::SearchError;

/// Search world over an obstacle grid.
pub struct MazeWorld {
    grid: Grid,
    diagonals: bool,
}

impl MazeWorld {
    /// Validate a definition and build its world.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for a malformed maze (bad bounds,
    /// start/goal problems). Reported before any search step runs.
    pub fn from_definition(definition: &MazeDefinition) -> Result<Self, DefinitionError> {
        Ok(Self {
            grid: definition.build_grid()?,
            diagonals: definition.diagonals,
        })
    }

    /// Build a world over an already-validated grid.
    ///
    /// Used internally for synthetic grids (e.g. route planning over a known
    /// region) where no external definition exists.
    #[must_use]
    pub fn from_grid(grid: Grid, diagonals: bool) -> Self {
        Self { grid, diagonals }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether the eight-direction move set is enabled.
    #[must_use]
    pub fn diagonals(&self) -> bool {
        self.diagonals
    }
}

impl SearchWorldV1 for MazeWorld {
    type State = Position;
    type Action = Direction;

    fn world_id(&self) -> &str {
        "maze:v1"
    }

    fn root_state(&self) -> Position {
        self.grid.start()
    }

    fn validate_root(&self, root: &Position) -> Result<(), SearchError> {
        if self.grid.is_passable(*root) {
            Ok(())
        } else {
            Err(SearchError::InvalidRoot {
                detail: format!("start cell ({}, {}) is not passable", root.row, root.col),
            })
        }
    }

    fn successors(&self, state: &Position) -> Vec<SuccessorV1<Position, Direction>> {
        self.grid
            .passable_neighbors(*state, self.diagonals)
            .map(|(action, next)| SuccessorV1 {
                action,
                state: next,
                cost: 1,
            })
            .collect()
    }

    fn is_goal(&self, state: &Position) -> bool {
        *state == self.grid.goal()
    }

    fn heuristic(&self, state: &Position) -> i64 {
        let goal = self.grid.goal();
        let distance = if self.diagonals {
            state.chebyshev(&goal)
        } else {
            state.manhattan(&goal)
        };
        i64::try_from(distance).unwrap_or(i64::MAX)
    }

    fn state_key(&self, state: &Position) -> Vec<u8> {
        state.identity_bytes().to_vec()
    }

    fn action_label(&self, action: &Direction) -> String {
        action.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_search::policy::{SearchPolicyV1, StrategyV1};
    use parlor_search::run::{search, SearchRun, StepStatusV1};

    fn center_wall_maze() -> MazeDefinition {
        MazeDefinition {
            rows: 3,
            cols: 3,
            walls: vec![Position::new(1, 1)],
            start: Position::new(0, 0),
            goal: Position::new(2, 2),
            diagonals: false,
        }
    }

    fn solve(definition: &MazeDefinition, strategy: StrategyV1) -> SearchRun<MazeWorld> {
        let world = MazeWorld::from_definition(definition).expect("valid maze");
        search(world, SearchPolicyV1::for_strategy(strategy)).expect("run starts")
    }

    #[test]
    fn bfs_finds_manhattan_path_around_center_wall() {
        let run = solve(&center_wall_maze(), StrategyV1::Bfs);
        let solution = run.solution().expect("path exists");
        assert_eq!(solution.cost, 4, "3x3 with center wall: cost 4");
        assert_eq!(solution.steps[0].state, Position::new(0, 0));
        assert_eq!(solution.steps.last().unwrap().state, Position::new(2, 2));
    }

    #[test]
    fn a_star_matches_bfs_cost() {
        let bfs = solve(&center_wall_maze(), StrategyV1::Bfs);
        let a_star = solve(&center_wall_maze(), StrategyV1::AStar);
        assert_eq!(
            bfs.solution().unwrap().cost,
            a_star.solution().unwrap().cost,
            "admissible heuristic keeps A* optimal"
        );
    }

    #[test]
    fn bfs_cost_never_exceeds_dfs_cost() {
        let bfs = solve(&center_wall_maze(), StrategyV1::Bfs);
        let dfs = solve(&center_wall_maze(), StrategyV1::Dfs);
        assert!(bfs.solution().unwrap().cost <= dfs.solution().unwrap().cost);
    }

    #[test]
    fn start_equals_goal_is_zero_length_success() {
        let definition = MazeDefinition {
            rows: 2,
            cols: 2,
            walls: vec![],
            start: Position::new(0, 0),
            goal: Position::new(0, 0),
            diagonals: false,
        };
        let run = solve(&definition, StrategyV1::Bfs);
        let solution = run.solution().unwrap();
        assert_eq!(solution.cost, 0);
        assert_eq!(solution.steps.len(), 1);
    }

    #[test]
    fn enclosed_goal_reports_not_found() {
        // Goal at (2,2) walled off on both approaches.
        let definition = MazeDefinition {
            rows: 3,
            cols: 3,
            walls: vec![Position::new(1, 2), Position::new(2, 1)],
            start: Position::new(0, 0),
            goal: Position::new(2, 2),
            diagonals: false,
        };
        let mut run = SearchRun::new(
            MazeWorld::from_definition(&definition).unwrap(),
            SearchPolicyV1::default(),
        )
        .unwrap();
        let status = run.run_to_completion();
        assert!(
            matches!(status, StepStatusV1::NotFound { .. }),
            "expected not-found, got {status:?}"
        );
        assert!(run.solution().is_none());
    }

    #[test]
    fn diagonals_shorten_the_path() {
        let mut definition = center_wall_maze();
        definition.walls.clear();
        let orthogonal = solve(&definition, StrategyV1::Bfs)
            .solution()
            .unwrap()
            .cost;
        definition.diagonals = true;
        let diagonal = solve(&definition, StrategyV1::Bfs).solution().unwrap().cost;
        assert_eq!(orthogonal, 4);
        assert_eq!(diagonal, 2, "two diagonal steps reach the far corner");
    }

    #[test]
    fn expansion_sweep_is_reproducible() {
        let fingerprints = |run: &SearchRun<MazeWorld>| -> Vec<String> {
            run.graph()
                .expansions
                .iter()
                .map(|e| e.state_fingerprint.clone())
                .collect()
        };
        let a = solve(&center_wall_maze(), StrategyV1::Bfs);
        let b = solve(&center_wall_maze(), StrategyV1::Bfs);
        assert_eq!(fingerprints(&a), fingerprints(&b));
    }

    #[test]
    fn dfs_never_expands_a_cell_twice() {
        let run = solve(&center_wall_maze(), StrategyV1::Dfs);
        let graph = run.graph();
        let mut seen = std::collections::BTreeSet::new();
        for event in &graph.expansions {
            assert!(seen.insert(event.state_fingerprint.clone()));
        }
    }
}
