//! The uniform solve seam over the three puzzle kinds.
//!
//! The presentation layer supplies a [`PuzzleDefinitionV1`] (plain
//! structured data) and either calls [`solve`] for a one-shot answer or
//! drives a [`PuzzleRunV1`] frame by frame. Maze and pots runs are search
//! runs; a wumpus run is an inference-action episode — the handle hides the
//! difference behind one `advance()` surface.

use serde::{Deserialize, Serialize};

use parlor_kernel::definition::{
    DefinitionError, MazeDefinition, PotsDefinition, WumpusDefinition,
};
use parlor_kernel::position::Position;

use parlor_search::error::SearchError;
use parlor_search::graph::{SearchGraphV1, TerminationReasonV1};
use parlor_search::policy::{SearchPolicyV1, StrategyV1};
use parlor_search::run::SearchRun;

use crate::worlds::maze::MazeWorld;
use crate::worlds::pots::{Jugs, PotsActionV1, PotsWorld};
use crate::worlds::wumpus_agent::{
    AgentStepV1, EpisodeOutcomeV1, EpisodeStatusV1, WumpusConfigV1, WumpusEpisode,
};

/// A puzzle definition, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PuzzleDefinitionV1 {
    Maze(MazeDefinition),
    Pots(PotsDefinition),
    Wumpus(WumpusDefinition),
}

/// Error creating a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerErrorV1 {
    /// The definition was malformed (reported before any step runs).
    Definition(DefinitionError),
    /// The search layer rejected the run pre-flight.
    Search(SearchError),
}

impl std::fmt::Display for RunnerErrorV1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definition(e) => write!(f, "invalid puzzle definition: {e}"),
            Self::Search(e) => write!(f, "search rejected the run: {e}"),
        }
    }
}

impl std::error::Error for RunnerErrorV1 {}

impl From<DefinitionError> for RunnerErrorV1 {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}

impl From<SearchError> for RunnerErrorV1 {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// The uniform result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveReportV1 {
    /// Ordered positions from start to goal.
    MazeSolved { path: Vec<Position>, cost: i64 },
    /// Ordered jug operations and the states they pass through.
    PotsSolved {
        operations: Vec<PotsActionV1>,
        states: Vec<Jugs>,
        cost: i64,
    },
    /// The episode's terminal outcome and full transcript. A dead agent is
    /// a finished episode, not an error.
    WumpusFinished {
        outcome: EpisodeOutcomeV1,
        transcript: Vec<AgentStepV1>,
    },
    /// The search space was exhausted (or a budget hit) without a goal.
    NotFound { reason: TerminationReasonV1 },
}

impl SolveReportV1 {
    /// True when the puzzle's objective was met (for wumpus: climbed out
    /// holding the gold).
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::MazeSolved { .. } | Self::PotsSolved { .. } => true,
            Self::WumpusFinished { outcome, .. } => {
                matches!(outcome, EpisodeOutcomeV1::ClimbedOut { has_gold: true })
            }
            Self::NotFound { .. } => false,
        }
    }
}

/// Result of one `advance()` on a puzzle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatusV1 {
    Continuing,
    Finished,
}

/// An owned, step-wise run over any puzzle kind — the seam the
/// presentation layer drives frame by frame.
pub enum PuzzleRunV1 {
    Maze(SearchRun<MazeWorld>),
    Pots(SearchRun<PotsWorld>),
    Wumpus(Box<WumpusEpisode>),
}

impl PuzzleRunV1 {
    /// Validate a definition and create its run.
    ///
    /// `strategy` selects the frontier for maze and pots runs; a wumpus
    /// episode is percept-driven and ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerErrorV1`] for a malformed definition or a pre-flight
    /// search rejection. Nothing has run at that point.
    pub fn create(
        definition: &PuzzleDefinitionV1,
        strategy: StrategyV1,
    ) -> Result<Self, RunnerErrorV1> {
        Self::create_with_config(definition, strategy, WumpusConfigV1::default())
    }

    /// [`PuzzleRunV1::create`] with an explicit wumpus configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerErrorV1`] as for `create`.
    pub fn create_with_config(
        definition: &PuzzleDefinitionV1,
        strategy: StrategyV1,
        wumpus_config: WumpusConfigV1,
    ) -> Result<Self, RunnerErrorV1> {
        match definition {
            PuzzleDefinitionV1::Maze(def) => {
                let world = MazeWorld::from_definition(def)?;
                let run = SearchRun::new(world, SearchPolicyV1::for_strategy(strategy))?;
                Ok(Self::Maze(run))
            }
            PuzzleDefinitionV1::Pots(def) => {
                let world = PotsWorld::from_definition(*def)?;
                let run = SearchRun::new(world, SearchPolicyV1::for_strategy(strategy))?;
                Ok(Self::Pots(run))
            }
            PuzzleDefinitionV1::Wumpus(def) => {
                let episode = WumpusEpisode::with_config(def.clone(), wumpus_config)?;
                Ok(Self::Wumpus(Box::new(episode)))
            }
        }
    }

    /// One frame of work. Idempotent once finished.
    pub fn advance(&mut self) -> RunStatusV1 {
        let finished = match self {
            Self::Maze(run) => {
                let _ = run.advance();
                run.is_terminated()
            }
            Self::Pots(run) => {
                let _ = run.advance();
                run.is_terminated()
            }
            Self::Wumpus(episode) => {
                matches!(episode.advance(), EpisodeStatusV1::Finished(_))
            }
        };
        if finished {
            RunStatusV1::Finished
        } else {
            RunStatusV1::Continuing
        }
    }

    /// True once the run has reached a terminal status.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Maze(run) => run.is_terminated(),
            Self::Pots(run) => run.is_terminated(),
            Self::Wumpus(episode) => episode.outcome().is_some(),
        }
    }

    /// The uniform report. `None` while the run is still in flight.
    #[must_use]
    pub fn report(&self) -> Option<SolveReportV1> {
        match self {
            Self::Maze(run) => match run.termination()? {
                TerminationReasonV1::GoalReached { .. } => {
                    let solution = run.solution()?;
                    Some(SolveReportV1::MazeSolved {
                        path: solution.steps.iter().map(|s| s.state).collect(),
                        cost: solution.cost,
                    })
                }
                reason => Some(SolveReportV1::NotFound {
                    reason: reason.clone(),
                }),
            },
            Self::Pots(run) => match run.termination()? {
                TerminationReasonV1::GoalReached { .. } => {
                    let solution = run.solution()?;
                    Some(SolveReportV1::PotsSolved {
                        operations: solution.steps.iter().filter_map(|s| s.action).collect(),
                        states: solution.steps.iter().map(|s| s.state).collect(),
                        cost: solution.cost,
                    })
                }
                reason => Some(SolveReportV1::NotFound {
                    reason: reason.clone(),
                }),
            },
            Self::Wumpus(episode) => {
                let outcome = episode.outcome()?.clone();
                Some(SolveReportV1::WumpusFinished {
                    outcome,
                    transcript: episode.transcript().to_vec(),
                })
            }
        }
    }

    /// The expansion-trace artifact for search-backed runs (`None` for a
    /// wumpus episode, whose trace is its transcript).
    #[must_use]
    pub fn search_graph(&self) -> Option<SearchGraphV1> {
        match self {
            Self::Maze(run) => Some(run.graph()),
            Self::Pots(run) => Some(run.graph()),
            Self::Wumpus(_) => None,
        }
    }

    /// The wumpus transcript (`None` for search-backed runs).
    #[must_use]
    pub fn transcript(&self) -> Option<&[AgentStepV1]> {
        match self {
            Self::Wumpus(episode) => Some(episode.transcript()),
            Self::Maze(_) | Self::Pots(_) => None,
        }
    }
}

/// One-shot solve: create a run, drive it to completion, report.
///
/// # Errors
///
/// Returns [`RunnerErrorV1`] for a malformed definition or a pre-flight
/// search rejection.
pub fn solve(
    definition: &PuzzleDefinitionV1,
    strategy: StrategyV1,
) -> Result<SolveReportV1, RunnerErrorV1> {
    let mut run = PuzzleRunV1::create(definition, strategy)?;
    loop {
        if let RunStatusV1::Finished = run.advance() {
            if let Some(report) = run.report() {
                return Ok(report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze_definition() -> PuzzleDefinitionV1 {
        PuzzleDefinitionV1::Maze(MazeDefinition {
            rows: 3,
            cols: 3,
            walls: vec![Position::new(1, 1)],
            start: Position::new(0, 0),
            goal: Position::new(2, 2),
            diagonals: false,
        })
    }

    #[test]
    fn solve_maze_reports_path() {
        let report = solve(&maze_definition(), StrategyV1::Bfs).unwrap();
        let SolveReportV1::MazeSolved { path, cost } = report else {
            panic!("expected a maze path");
        };
        assert_eq!(cost, 4);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], Position::new(0, 0));
        assert_eq!(path[4], Position::new(2, 2));
    }

    #[test]
    fn solve_pots_reports_minimal_plan() {
        let definition = PuzzleDefinitionV1::Pots(PotsDefinition {
            left_capacity: 4,
            right_capacity: 3,
            target: 2,
        });
        let report = solve(&definition, StrategyV1::Bfs).unwrap();
        let SolveReportV1::PotsSolved {
            operations,
            states,
            cost,
        } = report
        else {
            panic!("expected a pots plan");
        };
        assert_eq!(cost, 4);
        assert_eq!(operations.len(), 4);
        assert_eq!(states.len(), 5, "root state plus one per operation");
    }

    #[test]
    fn unsolvable_pots_reports_not_found() {
        let definition = PuzzleDefinitionV1::Pots(PotsDefinition {
            left_capacity: 6,
            right_capacity: 4,
            target: 3,
        });
        let report = solve(&definition, StrategyV1::Bfs).unwrap();
        assert_eq!(
            report,
            SolveReportV1::NotFound {
                reason: TerminationReasonV1::FrontierExhausted
            }
        );
        assert!(!report.is_success());
    }

    #[test]
    fn solve_wumpus_reports_outcome_and_transcript() {
        let definition = PuzzleDefinitionV1::Wumpus(WumpusDefinition {
            size: 3,
            entry: Position::new(0, 0),
            wumpus: Position::new(2, 0),
            pits: vec![Position::new(2, 2)],
            gold: Position::new(1, 1),
        });
        let report = solve(&definition, StrategyV1::Bfs).unwrap();
        let SolveReportV1::WumpusFinished {
            outcome,
            transcript,
        } = report
        else {
            panic!("expected a wumpus report");
        };
        assert_eq!(outcome, EpisodeOutcomeV1::ClimbedOut { has_gold: true });
        assert!(!transcript.is_empty());
    }

    #[test]
    fn malformed_definition_is_rejected_before_running() {
        let definition = PuzzleDefinitionV1::Maze(MazeDefinition {
            rows: 3,
            cols: 3,
            walls: vec![Position::new(0, 0)],
            start: Position::new(0, 0),
            goal: Position::new(2, 2),
            diagonals: false,
        });
        let err = solve(&definition, StrategyV1::Bfs).unwrap_err();
        assert!(matches!(err, RunnerErrorV1::Definition(_)));
    }

    #[test]
    fn step_wise_run_matches_one_shot_solve() {
        let mut run = PuzzleRunV1::create(&maze_definition(), StrategyV1::Bfs).unwrap();
        assert!(run.report().is_none(), "no report while in flight");
        let mut frames = 0usize;
        while let RunStatusV1::Continuing = run.advance() {
            frames += 1;
            assert!(frames < 1_000, "runaway run");
        }
        assert!(run.is_finished());
        let stepped = run.report().unwrap();
        let one_shot = solve(&maze_definition(), StrategyV1::Bfs).unwrap();
        assert_eq!(stepped, one_shot);
    }

    #[test]
    fn search_graph_is_exposed_for_search_runs() {
        let mut run = PuzzleRunV1::create(&maze_definition(), StrategyV1::Bfs).unwrap();
        while let RunStatusV1::Continuing = run.advance() {}
        let graph = run.search_graph().unwrap();
        assert!(graph.metadata.termination_reason.is_some());
        assert_eq!(graph.metadata.world_id, "maze:v1");
        assert!(run.transcript().is_none());
    }

    #[test]
    fn definitions_round_trip_through_tagged_json() {
        let json = serde_json::json!({
            "kind": "pots",
            "left_capacity": 4,
            "right_capacity": 3,
            "target": 2,
        });
        let definition: PuzzleDefinitionV1 = serde_json::from_value(json).unwrap();
        assert!(matches!(definition, PuzzleDefinitionV1::Pots(_)));

        let back = serde_json::to_value(&definition).unwrap();
        assert_eq!(back["kind"], "pots");
        assert_eq!(back["target"], 2);
    }

    #[test]
    fn dfs_and_bfs_both_solve_the_maze() {
        let bfs = solve(&maze_definition(), StrategyV1::Bfs).unwrap();
        let dfs = solve(&maze_definition(), StrategyV1::Dfs).unwrap();
        let (SolveReportV1::MazeSolved { cost: bfs_cost, .. }, SolveReportV1::MazeSolved { cost: dfs_cost, .. }) = (bfs, dfs) else {
            panic!("both strategies should solve the maze");
        };
        assert!(bfs_cost <= dfs_cost);
    }
}
