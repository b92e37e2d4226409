//! `WumpusEpisode`: the knowledge-based agent's step-wise state machine.
//!
//! One `advance()` call = perceive, infer, act once. The episode owns its
//! environment and knowledge base; concurrent episodes are independent.
//!
//! Action policy, in order:
//! 1. glitter → grab the gold and retreat to the entry;
//! 2. a committed route is followed before new decisions are made;
//! 3. proven wumpus + clear line + arrow available → shoot;
//! 4. adjacent proven-safe unvisited cell (normative direction order);
//! 5. route through visited territory to the nearest safe unvisited cell
//!    (planned with the search layer's FIFO frontier);
//! 6. only when no safe option remains and risk-taking is enabled: enter an
//!    adjacent unknown cell, recorded as a calculated risk;
//! 7. give up: retreat to the entry and climb out.
//!
//! Dying in an unknown cell is a legitimate terminal outcome carrying the
//! hazard and the cell — not an error.

use std::collections::VecDeque;

use parlor_kernel::definition::{DefinitionError, WumpusDefinition};
use parlor_kernel::grid::Grid;
use parlor_kernel::position::{Direction, Position, ORTHOGONAL_DIRECTIONS};

use parlor_search::policy::{SearchPolicyV1, StrategyV1};
use parlor_search::run::SearchRun;

use crate::worlds::maze::MazeWorld;
use crate::worlds::wumpus::{
    orthogonal_neighbors, HazardBelief, HazardKindV1, KnowledgeBase, PerceptV1, WumpusEnvironment,
};

/// Episode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WumpusConfigV1 {
    /// Enter an adjacent unknown cell when no safe option remains.
    /// Disabled = cautious mode: the agent retreats and climbs out instead.
    pub risk_fallback: bool,
    /// Step budget before the agent abandons the hunt and walks home.
    /// `None` derives `8 * size * size`.
    pub max_steps: Option<usize>,
}

impl Default for WumpusConfigV1 {
    fn default() -> Self {
        Self {
            risk_fallback: true,
            max_steps: None,
        }
    }
}

/// Agent phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhaseV1 {
    Exploring,
    Retreating,
    ShootingDecision,
    ClimbedOut,
    Dead,
}

impl AgentPhaseV1 {
    /// Stable label used in transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::Retreating => "retreating",
            Self::ShootingDecision => "shooting_decision",
            Self::ClimbedOut => "climbed_out",
            Self::Dead => "dead",
        }
    }
}

/// One agent action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentActionV1 {
    Move(Direction),
    Grab,
    Shoot(Direction),
    Climb,
}

impl AgentActionV1 {
    /// Stable label used in transcripts.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Move(direction) => format!("move_{}", direction.label()),
            Self::Grab => "grab".to_string(),
            Self::Shoot(direction) => format!("shoot_{}", direction.label()),
            Self::Climb => "climb".to_string(),
        }
    }
}

/// One transcript entry: where the agent was, what it sensed, what it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStepV1 {
    pub position: Position,
    pub percept: PerceptV1,
    pub action: AgentActionV1,
    pub phase: AgentPhaseV1,
    /// True when the move entered an unknown cell with no safe alternative.
    pub calculated_risk: bool,
}

/// How an episode ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeOutcomeV1 {
    /// The agent climbed out at the entry.
    ClimbedOut { has_gold: bool },
    /// The agent entered a cell holding a live hazard.
    Dead {
        hazard: HazardKindV1,
        cell: Position,
    },
}

/// Result of one `advance()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeStatusV1 {
    Continuing {
        position: Position,
        phase: AgentPhaseV1,
    },
    Finished(EpisodeOutcomeV1),
}

/// An owned, step-wise wumpus episode.
pub struct WumpusEpisode {
    environment: WumpusEnvironment,
    config: WumpusConfigV1,
    kb: KnowledgeBase,
    position: Position,
    phase: AgentPhaseV1,
    has_gold: bool,
    arrow_used: bool,
    scream_pending: bool,
    route: VecDeque<Direction>,
    steps: Vec<AgentStepV1>,
    outcome: Option<EpisodeOutcomeV1>,
    max_steps: usize,
}

impl WumpusEpisode {
    /// Create an episode with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for a malformed arena.
    pub fn new(definition: WumpusDefinition) -> Result<Self, DefinitionError> {
        Self::with_config(definition, WumpusConfigV1::default())
    }

    /// Create an episode with an explicit configuration.
    ///
    /// The entry percept is absorbed immediately: beliefs about the entry's
    /// neighbors are in place before the first action.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for a malformed arena.
    pub fn with_config(
        definition: WumpusDefinition,
        config: WumpusConfigV1,
    ) -> Result<Self, DefinitionError> {
        let environment = WumpusEnvironment::new(definition)?;
        let size = environment.size();
        let entry = environment.entry();
        let max_steps = config.max_steps.unwrap_or(8 * size * size);

        let mut kb = KnowledgeBase::new(size);
        kb.record_percept(entry, &environment.perceive(entry));

        Ok(Self {
            environment,
            config,
            kb,
            position: entry,
            phase: AgentPhaseV1::Exploring,
            has_gold: false,
            arrow_used: false,
            scream_pending: false,
            route: VecDeque::new(),
            steps: Vec::new(),
            outcome: None,
            max_steps,
        })
    }

    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    #[must_use]
    pub fn environment(&self) -> &WumpusEnvironment {
        &self.environment
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn phase(&self) -> AgentPhaseV1 {
        self.phase
    }

    #[must_use]
    pub fn has_gold(&self) -> bool {
        self.has_gold
    }

    /// The ordered transcript of steps taken so far.
    #[must_use]
    pub fn transcript(&self) -> &[AgentStepV1] {
        &self.steps
    }

    /// How the episode ended, once it has.
    #[must_use]
    pub fn outcome(&self) -> Option<&EpisodeOutcomeV1> {
        self.outcome.as_ref()
    }

    /// Perceive, infer, act once.
    ///
    /// Idempotent once terminal: a finished episode reports its outcome
    /// again without acting.
    pub fn advance(&mut self) -> EpisodeStatusV1 {
        if let Some(outcome) = &self.outcome {
            return EpisodeStatusV1::Finished(outcome.clone());
        }

        let mut percept = self.environment.perceive(self.position);
        percept.scream = std::mem::take(&mut self.scream_pending);
        self.kb.record_percept(self.position, &percept);

        if self.phase == AgentPhaseV1::Retreating {
            return self.advance_retreating(percept);
        }

        // Step budget exhausted: abandon the hunt and walk home.
        if self.steps.len() >= self.max_steps {
            self.begin_retreat();
            return self.advance_retreating(percept);
        }

        if percept.glitter {
            self.environment.take_gold(self.position);
            self.has_gold = true;
            self.record(percept, AgentActionV1::Grab, false);
            self.begin_retreat();
            return self.continuing();
        }

        // A committed route is followed before new decisions are made.
        if let Some(direction) = self.route.pop_front() {
            if let Some(next) = self.step_in_bounds(direction) {
                return self.move_agent(percept, direction, next, false);
            }
            self.route.clear();
        }

        if !self.arrow_used && !self.kb.wumpus_dead() {
            if let Some(target) = self.kb.wumpus_location_if_certain() {
                if let Some(direction) = aim_direction(self.position, target) {
                    return self.shoot(percept, direction);
                }
            }
        }

        for (direction, next) in self.adjacent_cells() {
            if self.kb.is_safe(next) && !self.kb.is_visited(next) {
                return self.move_agent(percept, direction, next, false);
            }
        }

        let route = self.plan_route_to_safe_unvisited();
        if !route.is_empty() {
            self.route = route;
            if let Some(direction) = self.route.pop_front() {
                if let Some(next) = self.step_in_bounds(direction) {
                    return self.move_agent(percept, direction, next, false);
                }
            }
        }

        if self.config.risk_fallback {
            for (direction, next) in self.adjacent_cells() {
                if self.is_gamble_candidate(next) {
                    return self.move_agent(percept, direction, next, true);
                }
            }
            // No gamble here; walk to a visited cell that still has one.
            let route = self.plan_route_to_gamble_frontier();
            if !route.is_empty() {
                self.route = route;
                if let Some(direction) = self.route.pop_front() {
                    if let Some(next) = self.step_in_bounds(direction) {
                        return self.move_agent(percept, direction, next, false);
                    }
                }
            }
        }

        self.begin_retreat();
        self.advance_retreating(percept)
    }

    /// Drive `advance()` until the episode ends.
    pub fn run_to_completion(&mut self) -> EpisodeOutcomeV1 {
        loop {
            if let EpisodeStatusV1::Finished(outcome) = self.advance() {
                return outcome;
            }
        }
    }

    fn advance_retreating(&mut self, percept: PerceptV1) -> EpisodeStatusV1 {
        if self.position == self.environment.entry() {
            return self.climb_out(percept);
        }
        if self.route.is_empty() {
            if let Some(route) = self.plan_route_to(self.environment.entry()) {
                self.route = route;
            }
        }
        match self.route.pop_front() {
            Some(direction) => match self.step_in_bounds(direction) {
                Some(next) => self.move_agent(percept, direction, next, false),
                None => self.continuing(),
            },
            // The visited region is connected back to the entry; an empty
            // plan only happens on a degenerate arena. Give up in place.
            None => self.climb_out(percept),
        }
    }

    fn climb_out(&mut self, percept: PerceptV1) -> EpisodeStatusV1 {
        self.record(percept, AgentActionV1::Climb, false);
        self.phase = AgentPhaseV1::ClimbedOut;
        let outcome = EpisodeOutcomeV1::ClimbedOut {
            has_gold: self.has_gold,
        };
        self.outcome = Some(outcome.clone());
        EpisodeStatusV1::Finished(outcome)
    }

    fn shoot(&mut self, percept: PerceptV1, direction: Direction) -> EpisodeStatusV1 {
        self.phase = AgentPhaseV1::ShootingDecision;
        self.record(percept, AgentActionV1::Shoot(direction), false);
        self.arrow_used = true;
        if self.arrow_hits(direction) {
            self.environment.kill_wumpus();
            // The scream reaches the agent with its next percept and
            // retracts the wumpus beliefs there.
            self.scream_pending = true;
        }
        self.phase = AgentPhaseV1::Exploring;
        self.continuing()
    }

    fn arrow_hits(&self, direction: Direction) -> bool {
        if !self.environment.wumpus_alive() {
            return false;
        }
        let size = self.environment.size();
        let wumpus = self.environment.definition().wumpus;
        let mut cursor = self.position;
        while let Some(next) = cursor.step(direction) {
            if next.row >= size || next.col >= size {
                break;
            }
            if next == wumpus {
                return true;
            }
            cursor = next;
        }
        false
    }

    fn move_agent(
        &mut self,
        percept: PerceptV1,
        direction: Direction,
        next: Position,
        calculated_risk: bool,
    ) -> EpisodeStatusV1 {
        self.record(percept, AgentActionV1::Move(direction), calculated_risk);
        self.position = next;
        if let Some(hazard) = self.environment.hazard_at(next) {
            self.phase = AgentPhaseV1::Dead;
            let outcome = EpisodeOutcomeV1::Dead { hazard, cell: next };
            self.outcome = Some(outcome.clone());
            return EpisodeStatusV1::Finished(outcome);
        }
        self.continuing()
    }

    fn begin_retreat(&mut self) {
        self.phase = AgentPhaseV1::Retreating;
        self.route = self
            .plan_route_to(self.environment.entry())
            .unwrap_or_default();
    }

    /// Plan a route from the current position to `target` moving only
    /// through visited cells (plus the target itself), using the search
    /// layer's FIFO frontier.
    fn plan_route_to(&self, target: Position) -> Option<VecDeque<Direction>> {
        let size = self.environment.size();
        let mut walls = Vec::new();
        for row in 0..size {
            for col in 0..size {
                let position = Position::new(row, col);
                if position != target && !self.kb.is_visited(position) {
                    walls.push(position);
                }
            }
        }
        let grid = Grid::from_layout(size, size, &walls, self.position, target).ok()?;
        let world = MazeWorld::from_grid(grid, false);
        let mut run = SearchRun::new(world, SearchPolicyV1::for_strategy(StrategyV1::Bfs)).ok()?;
        let _ = run.run_to_completion();
        let solution = run.solution()?;
        Some(solution.steps.into_iter().filter_map(|s| s.action).collect())
    }

    /// The first reachable proven-safe unvisited cell in reading order.
    fn plan_route_to_safe_unvisited(&self) -> VecDeque<Direction> {
        for target in self.kb.safe_unvisited() {
            if let Some(route) = self.plan_route_to(target) {
                if !route.is_empty() {
                    return route;
                }
            }
        }
        VecDeque::new()
    }

    /// An unvisited cell that is not proven anything: worth a gamble, never
    /// a cell already proven hazardous.
    fn is_gamble_candidate(&self, position: Position) -> bool {
        let belief = self.kb.belief(position);
        !belief.visited
            && !belief.is_safe()
            && belief.pit != HazardBelief::Unsafe
            && belief.wumpus != HazardBelief::Unsafe
    }

    /// Route to the first visited cell (reading order) that still has an
    /// adjacent gamble candidate.
    fn plan_route_to_gamble_frontier(&self) -> VecDeque<Direction> {
        let size = self.environment.size();
        for cell in self.kb.visited_cells() {
            if cell == self.position {
                continue;
            }
            let has_gamble = orthogonal_neighbors(size, cell)
                .into_iter()
                .any(|n| self.is_gamble_candidate(n));
            if has_gamble {
                if let Some(route) = self.plan_route_to(cell) {
                    if !route.is_empty() {
                        return route;
                    }
                }
            }
        }
        VecDeque::new()
    }

    fn adjacent_cells(&self) -> Vec<(Direction, Position)> {
        let size = self.environment.size();
        ORTHOGONAL_DIRECTIONS
            .iter()
            .filter_map(|&direction| {
                let next = self.position.step(direction)?;
                (next.row < size && next.col < size).then_some((direction, next))
            })
            .collect()
    }

    fn step_in_bounds(&self, direction: Direction) -> Option<Position> {
        let size = self.environment.size();
        let next = self.position.step(direction)?;
        (next.row < size && next.col < size).then_some(next)
    }

    fn record(&mut self, percept: PerceptV1, action: AgentActionV1, calculated_risk: bool) {
        self.steps.push(AgentStepV1 {
            position: self.position,
            percept,
            action,
            phase: self.phase,
            calculated_risk,
        });
    }

    fn continuing(&self) -> EpisodeStatusV1 {
        EpisodeStatusV1::Continuing {
            position: self.position,
            phase: self.phase,
        }
    }
}

/// The straight-line firing direction from `from` to `target`, if aligned
/// on a row or column.
#[must_use]
fn aim_direction(from: Position, target: Position) -> Option<Direction> {
    if from == target {
        return None;
    }
    if from.row == target.row {
        return Some(if target.col > from.col {
            Direction::Right
        } else {
            Direction::Left
        });
    }
    if from.col == target.col {
        return Some(if target.row > from.row {
            Direction::Down
        } else {
            Direction::Up
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_arena() -> WumpusDefinition {
        // Wumpus and pit tucked into the far corner region, gold reachable
        // over proven-safe ground.
        WumpusDefinition {
            size: 3,
            entry: Position::new(0, 0),
            wumpus: Position::new(2, 0),
            pits: vec![Position::new(2, 2)],
            gold: Position::new(1, 1),
        }
    }

    #[test]
    fn quiet_entry_marks_neighbors_safe_before_any_move() {
        let definition = WumpusDefinition {
            size: 4,
            entry: Position::new(0, 0),
            wumpus: Position::new(3, 3),
            pits: vec![],
            gold: Position::new(3, 0),
        };
        let episode = WumpusEpisode::new(definition).unwrap();
        assert!(episode.transcript().is_empty(), "no action taken yet");
        for neighbor in orthogonal_neighbors(4, Position::new(0, 0)) {
            assert!(episode.knowledge().is_safe(neighbor));
        }
    }

    #[test]
    fn agent_retrieves_gold_and_climbs_out() {
        let mut episode = WumpusEpisode::new(open_arena()).unwrap();
        let outcome = episode.run_to_completion();
        assert_eq!(outcome, EpisodeOutcomeV1::ClimbedOut { has_gold: true });

        let transcript = episode.transcript();
        assert!(transcript
            .iter()
            .any(|s| s.action == AgentActionV1::Grab));
        assert_eq!(
            transcript.last().unwrap().action,
            AgentActionV1::Climb,
            "episodes end at the entry"
        );
        assert_eq!(episode.position(), Position::new(0, 0));
        assert_eq!(episode.phase(), AgentPhaseV1::ClimbedOut);
    }

    fn trapped_arena() -> WumpusDefinition {
        // Entry hemmed in: pit to the right, wumpus below. Every exit from
        // the entry is an unknown gamble.
        WumpusDefinition {
            size: 2,
            entry: Position::new(0, 0),
            wumpus: Position::new(1, 0),
            pits: vec![Position::new(0, 1)],
            gold: Position::new(1, 1),
        }
    }

    #[test]
    fn cautious_agent_abandons_a_trapped_arena() {
        let config = WumpusConfigV1 {
            risk_fallback: false,
            max_steps: None,
        };
        let mut episode = WumpusEpisode::with_config(trapped_arena(), config).unwrap();
        let outcome = episode.run_to_completion();
        assert_eq!(outcome, EpisodeOutcomeV1::ClimbedOut { has_gold: false });
        assert!(!episode
            .transcript()
            .iter()
            .any(|s| s.calculated_risk), "cautious mode never gambles");
    }

    #[test]
    fn risk_taking_agent_may_die_with_diagnostics() {
        let mut episode = WumpusEpisode::new(trapped_arena()).unwrap();
        let outcome = episode.run_to_completion();
        // Normative direction order tries Right first: the pit at (0, 1).
        assert_eq!(
            outcome,
            EpisodeOutcomeV1::Dead {
                hazard: HazardKindV1::Pit,
                cell: Position::new(0, 1),
            }
        );
        assert_eq!(episode.phase(), AgentPhaseV1::Dead);
        let fatal_step = episode.transcript().last().unwrap();
        assert!(
            fatal_step.calculated_risk,
            "the gamble is recorded as a calculated risk, not certainty"
        );
    }

    #[test]
    fn agent_shoots_a_pinned_wumpus() {
        // Wumpus in the center, no pits: stench from two visited cells pins
        // it, and the gold beyond becomes reachable after the kill.
        let definition = WumpusDefinition {
            size: 3,
            entry: Position::new(0, 0),
            wumpus: Position::new(1, 1),
            pits: vec![],
            gold: Position::new(2, 2),
        };
        let mut episode = WumpusEpisode::new(definition).unwrap();
        let outcome = episode.run_to_completion();

        assert!(episode
            .transcript()
            .iter()
            .any(|s| matches!(s.action, AgentActionV1::Shoot(_))));
        assert!(episode.knowledge().wumpus_dead());
        assert!(!episode.environment().wumpus_alive());
        assert_eq!(outcome, EpisodeOutcomeV1::ClimbedOut { has_gold: true });
    }

    #[test]
    fn shooting_step_is_recorded_in_shooting_phase() {
        let definition = WumpusDefinition {
            size: 3,
            entry: Position::new(0, 0),
            wumpus: Position::new(1, 1),
            pits: vec![],
            gold: Position::new(2, 2),
        };
        let mut episode = WumpusEpisode::new(definition).unwrap();
        let _ = episode.run_to_completion();
        let shot = episode
            .transcript()
            .iter()
            .find(|s| matches!(s.action, AgentActionV1::Shoot(_)))
            .expect("a shot was fired");
        assert_eq!(shot.phase, AgentPhaseV1::ShootingDecision);
    }

    #[test]
    fn transcripts_are_deterministic() {
        let actions = |episode: &WumpusEpisode| -> Vec<AgentActionV1> {
            episode.transcript().iter().map(|s| s.action).collect()
        };
        let mut a = WumpusEpisode::new(open_arena()).unwrap();
        let mut b = WumpusEpisode::new(open_arena()).unwrap();
        let outcome_a = a.run_to_completion();
        let outcome_b = b.run_to_completion();
        assert_eq!(outcome_a, outcome_b);
        assert_eq!(actions(&a), actions(&b));
    }

    #[test]
    fn advance_is_idempotent_after_the_end() {
        let mut episode = WumpusEpisode::new(open_arena()).unwrap();
        let outcome = episode.run_to_completion();
        let steps_taken = episode.transcript().len();
        assert_eq!(
            episode.advance(),
            EpisodeStatusV1::Finished(outcome),
            "a finished episode only reports its outcome"
        );
        assert_eq!(episode.transcript().len(), steps_taken);
    }

    #[test]
    fn aim_requires_alignment() {
        let from = Position::new(1, 1);
        assert_eq!(
            aim_direction(from, Position::new(1, 3)),
            Some(Direction::Right)
        );
        assert_eq!(aim_direction(from, Position::new(0, 1)), Some(Direction::Up));
        assert_eq!(aim_direction(from, Position::new(2, 2)), None);
        assert_eq!(aim_direction(from, from), None);
    }
}
