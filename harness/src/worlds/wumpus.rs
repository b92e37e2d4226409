//! Wumpus world: hidden-hazard arena, percepts, and the knowledge base.
//!
//! The environment owns the ground truth (where the pits, wumpus, and gold
//! actually are) and computes local percepts. The knowledge base owns the
//! agent's beliefs: a tri-state hazard judgment per cell, updated only by
//! percept evidence. The two never share state — the agent reads the truth
//! exclusively through percepts.
//!
//! Belief monotonicity: `Unsafe` is never downgraded to `Safe` except by an
//! explicit retraction (surviving the cell, or the wumpus dying to an
//! arrow). Inference alone cannot overwrite a hazard mark.

use std::collections::BTreeSet;

use parlor_kernel::definition::{DefinitionError, WumpusDefinition};
use parlor_kernel::position::{Position, ORTHOGONAL_DIRECTIONS};

/// The bundle of signals sensed at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerceptV1 {
    /// A live wumpus is orthogonally adjacent.
    pub stench: bool,
    /// A pit is orthogonally adjacent.
    pub breeze: bool,
    /// The gold is in this cell.
    pub glitter: bool,
    /// The last move struck the arena edge.
    pub bump: bool,
    /// The wumpus was just killed by an arrow (heard everywhere).
    pub scream: bool,
}

/// The hazard kinds an agent can die to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKindV1 {
    Pit,
    Wumpus,
}

impl HazardKindV1 {
    /// Stable label used in transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pit => "pit",
            Self::Wumpus => "wumpus",
        }
    }
}

/// In-bounds orthogonal neighbors of `position` in normative order.
#[must_use]
pub fn orthogonal_neighbors(size: usize, position: Position) -> Vec<Position> {
    ORTHOGONAL_DIRECTIONS
        .iter()
        .filter_map(|&direction| {
            let next = position.step(direction)?;
            (next.row < size && next.col < size).then_some(next)
        })
        .collect()
}

/// The ground-truth arena. Immutable apart from the two one-way events:
/// the wumpus dying and the gold being taken.
pub struct WumpusEnvironment {
    definition: WumpusDefinition,
    wumpus_alive: bool,
    gold_taken: bool,
}

impl WumpusEnvironment {
    /// Validate a definition and build the environment.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] for a malformed arena. Reported before
    /// an episode is created.
    pub fn new(definition: WumpusDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;
        Ok(Self {
            definition,
            wumpus_alive: true,
            gold_taken: false,
        })
    }

    #[must_use]
    pub fn definition(&self) -> &WumpusDefinition {
        &self.definition
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.definition.size
    }

    #[must_use]
    pub fn entry(&self) -> Position {
        self.definition.entry
    }

    #[must_use]
    pub fn wumpus_alive(&self) -> bool {
        self.wumpus_alive
    }

    /// The steady-state percept at `at`. Event signals (`bump`, `scream`)
    /// are layered on by the episode when the events occur.
    #[must_use]
    pub fn perceive(&self, at: Position) -> PerceptV1 {
        let neighbors = orthogonal_neighbors(self.size(), at);
        PerceptV1 {
            stench: self.wumpus_alive && neighbors.contains(&self.definition.wumpus),
            breeze: neighbors.iter().any(|n| self.definition.pits.contains(n)),
            glitter: !self.gold_taken && at == self.definition.gold,
            bump: false,
            scream: false,
        }
    }

    /// The live hazard in `at`, if any. Pits outrank the wumpus: falling
    /// happens before being eaten.
    #[must_use]
    pub fn hazard_at(&self, at: Position) -> Option<HazardKindV1> {
        if self.definition.pits.contains(&at) {
            return Some(HazardKindV1::Pit);
        }
        if self.wumpus_alive && at == self.definition.wumpus {
            return Some(HazardKindV1::Wumpus);
        }
        None
    }

    /// Kill the wumpus (arrow hit). One-way.
    pub fn kill_wumpus(&mut self) {
        self.wumpus_alive = false;
    }

    /// Take the gold if it is in `at`. Returns whether anything was taken.
    pub fn take_gold(&mut self, at: Position) -> bool {
        if !self.gold_taken && at == self.definition.gold {
            self.gold_taken = true;
            return true;
        }
        false
    }
}

/// The agent's judgment about one hazard in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardBelief {
    /// Proven free of this hazard.
    Safe,
    /// Proven to contain this hazard.
    Unsafe,
    /// No conclusive evidence either way.
    Unknown,
}

/// Beliefs about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBeliefV1 {
    pub pit: HazardBelief,
    pub wumpus: HazardBelief,
    pub visited: bool,
}

impl CellBeliefV1 {
    const fn unknown() -> Self {
        Self {
            pit: HazardBelief::Unknown,
            wumpus: HazardBelief::Unknown,
            visited: false,
        }
    }

    /// Proven free of both hazards.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self.pit, HazardBelief::Safe) && matches!(self.wumpus, HazardBelief::Safe)
    }
}

/// Accumulated percept-derived beliefs over the arena.
///
/// Cells are addressed by in-bounds positions; observation logs keep every
/// standing breeze/stench so later evidence can be re-checked against them.
pub struct KnowledgeBase {
    size: usize,
    cells: Vec<CellBeliefV1>,
    breeze_at: BTreeSet<Position>,
    stench_at: BTreeSet<Position>,
    wumpus_dead: bool,
    certain_wumpus: Option<Position>,
}

impl KnowledgeBase {
    /// A fresh knowledge base: everything unknown.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellBeliefV1::unknown(); size * size],
            breeze_at: BTreeSet::new(),
            stench_at: BTreeSet::new(),
            wumpus_dead: false,
            certain_wumpus: None,
        }
    }

    fn index(&self, position: Position) -> usize {
        position.row * self.size + position.col
    }

    /// Beliefs about `position` (must be in bounds).
    #[must_use]
    pub fn belief(&self, position: Position) -> CellBeliefV1 {
        self.cells[self.index(position)]
    }

    /// Proven free of both hazards.
    #[must_use]
    pub fn is_safe(&self, position: Position) -> bool {
        self.belief(position).is_safe()
    }

    #[must_use]
    pub fn is_visited(&self, position: Position) -> bool {
        self.belief(position).visited
    }

    /// The wumpus cell, when exactly one candidate is consistent with every
    /// stench observation so far. `None` once the wumpus is dead.
    #[must_use]
    pub fn wumpus_location_if_certain(&self) -> Option<Position> {
        if self.wumpus_dead {
            return None;
        }
        self.certain_wumpus
    }

    #[must_use]
    pub fn wumpus_dead(&self) -> bool {
        self.wumpus_dead
    }

    /// All proven-safe, unvisited cells in reading order.
    #[must_use]
    pub fn safe_unvisited(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                let position = Position::new(row, col);
                let belief = self.belief(position);
                if belief.is_safe() && !belief.visited {
                    cells.push(position);
                }
            }
        }
        cells
    }

    /// All visited cells in reading order.
    #[must_use]
    pub fn visited_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                let position = Position::new(row, col);
                if self.belief(position).visited {
                    cells.push(position);
                }
            }
        }
        cells
    }

    /// Absorb the percept sensed at `at`, then run inference to fixpoint.
    pub fn record_percept(&mut self, at: Position, percept: &PerceptV1) {
        // Survival in this cell is conclusive: any earlier hazard mark is
        // retracted by the observation itself.
        let index = self.index(at);
        self.cells[index].visited = true;
        self.cells[index].pit = HazardBelief::Safe;
        self.cells[index].wumpus = HazardBelief::Safe;

        if percept.scream {
            self.wumpus_killed();
        }

        let neighbors = orthogonal_neighbors(self.size, at);
        if percept.breeze {
            self.breeze_at.insert(at);
        } else {
            for neighbor in &neighbors {
                self.mark_safe_by_inference(*neighbor, HazardKindV1::Pit);
            }
        }
        if !self.wumpus_dead {
            if percept.stench {
                self.stench_at.insert(at);
            } else {
                for neighbor in &neighbors {
                    self.mark_safe_by_inference(*neighbor, HazardKindV1::Wumpus);
                }
            }
        }

        self.infer();
    }

    /// The arrow connected: retract every wumpus belief. This is the one
    /// sanctioned `Unsafe` → `Safe` transition driven by evidence retraction.
    pub fn wumpus_killed(&mut self) {
        self.wumpus_dead = true;
        self.certain_wumpus = None;
        self.stench_at.clear();
        for cell in &mut self.cells {
            cell.wumpus = HazardBelief::Safe;
        }
    }

    /// Inference-driven safe mark. Refuses to downgrade an `Unsafe` cell:
    /// inference must not silently overwrite hazard evidence.
    fn mark_safe_by_inference(&mut self, position: Position, hazard: HazardKindV1) -> bool {
        let index = self.index(position);
        let slot = match hazard {
            HazardKindV1::Pit => &mut self.cells[index].pit,
            HazardKindV1::Wumpus => &mut self.cells[index].wumpus,
        };
        match slot {
            HazardBelief::Unsafe => false,
            HazardBelief::Safe => false,
            HazardBelief::Unknown => {
                *slot = HazardBelief::Safe;
                true
            }
        }
    }

    /// Evidence-driven hazard mark. Refuses to overwrite a proven-safe cell.
    fn mark_unsafe(&mut self, position: Position, hazard: HazardKindV1) -> bool {
        let index = self.index(position);
        let slot = match hazard {
            HazardKindV1::Pit => &mut self.cells[index].pit,
            HazardKindV1::Wumpus => &mut self.cells[index].wumpus,
        };
        match slot {
            HazardBelief::Safe | HazardBelief::Unsafe => false,
            HazardBelief::Unknown => {
                *slot = HazardBelief::Unsafe;
                true
            }
        }
    }

    /// Constraint sweep to fixpoint.
    ///
    /// - A breeze cell whose neighbors are all pit-safe except one proves
    ///   that one is a pit.
    /// - The unique cell consistent with every stench observation is the
    ///   wumpus.
    fn infer(&mut self) {
        loop {
            let mut changed = false;

            let breeze_cells: Vec<Position> = self.breeze_at.iter().copied().collect();
            for breeze in breeze_cells {
                let candidates: Vec<Position> = orthogonal_neighbors(self.size, breeze)
                    .into_iter()
                    .filter(|n| self.belief(*n).pit != HazardBelief::Safe)
                    .collect();
                if candidates.len() == 1 && self.belief(candidates[0]).pit == HazardBelief::Unknown
                {
                    changed |= self.mark_unsafe(candidates[0], HazardKindV1::Pit);
                }
            }

            if !self.wumpus_dead && !self.stench_at.is_empty() {
                let mut candidates: Option<BTreeSet<Position>> = None;
                for stench in &self.stench_at {
                    let near: BTreeSet<Position> = orthogonal_neighbors(self.size, *stench)
                        .into_iter()
                        .filter(|n| self.belief(*n).wumpus != HazardBelief::Safe)
                        .collect();
                    candidates = Some(match candidates {
                        None => near,
                        Some(set) => set.intersection(&near).copied().collect(),
                    });
                }
                if let Some(candidates) = candidates {
                    if candidates.len() == 1 {
                        if let Some(&cell) = candidates.iter().next() {
                            if self.belief(cell).wumpus == HazardBelief::Unknown {
                                changed |= self.mark_unsafe(cell, HazardKindV1::Wumpus);
                            }
                            if self.certain_wumpus != Some(cell) {
                                self.certain_wumpus = Some(cell);
                                changed = true;
                            }
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }
    }
}
