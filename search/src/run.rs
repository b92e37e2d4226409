//! Step-wise search run: one frontier pop per `advance()` call.
//!
//! A [`SearchRun`] owns its world, frontier, node arena, and trace — there
//! is no ambient state, so any number of runs proceed independently. The
//! caller drives the run by pulling: each `advance()` performs exactly one
//! expansion and reports whether to keep going. Cancellation is simply
//! dropping the run.
//!
//! All runtime terminations (including caught world-callback panics and
//! budget exhaustion) leave the trace intact; [`SearchRun::graph`] is
//! available at any point, terminal or not.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parlor_kernel::fingerprint::{canonical_hash, ContentHash, HashDomain};

use crate::contract::SearchWorldV1;
use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::graph::{
    CandidateOutcomeV1, CandidateRecordV1, ExpandEventV1, FrontierPopKeyV1, NodeSummaryV1,
    PanicStageV1, SearchGraphMetadata, SearchGraphV1, TerminationReasonV1,
};
use crate::node::SearchNodeV1;
use crate::policy::{SearchPolicyV1, StrategyV1};

/// Result of one `advance()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatusV1 {
    /// One node was expanded; more work remains.
    Continuing { expanded: u64, frontier_len: usize },
    /// A goal state was reached.
    Found { goal_node: u64 },
    /// The run ended without a goal; the reason says why.
    NotFound { reason: TerminationReasonV1 },
}

/// One step of a reconstructed solution path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStepV1<S, A> {
    pub state: S,
    /// The action that produced this state; `None` for the root.
    pub action: Option<A>,
}

/// A reconstructed root-to-goal path with its total cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionV1<S, A> {
    pub steps: Vec<PathStepV1<S, A>>,
    pub cost: i64,
}

/// An owned, step-wise search run.
pub struct SearchRun<W: SearchWorldV1> {
    world: W,
    policy: SearchPolicyV1,
    frontier: Frontier<W::State, W::Action>,
    /// All nodes created during the run, indexed by `node_id`.
    nodes: Vec<SearchNodeV1<W::State, W::Action>>,
    expansions: Vec<ExpandEventV1>,
    /// `node_id` → index into `expansions` for the event that expanded it.
    expansion_index: HashMap<u64, usize>,
    next_creation_order: u64,
    expansion_count: u64,
    total_candidates_generated: u64,
    total_duplicates_suppressed: u64,
    total_dead_ends: u64,
    root_fingerprint_hex: String,
    termination: Option<TerminationReasonV1>,
}

impl<W: SearchWorldV1> SearchRun<W> {
    /// Create a run over `world`.
    ///
    /// Validates the policy and the root state, fingerprints the root, and
    /// handles the root-is-goal case immediately (zero-length path). A
    /// panicking `is_goal`/`heuristic` on the root produces a run already
    /// terminated with `InternalPanic` — never an unwind.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] for an invalid policy or a root the world
    /// rejects. No trace is produced; no search step was taken.
    pub fn new(world: W, policy: SearchPolicyV1) -> Result<Self, SearchError> {
        policy.validate()?;
        let root_state = world.root_state();
        world.validate_root(&root_state)?;
        let root_fp = canonical_hash(HashDomain::SearchNode, &world.state_key(&root_state));
        let root_fp_hex = root_fp.hex_digest().to_string();

        let mut run = Self {
            frontier: Frontier::for_strategy(policy.strategy),
            nodes: Vec::new(),
            expansions: Vec::new(),
            expansion_index: HashMap::new(),
            next_creation_order: 0,
            expansion_count: 0,
            total_candidates_generated: 0,
            total_duplicates_suppressed: 0,
            total_dead_ends: 0,
            root_fingerprint_hex: root_fp_hex,
            termination: None,
            world,
            policy,
        };

        let root_is_goal = {
            let world = &run.world;
            catch_unwind(AssertUnwindSafe(|| world.is_goal(&root_state)))
        };
        match root_is_goal {
            Err(_) => {
                run.create_root(root_state, root_fp, 0);
                run.termination = Some(TerminationReasonV1::InternalPanic {
                    stage: PanicStageV1::IsGoalRoot,
                });
                return Ok(run);
            }
            Ok(true) => {
                run.create_root(root_state, root_fp, 0);
                run.termination = Some(TerminationReasonV1::GoalReached { node_id: 0 });
                return Ok(run);
            }
            Ok(false) => {}
        }

        let root_h = {
            let world = &run.world;
            catch_unwind(AssertUnwindSafe(|| world.heuristic(&root_state)))
        };
        let Ok(root_h) = root_h else {
            run.create_root(root_state, root_fp, 0);
            run.termination = Some(TerminationReasonV1::InternalPanic {
                stage: PanicStageV1::Heuristic,
            });
            return Ok(run);
        };

        run.create_root(root_state, root_fp, root_h);
        let root_hex = run.root_fingerprint_hex.clone();
        run.frontier.mark_visited(&root_hex);
        run.frontier.enqueue(run.nodes[0].clone());
        Ok(run)
    }

    fn create_root(&mut self, state: W::State, fingerprint: ContentHash, h_cost: i64) {
        let node = SearchNodeV1 {
            node_id: 0,
            parent_id: None,
            state,
            state_fingerprint: fingerprint,
            depth: 0,
            g_cost: 0,
            h_cost,
            creation_order: self.next_creation_order,
            producing_action: None,
        };
        self.next_creation_order += 1;
        self.nodes.push(node);
    }

    /// Perform one expansion and report the run's status.
    ///
    /// Idempotent once terminal: calling `advance()` on a finished run
    /// returns the same terminal status again.
    pub fn advance(&mut self) -> StepStatusV1 {
        if let Some(reason) = &self.termination {
            return Self::terminal_status(reason);
        }
        if self.frontier.is_empty() {
            return self.terminate(TerminationReasonV1::FrontierExhausted);
        }
        if self.expansion_count >= self.policy.max_expansions {
            return self.terminate(TerminationReasonV1::ExpansionBudgetExceeded);
        }
        if self.frontier.len() as u64 > self.policy.max_frontier_size {
            return self.terminate(TerminationReasonV1::FrontierBudgetExceeded);
        }

        // Frontier was checked non-empty above.
        let Some(current) = self.frontier.pop() else {
            return self.terminate(TerminationReasonV1::FrontierExhausted);
        };
        let current_fp_hex = current.state_fingerprint.hex_digest().to_string();
        let pop_key = FrontierPopKeyV1 {
            f_cost: current.f_cost(),
            creation_order: current.creation_order,
        };

        // Enumerate successors (with panic protection).
        let successors_result = {
            let world = &self.world;
            catch_unwind(AssertUnwindSafe(|| world.successors(&current.state)))
        };
        let Ok(successors) = successors_result else {
            self.record_event(current.node_id, current_fp_hex, pop_key, Vec::new(), false);
            return self.terminate(TerminationReasonV1::InternalPanic {
                stage: PanicStageV1::Successors,
            });
        };

        self.total_candidates_generated += successors.len() as u64;

        let mut records: Vec<CandidateRecordV1> = Vec::with_capacity(successors.len());
        let mut created: Vec<u64> = Vec::new();
        let mut found_goal: Option<u64> = None;

        for (index, successor) in successors.into_iter().enumerate() {
            let index = index as u64;
            let action_label = self.world.action_label(&successor.action);

            // Depth cutoff: the child is not created.
            if current.depth + 1 > self.policy.max_depth {
                records.push(CandidateRecordV1 {
                    index,
                    action: action_label,
                    cost: successor.cost,
                    outcome: CandidateOutcomeV1::SkippedByDepthLimit,
                });
                continue;
            }

            let child_fp = canonical_hash(
                HashDomain::SearchNode,
                &self.world.state_key(&successor.state),
            );
            let child_fp_hex = child_fp.hex_digest().to_string();

            // First-seen-wins dedup: a state is marked at discovery, so it
            // can never be enqueued or expanded twice under any strategy.
            if !self.frontier.mark_visited(&child_fp_hex) {
                self.total_duplicates_suppressed += 1;
                records.push(CandidateRecordV1 {
                    index,
                    action: action_label,
                    cost: successor.cost,
                    outcome: CandidateOutcomeV1::DuplicateSuppressed {
                        existing_fingerprint: child_fp_hex,
                    },
                });
                continue;
            }

            let h_result = {
                let world = &self.world;
                catch_unwind(AssertUnwindSafe(|| world.heuristic(&successor.state)))
            };
            let Ok(h_cost) = h_result else {
                records.push(CandidateRecordV1 {
                    index,
                    action: action_label,
                    cost: successor.cost,
                    outcome: CandidateOutcomeV1::NotEvaluated,
                });
                self.enqueue_created(&created);
                self.record_event(current.node_id, current_fp_hex, pop_key, records, false);
                return self.terminate(TerminationReasonV1::InternalPanic {
                    stage: PanicStageV1::Heuristic,
                });
            };

            let child_id = self.nodes.len() as u64;
            let child = SearchNodeV1 {
                node_id: child_id,
                parent_id: Some(current.node_id),
                state: successor.state,
                state_fingerprint: child_fp,
                depth: current.depth + 1,
                g_cost: current.g_cost.saturating_add(successor.cost),
                h_cost,
                creation_order: self.next_creation_order,
                producing_action: Some(successor.action),
            };
            self.next_creation_order += 1;

            records.push(CandidateRecordV1 {
                index,
                action: action_label,
                cost: successor.cost,
                outcome: CandidateOutcomeV1::Applied { to_node: child_id },
            });

            // Goal check before enqueueing (with panic protection).
            let goal_result = {
                let world = &self.world;
                catch_unwind(AssertUnwindSafe(|| world.is_goal(&child.state)))
            };
            match goal_result {
                Ok(true) => {
                    if found_goal.is_none() {
                        found_goal = Some(child_id);
                    }
                }
                Ok(false) => {}
                Err(_) => {
                    self.nodes.push(child);
                    created.push(child_id);
                    self.enqueue_created(&created);
                    self.record_event(current.node_id, current_fp_hex, pop_key, records, false);
                    return self.terminate(TerminationReasonV1::InternalPanic {
                        stage: PanicStageV1::IsGoalExpansion,
                    });
                }
            }

            self.nodes.push(child);
            created.push(child_id);
        }

        let dead_end = created.is_empty();
        if dead_end {
            self.total_dead_ends += 1;
        }

        self.enqueue_created(&created);
        self.record_event(current.node_id, current_fp_hex, pop_key, records, dead_end);

        if let Some(goal_node) = found_goal {
            self.termination = Some(TerminationReasonV1::GoalReached { node_id: goal_node });
            return StepStatusV1::Found { goal_node };
        }

        StepStatusV1::Continuing {
            expanded: current.node_id,
            frontier_len: self.frontier.len(),
        }
    }

    /// Drive `advance()` until the run terminates; the one-shot solve.
    pub fn run_to_completion(&mut self) -> StepStatusV1 {
        loop {
            let status = self.advance();
            if !matches!(status, StepStatusV1::Continuing { .. }) {
                return status;
            }
        }
    }

    /// The reconstructed root-to-goal path, if a goal was reached.
    ///
    /// Steps are ordered root first; each step carries the action that
    /// produced it (`None` for the root). Cost is the goal node's `g_cost`.
    #[must_use]
    pub fn solution(&self) -> Option<SolutionV1<W::State, W::Action>> {
        let TerminationReasonV1::GoalReached { node_id } = self.termination.as_ref()? else {
            return None;
        };
        let mut ids = Vec::new();
        let mut cursor = Some(*node_id);
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.nodes.get(usize::try_from(id).ok()?)?.parent_id;
        }
        ids.reverse();

        let cost = self.nodes[usize::try_from(*node_id).ok()?].g_cost;
        let steps = ids
            .into_iter()
            .map(|id| {
                let node = &self.nodes[id as usize];
                PathStepV1 {
                    state: node.state.clone(),
                    action: node.producing_action.clone(),
                }
            })
            .collect();
        Some(SolutionV1 { steps, cost })
    }

    /// Build the expansion-trace artifact. Available at any point of the
    /// run; `termination_reason` is `None` while still in flight.
    #[must_use]
    pub fn graph(&self) -> SearchGraphV1 {
        let mut node_summaries: Vec<NodeSummaryV1> = self
            .nodes
            .iter()
            .map(|n| {
                let expansion_order = self
                    .expansion_index
                    .get(&n.node_id)
                    .map(|&i| self.expansions[i].expansion_order);
                let is_goal = matches!(
                    &self.termination,
                    Some(TerminationReasonV1::GoalReached { node_id }) if *node_id == n.node_id
                );
                NodeSummaryV1 {
                    node_id: n.node_id,
                    parent_id: n.parent_id,
                    state_fingerprint: n.state_fingerprint.hex_digest().to_string(),
                    depth: n.depth,
                    f_cost: n.f_cost(),
                    is_goal,
                    expansion_order,
                }
            })
            .collect();
        node_summaries.sort_by_key(|n| n.node_id);

        SearchGraphV1 {
            expansions: self.expansions.clone(),
            node_summaries,
            metadata: SearchGraphMetadata {
                world_id: self.world.world_id().to_string(),
                strategy: self.policy.strategy.label().to_string(),
                root_state_fingerprint: self.root_fingerprint_hex.clone(),
                total_expansions: self.expansion_count,
                total_candidates_generated: self.total_candidates_generated,
                total_duplicates_suppressed: self.total_duplicates_suppressed,
                total_dead_ends: self.total_dead_ends,
                frontier_high_water: self.frontier.high_water(),
                termination_reason: self.termination.clone(),
            },
        }
    }

    /// The world this run searches.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// All nodes created so far, indexed by `node_id`.
    pub fn nodes(&self) -> &[SearchNodeV1<W::State, W::Action>] {
        &self.nodes
    }

    /// The node with the given id, if created.
    #[must_use]
    pub fn node(&self, node_id: u64) -> Option<&SearchNodeV1<W::State, W::Action>> {
        self.nodes.get(usize::try_from(node_id).ok()?)
    }

    /// Expansions performed so far.
    #[must_use]
    pub fn expansion_count(&self) -> u64 {
        self.expansion_count
    }

    /// Why the run stopped, once it has.
    #[must_use]
    pub fn termination(&self) -> Option<&TerminationReasonV1> {
        self.termination.as_ref()
    }

    /// True once the run has reached a terminal status.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    // LIFO pops last-enqueued first; enqueue in reverse so the
    // first-declared successor is the next one expanded.
    fn enqueue_created(&mut self, created: &[u64]) {
        let forward = !matches!(self.policy.strategy, StrategyV1::Dfs);
        let ids: Vec<u64> = if forward {
            created.to_vec()
        } else {
            created.iter().rev().copied().collect()
        };
        for id in ids {
            let node = self.nodes[id as usize].clone();
            self.frontier.enqueue(node);
        }
    }

    fn record_event(
        &mut self,
        node_id: u64,
        state_fingerprint: String,
        frontier_pop_key: FrontierPopKeyV1,
        candidates: Vec<CandidateRecordV1>,
        dead_end: bool,
    ) {
        self.expansions.push(ExpandEventV1 {
            expansion_order: self.expansion_count,
            node_id,
            state_fingerprint,
            frontier_pop_key,
            candidates,
            dead_end,
        });
        self.expansion_index
            .insert(node_id, self.expansions.len() - 1);
        self.expansion_count += 1;
    }

    fn terminate(&mut self, reason: TerminationReasonV1) -> StepStatusV1 {
        let status = Self::terminal_status(&reason);
        self.termination = Some(reason);
        status
    }

    fn terminal_status(reason: &TerminationReasonV1) -> StepStatusV1 {
        match reason {
            TerminationReasonV1::GoalReached { node_id } => StepStatusV1::Found {
                goal_node: *node_id,
            },
            other => StepStatusV1::NotFound {
                reason: other.clone(),
            },
        }
    }
}

/// Create a run, drive it to completion, and return it for inspection.
///
/// # Errors
///
/// Returns [`SearchError`] only for pre-flight validation failures.
pub fn search<W: SearchWorldV1>(
    world: W,
    policy: SearchPolicyV1,
) -> Result<SearchRun<W>, SearchError> {
    let mut run = SearchRun::new(world, policy)?;
    let _ = run.run_to_completion();
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SuccessorV1;
    use std::collections::BTreeSet;

    /// A corridor of cells `0..=length`; moves are +1 and +2 with unit cost.
    /// Goal is `length`. `panic_on` makes `is_goal` panic at that cell.
    struct CorridorWorld {
        length: u32,
        panic_on: Option<u32>,
    }

    impl CorridorWorld {
        fn new(length: u32) -> Self {
            Self {
                length,
                panic_on: None,
            }
        }
    }

    impl SearchWorldV1 for CorridorWorld {
        type State = u32;
        type Action = u32;

        fn world_id(&self) -> &str {
            "corridor:test"
        }

        fn root_state(&self) -> u32 {
            0
        }

        fn successors(&self, state: &u32) -> Vec<SuccessorV1<u32, u32>> {
            [1u32, 2]
                .into_iter()
                .filter(|step| state + step <= self.length)
                .map(|step| SuccessorV1 {
                    action: step,
                    state: state + step,
                    cost: 1,
                })
                .collect()
        }

        fn is_goal(&self, state: &u32) -> bool {
            if Some(*state) == self.panic_on {
                panic!("goal test blew up");
            }
            *state == self.length
        }

        fn state_key(&self, state: &u32) -> Vec<u8> {
            state.to_le_bytes().to_vec()
        }

        fn action_label(&self, action: &u32) -> String {
            format!("step+{action}")
        }
    }

    fn bfs_policy() -> SearchPolicyV1 {
        SearchPolicyV1::for_strategy(StrategyV1::Bfs)
    }

    #[test]
    fn bfs_finds_minimum_step_path() {
        let run = search(CorridorWorld::new(5), bfs_policy()).unwrap();
        let solution = run.solution().expect("corridor is solvable");
        // 5 = 2 + 2 + 1 → three moves.
        assert_eq!(solution.cost, 3);
        assert_eq!(solution.steps.len(), 4, "root plus three moves");
        assert_eq!(solution.steps[0].state, 0);
        assert_eq!(solution.steps[0].action, None);
        assert_eq!(solution.steps.last().unwrap().state, 5);
    }

    #[test]
    fn root_is_goal_yields_zero_length_path() {
        let run = search(CorridorWorld::new(0), bfs_policy()).unwrap();
        let solution = run.solution().unwrap();
        assert_eq!(solution.cost, 0);
        assert_eq!(solution.steps.len(), 1);
        assert_eq!(run.expansion_count(), 0, "no expansion was needed");
    }

    #[test]
    fn dfs_also_reaches_the_goal() {
        let run = search(
            CorridorWorld::new(6),
            SearchPolicyV1::for_strategy(StrategyV1::Dfs),
        )
        .unwrap();
        assert!(run.solution().is_some());
    }

    #[test]
    fn bfs_cost_never_exceeds_dfs_cost() {
        let bfs = search(CorridorWorld::new(9), bfs_policy()).unwrap();
        let dfs = search(
            CorridorWorld::new(9),
            SearchPolicyV1::for_strategy(StrategyV1::Dfs),
        )
        .unwrap();
        let bfs_cost = bfs.solution().unwrap().cost;
        let dfs_cost = dfs.solution().unwrap().cost;
        assert!(bfs_cost <= dfs_cost, "{bfs_cost} > {dfs_cost}");
    }

    #[test]
    fn same_input_same_path() {
        let actions = |run: &SearchRun<CorridorWorld>| -> Vec<Option<u32>> {
            run.solution()
                .unwrap()
                .steps
                .iter()
                .map(|s| s.action)
                .collect()
        };
        let a = search(CorridorWorld::new(8), bfs_policy()).unwrap();
        let b = search(CorridorWorld::new(8), bfs_policy()).unwrap();
        assert_eq!(actions(&a), actions(&b));
    }

    #[test]
    fn no_node_expanded_twice() {
        let run = search(CorridorWorld::new(9), bfs_policy()).unwrap();
        let graph = run.graph();
        let mut seen = BTreeSet::new();
        for event in &graph.expansions {
            assert!(
                seen.insert(event.state_fingerprint.clone()),
                "state expanded twice: {}",
                event.state_fingerprint
            );
        }
    }

    #[test]
    fn expansion_budget_terminates_run() {
        let policy = SearchPolicyV1 {
            max_expansions: 2,
            ..bfs_policy()
        };
        let mut run = SearchRun::new(CorridorWorld::new(100), policy).unwrap();
        let status = run.run_to_completion();
        assert_eq!(
            status,
            StepStatusV1::NotFound {
                reason: TerminationReasonV1::ExpansionBudgetExceeded
            }
        );
    }

    #[test]
    fn depth_limit_skips_children() {
        let policy = SearchPolicyV1 {
            max_depth: 1,
            ..bfs_policy()
        };
        let mut run = SearchRun::new(CorridorWorld::new(50), policy).unwrap();
        let status = run.run_to_completion();
        // Depth 1 reaches cells 1 and 2 only; the goal at 50 is unreachable.
        assert_eq!(
            status,
            StepStatusV1::NotFound {
                reason: TerminationReasonV1::FrontierExhausted
            }
        );
        let graph = run.graph();
        let skipped = graph
            .expansions
            .iter()
            .flat_map(|e| &e.candidates)
            .filter(|c| c.outcome == CandidateOutcomeV1::SkippedByDepthLimit)
            .count();
        assert!(skipped > 0, "children beyond the cutoff must be skipped");
    }

    #[test]
    fn advance_is_idempotent_after_termination() {
        let mut run = SearchRun::new(CorridorWorld::new(3), bfs_policy()).unwrap();
        let terminal = run.run_to_completion();
        assert_eq!(run.advance(), terminal);
        assert_eq!(run.advance(), terminal);
    }

    #[test]
    fn goal_panic_is_contained() {
        let world = CorridorWorld {
            length: 5,
            panic_on: Some(3),
        };
        let mut run = SearchRun::new(world, bfs_policy()).unwrap();
        let status = run.run_to_completion();
        assert_eq!(
            status,
            StepStatusV1::NotFound {
                reason: TerminationReasonV1::InternalPanic {
                    stage: PanicStageV1::IsGoalExpansion
                }
            }
        );
        // The trace survived the panic.
        assert!(!run.graph().expansions.is_empty());
    }

    #[test]
    fn root_goal_panic_is_contained() {
        let world = CorridorWorld {
            length: 5,
            panic_on: Some(0),
        };
        let run = SearchRun::new(world, bfs_policy()).unwrap();
        assert_eq!(
            run.termination(),
            Some(&TerminationReasonV1::InternalPanic {
                stage: PanicStageV1::IsGoalRoot
            })
        );
    }

    #[test]
    fn graph_counters_are_consistent() {
        let run = search(CorridorWorld::new(6), bfs_policy()).unwrap();
        let graph = run.graph();
        assert_eq!(graph.metadata.total_expansions, run.expansion_count());
        let applied = graph
            .expansions
            .iter()
            .flat_map(|e| &e.candidates)
            .filter(|c| matches!(c.outcome, CandidateOutcomeV1::Applied { .. }))
            .count() as u64;
        // Every applied candidate is a created node; plus the root.
        assert_eq!(applied + 1, run.nodes().len() as u64);
    }
}
