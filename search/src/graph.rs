//! `SearchGraphV1`: expansion-event audit log.
//!
//! The normative decision surface is the ordered list of `ExpandEventV1`
//! entries — one per frontier pop, exactly the sequence a caller observes
//! through `advance()`. Node summaries are a derived index for path
//! reconstruction and sweep animation.

/// The complete search audit trail.
#[derive(Debug, Clone)]
pub struct SearchGraphV1 {
    /// Ordered expansion events (normative decision surface).
    pub expansions: Vec<ExpandEventV1>,
    /// Derived node index sorted by `node_id` ascending.
    pub node_summaries: Vec<NodeSummaryV1>,
    /// Aggregate metadata.
    pub metadata: SearchGraphMetadata,
}

/// A single frontier-pop + successor-expansion event.
#[derive(Debug, Clone)]
pub struct ExpandEventV1 {
    /// Total order of frontier pops.
    pub expansion_order: u64,
    /// The node being expanded.
    pub node_id: u64,
    /// Hex fingerprint of the expanded node's state.
    pub state_fingerprint: String,
    /// The frontier key at time of pop.
    pub frontier_pop_key: FrontierPopKeyV1,
    /// Ordered successor decision log (world-declared order).
    pub candidates: Vec<CandidateRecordV1>,
    /// True if this expansion produced zero children.
    pub dead_end: bool,
}

/// The frontier ordering key recorded at pop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierPopKeyV1 {
    pub f_cost: i64,
    pub creation_order: u64,
}

/// A successor with its outcome recorded in the graph.
#[derive(Debug, Clone)]
pub struct CandidateRecordV1 {
    /// Index in the world-declared successor list.
    pub index: u64,
    /// The action's trace label.
    pub action: String,
    /// The action's step cost.
    pub cost: i64,
    /// What happened when this successor was processed.
    pub outcome: CandidateOutcomeV1,
}

/// Outcome of processing a successor during expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcomeV1 {
    /// Created a new node.
    Applied { to_node: u64 },
    /// State already visited (first-seen-wins dedup).
    DuplicateSuppressed { existing_fingerprint: String },
    /// Skipped because the child would exceed `max_depth`.
    SkippedByDepthLimit,
    /// Evaluation was interrupted by a caught world-callback panic.
    NotEvaluated,
}

/// Derived node summary for path reconstruction.
#[derive(Debug, Clone)]
pub struct NodeSummaryV1 {
    pub node_id: u64,
    pub parent_id: Option<u64>,
    pub state_fingerprint: String,
    pub depth: u32,
    pub f_cost: i64,
    pub is_goal: bool,
    pub expansion_order: Option<u64>,
}

/// Aggregate metadata.
#[derive(Debug, Clone)]
pub struct SearchGraphMetadata {
    pub world_id: String,
    pub strategy: String,
    pub root_state_fingerprint: String,

    // Counters
    pub total_expansions: u64,
    pub total_candidates_generated: u64,
    pub total_duplicates_suppressed: u64,
    pub total_dead_ends: u64,
    pub frontier_high_water: u64,

    /// Why the search stopped; `None` while the run is still in flight.
    pub termination_reason: Option<TerminationReasonV1>,
}

/// Why the search terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReasonV1 {
    /// Search found a goal state.
    GoalReached { node_id: u64 },
    /// Frontier emptied without finding a goal — the not-found result.
    FrontierExhausted,
    /// `max_expansions` budget was hit.
    ExpansionBudgetExceeded,
    /// `max_frontier_size` budget was hit.
    FrontierBudgetExceeded,
    /// A panic was caught in a world callback.
    InternalPanic { stage: PanicStageV1 },
}

impl TerminationReasonV1 {
    /// Stable label used in derived artifacts.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::GoalReached { .. } => "goal_reached",
            Self::FrontierExhausted => "frontier_exhausted",
            Self::ExpansionBudgetExceeded => "expansion_budget_exceeded",
            Self::FrontierBudgetExceeded => "frontier_budget_exceeded",
            Self::InternalPanic { .. } => "internal_panic",
        }
    }
}

/// Stage at which a panic was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicStageV1 {
    /// `SearchWorldV1::successors()` panicked.
    Successors,
    /// `SearchWorldV1::heuristic()` panicked.
    Heuristic,
    /// `SearchWorldV1::is_goal()` panicked on the root node.
    IsGoalRoot,
    /// `SearchWorldV1::is_goal()` panicked during expansion.
    IsGoalExpansion,
}

// ---------------------------------------------------------------------------
// Canonical JSON serialization
// ---------------------------------------------------------------------------

impl SearchGraphV1 {
    /// Serialize the graph to canonical JSON bytes.
    ///
    /// Uses `parlor_kernel::canon::canonical_json_bytes` for deterministic
    /// output (sorted keys, compact separators).
    ///
    /// # Errors
    ///
    /// Returns [`parlor_kernel::canon::CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, parlor_kernel::canon::CanonError> {
        let value = self.to_json_value();
        parlor_kernel::canon::canonical_json_bytes(&value)
    }

    /// Convert to a `serde_json::Value` for canonical serialization.
    #[must_use]
    fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "expansions": self.expansions.iter().map(expand_event_to_json).collect::<Vec<_>>(),
            "metadata": metadata_to_json(&self.metadata),
            "node_summaries": self.node_summaries.iter().map(node_summary_to_json).collect::<Vec<_>>(),
        })
    }
}

fn expand_event_to_json(e: &ExpandEventV1) -> serde_json::Value {
    serde_json::json!({
        "candidates": e.candidates.iter().map(candidate_record_to_json).collect::<Vec<_>>(),
        "dead_end": e.dead_end,
        "expansion_order": e.expansion_order,
        "frontier_pop_key": {
            "creation_order": e.frontier_pop_key.creation_order,
            "f_cost": e.frontier_pop_key.f_cost,
        },
        "node_id": e.node_id,
        "state_fingerprint": e.state_fingerprint,
    })
}

fn candidate_record_to_json(r: &CandidateRecordV1) -> serde_json::Value {
    serde_json::json!({
        "action": r.action,
        "cost": r.cost,
        "index": r.index,
        "outcome": outcome_to_json(&r.outcome),
    })
}

fn outcome_to_json(o: &CandidateOutcomeV1) -> serde_json::Value {
    match o {
        CandidateOutcomeV1::Applied { to_node } => {
            serde_json::json!({"to_node": to_node, "type": "applied"})
        }
        CandidateOutcomeV1::DuplicateSuppressed {
            existing_fingerprint,
        } => {
            serde_json::json!({"existing_fingerprint": existing_fingerprint, "type": "duplicate_suppressed"})
        }
        CandidateOutcomeV1::SkippedByDepthLimit => {
            serde_json::json!({"type": "skipped_by_depth_limit"})
        }
        CandidateOutcomeV1::NotEvaluated => {
            serde_json::json!({"type": "not_evaluated"})
        }
    }
}

fn node_summary_to_json(n: &NodeSummaryV1) -> serde_json::Value {
    serde_json::json!({
        "depth": n.depth,
        "expansion_order": n.expansion_order,
        "f_cost": n.f_cost,
        "is_goal": n.is_goal,
        "node_id": n.node_id,
        "parent_id": n.parent_id,
        "state_fingerprint": n.state_fingerprint,
    })
}

fn metadata_to_json(m: &SearchGraphMetadata) -> serde_json::Value {
    serde_json::json!({
        "frontier_high_water": m.frontier_high_water,
        "root_state_fingerprint": m.root_state_fingerprint,
        "strategy": m.strategy,
        "termination_reason": m.termination_reason.as_ref().map(termination_reason_to_json),
        "total_candidates_generated": m.total_candidates_generated,
        "total_dead_ends": m.total_dead_ends,
        "total_duplicates_suppressed": m.total_duplicates_suppressed,
        "total_expansions": m.total_expansions,
        "world_id": m.world_id,
    })
}

fn termination_reason_to_json(r: &TerminationReasonV1) -> serde_json::Value {
    match r {
        TerminationReasonV1::GoalReached { node_id } => {
            serde_json::json!({"node_id": node_id, "type": "goal_reached"})
        }
        TerminationReasonV1::FrontierExhausted => serde_json::json!({"type": "frontier_exhausted"}),
        TerminationReasonV1::ExpansionBudgetExceeded => {
            serde_json::json!({"type": "expansion_budget_exceeded"})
        }
        TerminationReasonV1::FrontierBudgetExceeded => {
            serde_json::json!({"type": "frontier_budget_exceeded"})
        }
        TerminationReasonV1::InternalPanic { stage } => {
            serde_json::json!({"stage": panic_stage_str(*stage), "type": "internal_panic"})
        }
    }
}

fn panic_stage_str(s: PanicStageV1) -> &'static str {
    match s {
        PanicStageV1::Successors => "successors",
        PanicStageV1::Heuristic => "heuristic",
        PanicStageV1::IsGoalRoot => "is_goal_root",
        PanicStageV1::IsGoalExpansion => "is_goal_expansion",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_graph(termination_reason: Option<TerminationReasonV1>) -> SearchGraphV1 {
        SearchGraphV1 {
            expansions: Vec::new(),
            node_summaries: Vec::new(),
            metadata: SearchGraphMetadata {
                world_id: "test".into(),
                strategy: "bfs".into(),
                root_state_fingerprint: "root_fp".into(),
                total_expansions: 0,
                total_candidates_generated: 0,
                total_duplicates_suppressed: 0,
                total_dead_ends: 0,
                frontier_high_water: 0,
                termination_reason,
            },
        }
    }

    #[test]
    fn canonical_json_is_deterministic() {
        let graph = empty_graph(Some(TerminationReasonV1::FrontierExhausted));
        let bytes1 = graph.to_canonical_json_bytes().unwrap();
        let bytes2 = graph.to_canonical_json_bytes().unwrap();
        assert_eq!(bytes1, bytes2, "canonical JSON must be deterministic");

        let parsed: serde_json::Value = serde_json::from_slice(&bytes1).unwrap();
        assert!(parsed.is_object());
    }

    #[test]
    fn in_flight_graph_serializes_null_termination() {
        let graph = empty_graph(None);
        let bytes = graph.to_canonical_json_bytes().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed["metadata"]["termination_reason"].is_null());
    }

    #[test]
    fn termination_reason_serializes_correctly() {
        let goal = termination_reason_to_json(&TerminationReasonV1::GoalReached { node_id: 42 });
        assert_eq!(goal["type"], "goal_reached");
        assert_eq!(goal["node_id"], 42);

        let exhausted = termination_reason_to_json(&TerminationReasonV1::FrontierExhausted);
        assert_eq!(exhausted["type"], "frontier_exhausted");

        let panic = termination_reason_to_json(&TerminationReasonV1::InternalPanic {
            stage: PanicStageV1::Successors,
        });
        assert_eq!(panic["type"], "internal_panic");
        assert_eq!(panic["stage"], "successors");
    }

    #[test]
    fn outcome_serializes_correctly() {
        let applied = outcome_to_json(&CandidateOutcomeV1::Applied { to_node: 3 });
        assert_eq!(applied["type"], "applied");
        assert_eq!(applied["to_node"], 3);

        let dup = outcome_to_json(&CandidateOutcomeV1::DuplicateSuppressed {
            existing_fingerprint: "ab".into(),
        });
        assert_eq!(dup["type"], "duplicate_suppressed");

        let skipped = outcome_to_json(&CandidateOutcomeV1::SkippedByDepthLimit);
        assert_eq!(skipped["type"], "skipped_by_depth_limit");
    }
}
