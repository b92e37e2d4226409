//! Core search node types.

use parlor_kernel::fingerprint::ContentHash;

/// An immutable search node in the frontier.
///
/// Best-first extraction orders nodes by `(f_cost, creation_order)` where
/// `f_cost = g_cost + h_cost`. Lower is better; ties go to the
/// earliest-created node, so equal-cost paths resolve by insertion order.
#[derive(Debug, Clone)]
pub struct SearchNodeV1<S, A> {
    /// Monotonic node identifier (index into the run's node arena).
    pub node_id: u64,
    /// Parent node ID (`None` for root).
    pub parent_id: Option<u64>,
    /// Full immutable state at this node.
    pub state: S,
    /// Canonical hash of the world's `state_key` bytes.
    pub state_fingerprint: ContentHash,
    /// Tree depth (root = 0).
    pub depth: u32,
    /// Cumulative path cost.
    pub g_cost: i64,
    /// Heuristic estimate (0 unless the world overrides it).
    pub h_cost: i64,
    /// Global counter for deterministic tie-breaking.
    pub creation_order: u64,
    /// The action that produced this node from its parent.
    pub producing_action: Option<A>,
}

impl<S, A> SearchNodeV1<S, A> {
    /// Compute `f_cost = g_cost + h_cost` (the frontier ordering key).
    #[must_use]
    pub fn f_cost(&self) -> i64 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

/// The frontier ordering key: `(f_cost, creation_order)`.
///
/// Lower `f_cost` first; on a tie the earlier-inserted node wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub f_cost: i64,
    pub creation_order: u64,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            .then(self.creation_order.cmp(&other.creation_order))
    }
}

impl<S, A> From<&SearchNodeV1<S, A>> for FrontierKey {
    fn from(node: &SearchNodeV1<S, A>) -> Self {
        Self {
            f_cost: node.f_cost(),
            creation_order: node.creation_order,
        }
    }
}
