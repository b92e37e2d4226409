//! Search world contract trait.

use crate::error::SearchError;

/// One successor of a state: the action taken, the state it produces, and
/// its step cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessorV1<S, A> {
    pub action: A,
    pub state: S,
    pub cost: i64,
}

/// Trait for worlds that support search.
///
/// A world supplies the root state, the successor function, the goal test,
/// and canonical identity bytes per state. The run loop owns everything
/// else: frontier ordering, dedup, budgets, trace recording.
///
/// # Contract
///
/// - `successors` must be total over reachable states, finite, and
///   deterministic: same state → same successors in the same order. The
///   declared order is the exploration order for FIFO search, so it is part
///   of the world's observable behavior.
/// - `state_key` must injectively encode state identity: two states compare
///   equal exactly when their key bytes are equal.
/// - `heuristic` must never exceed the true remaining cost (admissible) for
///   best-first search to return minimum-cost paths. The default is 0,
///   which is always admissible.
pub trait SearchWorldV1 {
    /// A configuration of the puzzle. Immutable value object.
    type State: Clone + std::fmt::Debug;
    /// The move that transforms one state into another.
    type Action: Clone + std::fmt::Debug;

    /// Unique world identifier (e.g., `"maze:v1"`).
    fn world_id(&self) -> &str;

    /// The initial state of this world.
    fn root_state(&self) -> Self::State;

    /// Reject a malformed root before any expansion happens.
    ///
    /// Worlds constructed from validated definitions rarely need this; the
    /// default accepts everything.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRoot`] — never from the default impl.
    fn validate_root(&self, _root: &Self::State) -> Result<(), SearchError> {
        Ok(())
    }

    /// Enumerate all legal successors of the given state, in the world's
    /// declared (deterministic) order.
    fn successors(&self, state: &Self::State) -> Vec<SuccessorV1<Self::State, Self::Action>>;

    /// Test whether the given state satisfies the world's goal.
    fn is_goal(&self, state: &Self::State) -> bool;

    /// Admissible estimate of remaining cost. Default: 0.
    fn heuristic(&self, _state: &Self::State) -> i64 {
        0
    }

    /// Canonical identity bytes for visited-set fingerprinting.
    fn state_key(&self, state: &Self::State) -> Vec<u8>;

    /// Human-readable action label for trace artifacts.
    fn action_label(&self, action: &Self::Action) -> String;
}
