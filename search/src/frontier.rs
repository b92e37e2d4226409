//! Frontier disciplines and the visited set.
//!
//! One surface, three orderings: FIFO (breadth-first), LIFO (depth-first),
//! and best-first (lowest `f_cost`, insertion-order ties). Uses a
//! `BTreeSet`-based visited set (not `HashSet`) for deterministic iteration
//! order at serialization boundaries.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

use crate::node::{FrontierKey, SearchNodeV1};
use crate::policy::StrategyV1;

/// A best-first entry wrapping a node with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<FrontierKey>` to get
/// min-heap behavior (lowest `f_cost` first).
#[derive(Debug)]
struct FrontierEntry<S, A> {
    key: Reverse<FrontierKey>,
    node: SearchNodeV1<S, A>,
}

impl<S, A> PartialEq for FrontierEntry<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<S, A> Eq for FrontierEntry<S, A> {}

impl<S, A> PartialOrd for FrontierEntry<S, A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, A> Ord for FrontierEntry<S, A> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// The pending-node collection behind a strategy.
#[derive(Debug)]
enum Queue<S, A> {
    Fifo(VecDeque<SearchNodeV1<S, A>>),
    Lifo(Vec<SearchNodeV1<S, A>>),
    BestFirst(BinaryHeap<FrontierEntry<S, A>>),
}

/// Frontier manager: pending nodes plus the visited set.
///
/// Maintains:
/// - A strategy-ordered queue of discovered-but-unexpanded nodes
/// - A `BTreeSet<String>` of visited state fingerprint hex digests
/// - A high-water mark of the queue size
///
/// The visited set is marked when a state is *discovered* (first-seen-wins),
/// so no state is ever enqueued — or expanded — twice, under any strategy.
pub struct Frontier<S, A> {
    queue: Queue<S, A>,
    visited: BTreeSet<String>,
    high_water: u64,
}

impl<S, A> Frontier<S, A> {
    /// Create an empty frontier ordered for `strategy`.
    #[must_use]
    pub fn for_strategy(strategy: StrategyV1) -> Self {
        let queue = match strategy {
            StrategyV1::Bfs => Queue::Fifo(VecDeque::new()),
            StrategyV1::Dfs => Queue::Lifo(Vec::new()),
            StrategyV1::AStar => Queue::BestFirst(BinaryHeap::new()),
        };
        Self {
            queue,
            visited: BTreeSet::new(),
            high_water: 0,
        }
    }

    /// Mark a fingerprint as visited.
    ///
    /// Returns `false` if it was already visited (first-seen-wins dedup).
    pub fn mark_visited(&mut self, fingerprint_hex: &str) -> bool {
        self.visited.insert(fingerprint_hex.to_string())
    }

    /// Check if a fingerprint has been visited.
    #[must_use]
    pub fn is_visited(&self, fingerprint_hex: &str) -> bool {
        self.visited.contains(fingerprint_hex)
    }

    /// Enqueue a node. The caller marks its fingerprint visited first;
    /// enqueue itself never dedups.
    pub fn enqueue(&mut self, node: SearchNodeV1<S, A>) {
        match &mut self.queue {
            Queue::Fifo(queue) => queue.push_back(node),
            Queue::Lifo(stack) => stack.push(node),
            Queue::BestFirst(heap) => {
                let key = Reverse(FrontierKey::from(&node));
                heap.push(FrontierEntry { key, node });
            }
        }
        let size = self.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
    }

    /// Remove and return the next node under the frontier's strategy.
    #[must_use]
    pub fn pop(&mut self) -> Option<SearchNodeV1<S, A>> {
        match &mut self.queue {
            Queue::Fifo(queue) => queue.pop_front(),
            Queue::Lifo(stack) => stack.pop(),
            Queue::BestFirst(heap) => heap.pop().map(|e| e.node),
        }
    }

    /// Current frontier size.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.queue {
            Queue::Fifo(queue) => queue.len(),
            Queue::Lifo(stack) => stack.len(),
            Queue::BestFirst(heap) => heap.len(),
        }
    }

    /// Whether the frontier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.queue {
            Queue::Fifo(queue) => queue.is_empty(),
            Queue::Lifo(stack) => stack.is_empty(),
            Queue::BestFirst(heap) => heap.is_empty(),
        }
    }

    /// High-water mark of frontier size.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Number of distinct fingerprints marked visited.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
