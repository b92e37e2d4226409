//! Parlor Search: deterministic frontier-based search with an inspectable
//! expansion trace.
//!
//! This crate provides the search layer for the Parlor puzzle engine. It
//! depends only on `parlor_kernel` — it does NOT depend on `parlor_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! parlor_kernel  ←  parlor_search  ←  parlor_harness
//! (state model)     (frontier, run)   (worlds, runner)
//! ```
//!
//! # Key types
//!
//! - [`contract::SearchWorldV1`] — trait for worlds that support search
//! - [`node::SearchNodeV1`] — immutable state node with deterministic ordering
//! - [`frontier::Frontier`] — FIFO/LIFO/best-first frontier with visited set
//! - [`policy::SearchPolicyV1`] — strategy choice and search budgets
//! - [`run::SearchRun`] — owned, step-wise run handle (`advance()` one
//!   expansion at a time)
//! - [`graph::SearchGraphV1`] — expansion-event audit log

#![forbid(unsafe_code)]

pub mod contract;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod node;
pub mod policy;
pub mod run;
