//! Parlor Harness: puzzle worlds and the uniform solve seam.
//!
//! The harness instantiates the search layer for the three puzzle kinds
//! (maze, pots, wumpus) and exposes the interface the presentation layer
//! drives: one-shot [`runner::solve`] and the frame-by-frame
//! [`runner::PuzzleRunV1`] handle.
//!
//! The harness does NOT implement search mechanics — it delegates to
//! `parlor_search`. Worlds provide domain data only; the runner owns
//! orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod artifact;
pub mod runner;
pub mod worlds;
