//! Parlor Kernel: the shared state model of the Parlor puzzle engine.
//!
//! # API Surface
//!
//! - [`position`] / [`grid`] -- discrete positions, movement directions, and
//!   bounds-checked obstacle grids
//! - [`definition`] -- validated puzzle definitions supplied by the
//!   presentation layer as plain structured data
//! - [`fingerprint`] -- canonical state fingerprints for visited-set
//!   membership and trace identity
//! - [`canon`] -- canonical JSON bytes for artifact serialization
//!
//! # Module Dependency Direction
//!
//! `position` ← `grid` ← `definition`; `fingerprint` and `canon` depend on
//! nothing internal. One-way only. No cycles.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canon;
pub mod definition;
pub mod fingerprint;
pub mod grid;
pub mod position;
