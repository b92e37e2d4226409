//! Puzzle world implementations.

pub mod maze;
pub mod pots;
pub mod wumpus;
pub mod wumpus_agent;
