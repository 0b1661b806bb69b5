//! Game of Life search compiler
//!
//! Compiles geometric search problems over Conway's Game of Life into CNF
//! for an external SAT solver. A search problem is a rectangular region of
//! space-time decomposed into sub-patterns, each fully known or variable
//! with symmetry constraints; satisfying assignments of the emitted CNF
//! correspond one-to-one with concrete patterns meeting the specification.

pub mod config;
pub mod geometry;
pub mod pattern;
pub mod rule;
pub mod sat;
pub mod search;
pub mod utils;

pub use config::Settings;
pub use search::{SearchOutcome, SearchRunner};

use anyhow::Result;

/// Main entry point: compile the configured search, run the solver, and
/// reconstruct the resulting generations.
pub fn run_search(settings: Settings) -> Result<SearchOutcome> {
    let mut runner = SearchRunner::new(settings)?;
    runner.run()
}
