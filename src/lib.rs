//! countdown-reward — reward scoring for countdown arithmetic puzzles.
//!
//! Grades model-generated transcripts for an RL training loop: extracts the
//! final `<answer>` equation, validates it against the puzzle's numbers,
//! evaluates it with a sandboxed arithmetic evaluator, and blends in a bonus
//! for multilingual reasoning traces. Every call returns a number; faults are
//! folded into the score and never raised to the caller.

pub mod equation;
pub mod error;
pub mod extract;
pub mod langdiv;
pub mod model;
pub mod results;
pub mod score;

pub use score::{compute_score, Scorer};
