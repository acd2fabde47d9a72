//! Equation fault types.
//!
//! Defined as a typed enum (rather than a bare `Option`) so the scorer and
//! its diagnostics can classify faults without string matching. None of
//! these escape a scoring call; they are folded into the returned score.

use thiserror::Error;

/// Faults raised while gating, lexing, parsing, or evaluating an equation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquationError {
    /// A character outside the arithmetic alphabet was found.
    #[error("forbidden character {0:?} in equation")]
    ForbiddenCharacter(char),

    /// The equation is empty or all whitespace.
    #[error("empty equation")]
    Empty,

    /// The equation does not lex or parse as arithmetic.
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The evaluation divided by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl EquationError {
    /// Returns `true` if the fault came from the pre-evaluation character
    /// gate, i.e. the equation contained non-arithmetic text.
    pub fn is_gate_rejection(&self) -> bool {
        matches!(self, EquationError::ForbiddenCharacter(_))
    }
}
