//! Equation validation and sandboxed arithmetic evaluation.
//!
//! The evaluator is an explicit grammar-limited interpreter: a character
//! gate followed by a hand-built tokenizer and recursive-descent walk over
//! `+ - * / ( )` and numeric literals. No names, calls, or attribute access
//! are expressible, so arbitrary text in an answer tag can never execute
//! anything — it can only fail to parse.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::EquationError;

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Check that the equation uses exactly the available numbers.
///
/// Every maximal digit run in the equation is read as an integer and the
/// resulting multiset must equal the available multiset: each given number
/// used exactly once, no extras. A digit run too large for `i64` fails
/// validation rather than panicking.
pub fn validate_numbers(equation: &str, available: &[i64]) -> bool {
    let mut used = Vec::with_capacity(available.len());
    for run in DIGIT_RUN_RE.find_iter(equation) {
        match run.as_str().parse::<i64>() {
            Ok(n) => used.push(n),
            Err(_) => return false,
        }
    }

    let mut available = available.to_vec();
    used.sort_unstable();
    available.sort_unstable();
    used == available
}

// ---------------------------------------------------------------------------
// Character gate
// ---------------------------------------------------------------------------

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Textual safety gate applied before any evaluation.
///
/// This is not a grammar check — unbalanced parentheses or stray dots pass
/// the gate and surface later as syntax faults.
fn character_gate(equation: &str) -> Result<(), EquationError> {
    match equation.chars().find(|c| !is_allowed(*c)) {
        Some(c) => Err(EquationError::ForbiddenCharacter(c)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Tokens tagged with their byte offset, for fault positions.
fn tokenize(equation: &str) -> Result<Vec<(usize, Token)>, EquationError> {
    let mut tokens = Vec::new();
    let bytes = equation.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos] as char;
        match c {
            c if c.is_ascii_whitespace() => pos += 1,
            '+' => {
                tokens.push((pos, Token::Plus));
                pos += 1;
            }
            '-' => {
                tokens.push((pos, Token::Minus));
                pos += 1;
            }
            '*' => {
                tokens.push((pos, Token::Star));
                pos += 1;
            }
            '/' => {
                tokens.push((pos, Token::Slash));
                pos += 1;
            }
            '(' => {
                tokens.push((pos, Token::LParen));
                pos += 1;
            }
            ')' => {
                tokens.push((pos, Token::RParen));
                pos += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = pos;
                while pos < bytes.len()
                    && ((bytes[pos] as char).is_ascii_digit() || bytes[pos] == b'.')
                {
                    pos += 1;
                }
                // f64 parsing rejects malformed literals like "1.2.3" or "."
                let literal = &equation[start..pos];
                let value = literal.parse::<f64>().map_err(|_| EquationError::Syntax {
                    position: start,
                    message: format!("invalid number literal {literal:?}"),
                })?;
                tokens.push((start, Token::Number(value)));
            }
            // The gate runs first; non-ASCII whitespace is the only way here.
            other => {
                return Err(EquationError::Syntax {
                    position: pos,
                    message: format!("unexpected character {other:?}"),
                })
            }
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Recursive-descent evaluator
// ---------------------------------------------------------------------------

struct Evaluator<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(_, t)| *t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn fault_position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |(at, _)| *at)
    }

    fn expr(&mut self) -> Result<f64, EquationError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EquationError> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.unary()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EquationError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EquationError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, EquationError> {
        let position = self.fault_position();
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EquationError::Syntax {
                        position,
                        message: "unclosed parenthesis".into(),
                    }),
                }
            }
            _ => Err(EquationError::Syntax {
                position,
                message: "expected a number or parenthesized expression".into(),
            }),
        }
    }
}

/// Evaluate an arithmetic equation with standard operator precedence.
///
/// Applies the character gate, tokenizes, then evaluates. Division by an
/// exact zero is a fault rather than an infinity, matching the "evaluation
/// fault" taxonomy the scorer folds into the format score.
pub fn evaluate(equation: &str) -> Result<f64, EquationError> {
    if equation.trim().is_empty() {
        return Err(EquationError::Empty);
    }
    character_gate(equation)?;

    let tokens = tokenize(equation)?;
    let mut evaluator = Evaluator {
        tokens: &tokens,
        pos: 0,
    };
    let value = evaluator.expr()?;

    if evaluator.pos != tokens.len() {
        return Err(EquationError::Syntax {
            position: evaluator.fault_position(),
            message: "trailing input after expression".into(),
        });
    }

    Ok(value)
}
