//! Lightweight Molang-like expression evaluator.
//!
//! Covers the subset seen in behavior pack conditions and numeric fields:
//! arithmetic, comparisons, logical operators, a lazy ternary, variables and a
//! small table of `math.*` functions. Evaluation never fails once parsing has
//! succeeded; callers that only care about the number use [`evaluate`] and pick
//! their own default when it returns `None`.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use ast::{BinaryOp, Expr, UnaryOp, Value};
pub use eval::Variables;

/// Reasons an expression string could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number literal at {offset}")]
    InvalidNumber { offset: usize },

    #[error("unterminated string literal at {offset}")]
    UnterminatedString { offset: usize },

    #[error("unexpected token at {offset}")]
    UnexpectedToken { offset: usize },

    #[error("expected {expected} at {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },

    #[error("unexpected end of expression")]
    UnexpectedEof,

    #[error("expression nested too deeply at {offset}")]
    TooDeep { offset: usize },
}

/// Parse an expression into a reusable tree.
pub fn parse(expression: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::Lexer::new(expression).tokenize()?;
    parser::Parser::new(tokens).parse()
}

/// Parse and evaluate in one step. `None` means the expression did not parse.
pub fn evaluate(expression: &str, vars: &Variables) -> Option<f64> {
    parse(expression).ok().map(|expr| expr.eval(vars).as_number())
}

/// Evaluate as a condition, falling back to `default` when unparsable.
pub fn evaluate_condition(expression: &str, vars: &Variables, default: bool) -> bool {
    match parse(expression) {
        Ok(expr) => expr.eval(vars).as_bool(),
        Err(_) => default,
    }
}
