//! Parse error types.

use sky_ir::Span;
use sky_lexer::LexError;
use thiserror::Error;

/// One positioned syntax error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        SyntaxError {
            message: message.into(),
            span,
        }
    }
}

/// All syntax errors found in one module.
///
/// The parser recovers at statement boundaries, so a single module can
/// report several independent errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", .errors.first().map_or("syntax error", |e| e.message.as_str()))]
pub struct ParseError {
    pub errors: Vec<SyntaxError>,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            errors: vec![SyntaxError::new(err.to_string(), err.span)],
        }
    }
}
