//! Lexer error types.

use sky_ir::Span;
use thiserror::Error;

/// A lexer error located in the source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("invalid character {0:?}")]
    InvalidChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("integer literal out of range")]
    IntOverflow,
    #[error("invalid float literal")]
    InvalidFloat,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("unexpected indentation at start of file")]
    LeadingIndent,
    #[error("unbalanced `{0}`")]
    UnbalancedBracket(char),
    #[error("`{keyword}` is reserved: {hint}")]
    ReservedKeyword {
        keyword: &'static str,
        hint: &'static str,
    },
}
