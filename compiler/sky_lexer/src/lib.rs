//! Sky Lexer - tokenizer for the skyfold script dialect.
//!
//! Two layers:
//! - `raw_token`: logos-generated recognizer for keywords, operators,
//!   literals, and identifiers
//! - `lexer`: layout pass turning line breaks into `Newline`, `Indent`, and
//!   `Dedent` tokens, plus literal decoding
//!
//! ```text
//! let tokens = sky_lexer::lex("x = 1\n")?;
//! ```

mod escape;
mod lex_error;
mod lexer;
mod raw_token;
mod reserved;
mod token;

pub use lex_error::{LexError, LexErrorKind};
pub use lexer::lex;
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests;
