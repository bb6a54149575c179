//! Sky Parse - recursive descent parser for the skyfold script dialect.
//!
//! Produces a [`sky_ir::Module`] whose nodes live in a flat arena. The
//! grammar is a Python-like subset: `def`, `if`/`elif`/`else`, `for`,
//! `return`/`break`/`continue`/`pass`, `load`, assignments, lambdas, and
//! list/dict comprehensions.

mod error;
mod parser;

pub use error::{ParseError, SyntaxError};

use sky_ir::Module;

/// Lex and parse a whole module.
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let tokens = sky_lexer::lex(source)?;
    parser::Parser::new(&tokens).parse_module()
}
