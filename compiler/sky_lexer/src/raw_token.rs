//! Raw token recognition with logos.
//!
//! Layout (newlines, indentation) and literal decoding happen afterwards in
//! [`crate::lexer`]; this layer only classifies byte ranges.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"\\\r?\n")]
pub(crate) enum RawToken {
    /// A line break plus the indentation of the following line.
    #[regex(r"\n[ \t]*")]
    Newline,

    // === Keywords ===
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("lambda")]
    Lambda,
    #[token("load")]
    Load,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("return")]
    Return,
    #[token("None")]
    None,
    #[token("True")]
    True,
    #[token("False")]
    False,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("//=")]
    SlashSlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,

    // === Literals ===
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexInt,
    #[regex(r"0[oO][0-7]+")]
    OctInt,
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,
    #[regex(r#"[rR]?"([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r"[rR]?'([^'\\\n]|\\(.|\n))*'")]
    Str,
    #[regex(r#"[rR]?""""#, lex_triple_quoted)]
    #[regex(r"[rR]?'''", lex_triple_quoted)]
    TripleStr,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume the body of a triple-quoted string up to its closing quotes.
///
/// Returns `false` (a lex error) if the string never closes.
fn lex_triple_quoted(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    let slice = lex.slice();
    let quote = &slice[slice.len() - 3..];
    let rest = lex.remainder();
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(quote.as_bytes()) {
            lex.bump(i + 3);
            return true;
        }
        i += 1;
    }
    lex.bump(rest.len());
    false
}
