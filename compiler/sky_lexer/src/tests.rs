#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.to_string())
}

#[test]
fn simple_assignment() {
    assert_eq!(
        kinds("x = 42"),
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::Int(42),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn indentation_blocks() {
    let source = "def f(a):\n    if a:\n        return 1\n    return 2\nx = f(1)\n";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Def,
            ident("f"),
            TokenKind::LParen,
            ident("a"),
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::If,
            ident("a"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Return,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Dedent,
            ident("x"),
            TokenKind::Eq,
            ident("f"),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn blank_and_comment_lines_are_ignored() {
    let source = "a = 1\n\n   # indented comment\n\nb = 2  # trailing\n";
    assert_eq!(
        kinds(source),
        vec![
            ident("a"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Newline,
            ident("b"),
            TokenKind::Eq,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn newlines_inside_brackets_are_ignored() {
    let source = "x = [\n    1,\n  2,\n]\n";
    assert_eq!(
        kinds(source),
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::LBracket,
            TokenKind::Int(1),
            TokenKind::Comma,
            TokenKind::Int(2),
            TokenKind::Comma,
            TokenKind::RBracket,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn dedent_closes_blocks_at_eof() {
    let toks = kinds("for x in y:\n    pass");
    assert_eq!(
        &toks[toks.len() - 3..],
        &[TokenKind::Newline, TokenKind::Dedent, TokenKind::Eof]
    );
}

#[test]
fn numbers() {
    assert_eq!(
        kinds("0x1F 0o17 3.5 1e3 .5"),
        vec![
            TokenKind::Int(31),
            TokenKind::Int(15),
            TokenKind::Float(3.5),
            TokenKind::Float(1000.0),
            TokenKind::Float(0.5),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn strings_of_every_quote_style() {
    let source = "'a' \"b\\n\" r'c\\d' \"\"\"multi\nline\"\"\" ''''''";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Str("a".to_string()),
            TokenKind::Str("b\n".to_string()),
            TokenKind::Str("c\\d".to_string()),
            TokenKind::Str("multi\nline".to_string()),
            TokenKind::Str(String::new()),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn augmented_operators() {
    assert_eq!(
        kinds("a //= 2"),
        vec![
            ident("a"),
            TokenKind::SlashSlashEq,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_continuation() {
    assert_eq!(
        kinds("x = 1 + \\\n    2\n"),
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn inconsistent_dedent_is_an_error() {
    let err = lex("if x:\n    a = 1\n  b = 2\n").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InconsistentDedent);
}

#[test]
fn unterminated_string_is_an_error() {
    let err = lex("x = \"abc\n").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
}

#[test]
fn unbalanced_brackets_are_errors() {
    assert_eq!(
        lex("x = (1, 2]").unwrap_err().kind,
        LexErrorKind::UnbalancedBracket(']')
    );
    assert_eq!(
        lex("x = [1").unwrap_err().kind,
        LexErrorKind::UnbalancedBracket('[')
    );
}

#[test]
fn reserved_words_have_hints() {
    let err = lex("while x:\n    pass\n").unwrap_err();
    assert!(matches!(
        err.kind,
        LexErrorKind::ReservedKeyword {
            keyword: "while",
            ..
        }
    ));
    assert!(err.to_string().contains("range"));
}

#[test]
fn leading_indent_is_an_error() {
    assert_eq!(lex("  x = 1").unwrap_err().kind, LexErrorKind::LeadingIndent);
}

#[test]
fn spans_point_into_source() {
    let source = "name = \"value\"";
    let tokens = lex(source).unwrap();
    assert_eq!(&source[tokens[0].span.to_range()], "name");
    assert_eq!(&source[tokens[2].span.to_range()], "\"value\"");
}

proptest! {
    #[test]
    fn identifiers_round_trip(name in prop::string::string_regex("[a-z_][a-z0-9_]{0,12}").unwrap()) {
        prop_assume!(lookup_is_plain(&name));
        let toks = kinds(&name);
        prop_assert_eq!(toks[0].clone(), TokenKind::Ident(name));
    }

    #[test]
    fn integers_round_trip(n in 0i64..i64::MAX) {
        let toks = kinds(&n.to_string());
        prop_assert_eq!(toks[0].clone(), TokenKind::Int(n));
    }
}

/// True if `name` lexes as an identifier rather than a keyword.
fn lookup_is_plain(name: &str) -> bool {
    matches!(lex(name).map(|t| t[0].kind.clone()), Ok(TokenKind::Ident(_)))
}
