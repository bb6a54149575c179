//! Layout-aware lexing: logos tokens plus `Newline`/`Indent`/`Dedent`.

use logos::Logos;
use sky_ir::Span;

use crate::escape::decode_string_literal;
use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::RawToken;
use crate::reserved::lookup_reserved;
use crate::{Token, TokenKind};

/// Tokenize a whole module.
///
/// Newlines inside brackets are ignored. Blank and comment-only lines never
/// produce layout tokens. The token stream always ends with `Eof`, preceded
/// by a `Newline` and enough `Dedent`s to close every open block.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    /// Indentation widths of open blocks; always starts with 0.
    indents: Vec<u32>,
    /// Open brackets, for balancing and newline suppression.
    brackets: Vec<(char, Span)>,
    /// Width and span of the last line break seen outside brackets.
    pending_line: Option<(u32, Span)>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Lexer {
            source,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            pending_line: None,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            let span = Span::from_range(raw.span());
            let slice = raw.slice();
            let Ok(token) = result else {
                return Err(self.raw_error(slice, span));
            };

            if token == RawToken::Newline {
                if self.brackets.is_empty() {
                    self.pending_line = Some((indent_width(&slice[1..]), span));
                }
                continue;
            }

            self.start_line(span)?;
            let kind = self.convert(token, slice, span)?;
            self.track_brackets(&kind, span)?;
            self.tokens.push(Token::new(kind, span));
        }

        if let Some(&(open, span)) = self.brackets.last() {
            return Err(LexError::new(LexErrorKind::UnbalancedBracket(open), span));
        }

        let eof = Span::point(u32::try_from(self.source.len()).unwrap_or(u32::MAX));
        let last_line = self
            .pending_line
            .map_or(eof, |(_, span)| Span::point(span.start));
        if self
            .tokens
            .last()
            .is_some_and(|t| t.kind != TokenKind::Newline)
        {
            self.tokens.push(Token::new(TokenKind::Newline, last_line));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, eof));
        }
        self.tokens.push(Token::new(TokenKind::Eof, eof));
        Ok(self.tokens)
    }

    /// Emit layout tokens for a pending line break before the token at `span`.
    fn start_line(&mut self, span: Span) -> Result<(), LexError> {
        if self.tokens.is_empty() {
            let before = &self.source[..span.start as usize];
            let first_line = before.rsplit('\n').next().unwrap_or(before);
            if !first_line.is_empty() && first_line.chars().all(|c| c == ' ' || c == '\t') {
                return Err(LexError::new(LexErrorKind::LeadingIndent, span));
            }
            self.pending_line = None;
            return Ok(());
        }

        let Some((width, line_span)) = self.pending_line.take() else {
            return Ok(());
        };
        if self
            .tokens
            .last()
            .is_some_and(|t| t.kind != TokenKind::Newline)
        {
            self.tokens
                .push(Token::new(TokenKind::Newline, Span::point(line_span.start)));
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.tokens
                .push(Token::new(TokenKind::Indent, Span::point(span.start)));
            return Ok(());
        }
        while self.indents.last().is_some_and(|&top| width < top) {
            self.indents.pop();
            self.tokens
                .push(Token::new(TokenKind::Dedent, Span::point(span.start)));
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(LexError::new(LexErrorKind::InconsistentDedent, span));
        }
        Ok(())
    }

    fn track_brackets(&mut self, kind: &TokenKind, span: Span) -> Result<(), LexError> {
        let (open, close) = match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                let bracket = match kind {
                    TokenKind::LParen => '(',
                    TokenKind::LBracket => '[',
                    _ => '{',
                };
                self.brackets.push((bracket, span));
                return Ok(());
            }
            TokenKind::RParen => ('(', ')'),
            TokenKind::RBracket => ('[', ']'),
            TokenKind::RBrace => ('{', '}'),
            _ => return Ok(()),
        };
        match self.brackets.pop() {
            Some((found, _)) if found == open => Ok(()),
            _ => Err(LexError::new(LexErrorKind::UnbalancedBracket(close), span)),
        }
    }

    fn raw_error(&self, slice: &str, span: Span) -> LexError {
        let unquoted = slice.trim_start_matches(['r', 'R']);
        let kind = if unquoted.starts_with('"') || unquoted.starts_with('\'') {
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::InvalidChar(slice.chars().next().unwrap_or('\0'))
        };
        LexError::new(kind, span)
    }

    fn convert(&self, raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
        let err = |kind| LexError::new(kind, span);
        Ok(match raw {
            RawToken::Int => TokenKind::Int(
                slice
                    .parse::<i64>()
                    .map_err(|_| err(LexErrorKind::IntOverflow))?,
            ),
            RawToken::HexInt => TokenKind::Int(
                i64::from_str_radix(&slice[2..], 16).map_err(|_| err(LexErrorKind::IntOverflow))?,
            ),
            RawToken::OctInt => TokenKind::Int(
                i64::from_str_radix(&slice[2..], 8).map_err(|_| err(LexErrorKind::IntOverflow))?,
            ),
            RawToken::Float => TokenKind::Float(
                slice
                    .parse::<f64>()
                    .map_err(|_| err(LexErrorKind::InvalidFloat))?,
            ),
            RawToken::Str | RawToken::TripleStr => {
                TokenKind::Str(decode_string_literal(slice).map_err(err)?)
            }
            RawToken::Ident => {
                if let Some((keyword, hint)) = lookup_reserved(slice) {
                    return Err(err(LexErrorKind::ReservedKeyword { keyword, hint }));
                }
                TokenKind::Ident(slice.to_string())
            }

            RawToken::And => TokenKind::And,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Def => TokenKind::Def,
            RawToken::Elif => TokenKind::Elif,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::If => TokenKind::If,
            RawToken::In => TokenKind::In,
            RawToken::Lambda => TokenKind::Lambda,
            RawToken::Load => TokenKind::Load,
            RawToken::Not => TokenKind::Not,
            RawToken::Or => TokenKind::Or,
            RawToken::Pass => TokenKind::Pass,
            RawToken::Return => TokenKind::Return,
            RawToken::None => TokenKind::None,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,

            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Dot => TokenKind::Dot,

            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::StarStar => TokenKind::StarStar,
            RawToken::Slash => TokenKind::Slash,
            RawToken::SlashSlash => TokenKind::SlashSlash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::SlashSlashEq => TokenKind::SlashSlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::ShlEq => TokenKind::ShlEq,
            RawToken::ShrEq => TokenKind::ShrEq,

            // Filtered out by the caller.
            RawToken::Newline => TokenKind::Newline,
        })
    }
}

/// Column width of leading whitespace; tabs advance to the next multiple of 8.
fn indent_width(ws: &str) -> u32 {
    ws.chars().fold(0, |width, c| match c {
        '\t' => (width / 8 + 1) * 8,
        _ => width + 1,
    })
}
