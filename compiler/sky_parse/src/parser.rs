//! Parser state, token access, and statement parsing.
//!
//! Expressions live in `parser/expr.rs`. Errors inside a statement are
//! recorded and the parser skips to the next statement boundary, so one
//! run reports every independent syntax error in the module.

mod expr;

use sky_ir::{
    AssignOp, ExprKind, LoadSymbol, Module, Param, ParamKind, Span, Stmt, StmtId, StmtKind,
    SyntaxArena,
};
use sky_lexer::{Token, TokenKind};

use crate::error::{ParseError, SyntaxError};

type PResult<T> = Result<T, SyntaxError>;

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    arena: SyntaxArena,
    errors: Vec<SyntaxError>,
    /// Nesting of `if`/`for`/`def` blocks.
    block_depth: u32,
    /// Nesting of `def` bodies.
    def_depth: u32,
    /// Nesting of `for` loops within the current function.
    loop_depth: u32,
}

impl<'t> Parser<'t> {
    /// `tokens` must end with `Eof`, as produced by `sky_lexer::lex`.
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        Parser {
            tokens,
            pos: 0,
            arena: SyntaxArena::new(),
            errors: Vec::new(),
            block_depth: 0,
            def_depth: 0,
            loop_depth: 0,
        }
    }

    pub(crate) fn parse_module(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        while !self.at_end() {
            if self.check(&TokenKind::Newline) {
                self.advance();
                continue;
            }
            if let Err(err) = self.statement(&mut body) {
                self.errors.push(err);
                self.recover();
            }
        }

        if self.errors.is_empty() {
            Ok(Module {
                arena: self.arena,
                body,
            })
        } else {
            Err(ParseError {
                errors: self.errors,
            })
        }
    }

    // ===== Token access =====

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// Span of the most recently consumed token.
    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::DUMMY, |t| t.span)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return its span.
    fn advance(&mut self) -> Span {
        let span = self.current_span();
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Span)> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let span = self.advance();
            Ok((name, span))
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn expect_string(&mut self) -> PResult<(String, Span)> {
        if let TokenKind::Str(value) = self.current_kind() {
            let value = value.clone();
            let span = self.advance();
            Ok((value, span))
        } else {
            Err(self.unexpected("string literal"))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::new(
            format!(
                "expected {expected}, found {}",
                self.current_kind().describe()
            ),
            self.current_span(),
        )
    }

    /// Skip to the start of the next statement at the current block level.
    fn recover(&mut self) {
        let mut nesting = 0u32;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Newline if nesting == 0 => {
                    self.advance();
                    if !self.check(&TokenKind::Indent) {
                        return;
                    }
                }
                TokenKind::Indent => {
                    nesting += 1;
                    self.advance();
                }
                TokenKind::Dedent => {
                    if nesting == 0 {
                        return;
                    }
                    nesting -= 1;
                    self.advance();
                    if nesting == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.arena.alloc_stmt(Stmt { kind, span })
    }

    // ===== Statements =====

    fn statement(&mut self, out: &mut Vec<StmtId>) -> PResult<()> {
        let stmt = match self.current_kind() {
            TokenKind::Def => self.def_statement()?,
            TokenKind::If => self.if_statement()?,
            TokenKind::For => self.for_statement()?,
            _ => return self.simple_statement(out),
        };
        out.push(stmt);
        Ok(())
    }

    /// `small (';' small)* [';'] NEWLINE`
    fn simple_statement(&mut self, out: &mut Vec<StmtId>) -> PResult<()> {
        out.push(self.small_statement()?);
        while self.eat(&TokenKind::Semicolon) {
            if self.check(&TokenKind::Newline) || self.at_end() {
                break;
            }
            out.push(self.small_statement()?);
        }
        if !self.at_end() {
            self.expect(&TokenKind::Newline)?;
        }
        Ok(())
    }

    fn small_statement(&mut self) -> PResult<StmtId> {
        let start = self.current_span();
        match self.current_kind() {
            TokenKind::Return => {
                self.advance();
                if self.def_depth == 0 {
                    return Err(SyntaxError::new(
                        "return statement not within a function",
                        start,
                    ));
                }
                let value = if self.starts_expr() {
                    Some(self.expr_list()?)
                } else {
                    None
                };
                Ok(self.alloc_stmt(StmtKind::Return(value), start.merge(self.prev_span())))
            }
            TokenKind::Break | TokenKind::Continue => {
                let kind = if self.check(&TokenKind::Break) {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                };
                let word = if self.check(&TokenKind::Break) {
                    "break"
                } else {
                    "continue"
                };
                self.advance();
                if self.loop_depth == 0 {
                    return Err(SyntaxError::new(format!("{word} not in a loop"), start));
                }
                Ok(self.alloc_stmt(kind, start))
            }
            TokenKind::Pass => {
                self.advance();
                Ok(self.alloc_stmt(StmtKind::Pass, start))
            }
            TokenKind::Load => self.load_statement(),
            _ => self.expr_statement(),
        }
    }

    fn expr_statement(&mut self) -> PResult<StmtId> {
        let target = self.expr_list()?;
        let start = self.arena.expr(target).span;

        if self.eat(&TokenKind::Eq) {
            self.check_assign_target(target)?;
            let value = self.expr_list()?;
            let span = start.merge(self.arena.expr(value).span);
            return Ok(self.alloc_stmt(StmtKind::Assign { target, value }, span));
        }

        if let Some(op) = self.assign_op() {
            let op_span = self.advance();
            if !matches!(
                self.arena.expr(target).kind,
                ExprKind::Ident(_) | ExprKind::Attr { .. } | ExprKind::Index { .. }
            ) {
                return Err(SyntaxError::new(
                    "invalid target for augmented assignment",
                    op_span,
                ));
            }
            let value = self.expr_list()?;
            let span = start.merge(self.arena.expr(value).span);
            return Ok(self.alloc_stmt(StmtKind::AugAssign { target, op, value }, span));
        }

        Ok(self.alloc_stmt(StmtKind::Expr(target), start))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        Some(match self.current_kind() {
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::SlashSlashEq => AssignOp::FloorDiv,
            TokenKind::PercentEq => AssignOp::Mod,
            TokenKind::AmpEq => AssignOp::BitAnd,
            TokenKind::PipeEq => AssignOp::BitOr,
            TokenKind::CaretEq => AssignOp::BitXor,
            TokenKind::ShlEq => AssignOp::Shl,
            TokenKind::ShrEq => AssignOp::Shr,
            _ => return None,
        })
    }

    /// `load("module", "sym", alias="sym", ...)`
    fn load_statement(&mut self) -> PResult<StmtId> {
        let start = self.advance();
        if self.block_depth > 0 {
            return Err(SyntaxError::new(
                "load statement must be at top level",
                start,
            ));
        }
        self.expect(&TokenKind::LParen)?;
        let (module, _) = self.expect_string()?;

        let mut symbols = Vec::new();
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            let symbol_start = self.current_span();
            let symbol = if matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek_kind(1), TokenKind::Eq)
            {
                let (local, _) = self.expect_ident()?;
                self.advance();
                let (remote, _) = self.expect_string()?;
                LoadSymbol {
                    local,
                    remote,
                    span: symbol_start.merge(self.prev_span()),
                }
            } else {
                let (remote, span) = self.expect_string()?;
                LoadSymbol {
                    local: remote.clone(),
                    remote,
                    span,
                }
            };
            if symbol.local.is_empty() || symbol.remote.is_empty() {
                return Err(SyntaxError::new("load: empty identifier", symbol.span));
            }
            symbols.push(symbol);
        }
        let end = self.expect(&TokenKind::RParen)?;

        if symbols.is_empty() {
            return Err(SyntaxError::new(
                "load statement must import at least 1 symbol",
                start.merge(end),
            ));
        }
        Ok(self.alloc_stmt(StmtKind::Load { module, symbols }, start.merge(end)))
    }

    fn def_statement(&mut self) -> PResult<StmtId> {
        let start = self.advance();
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.params(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;

        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.def_depth += 1;
        let body = self.suite();
        self.def_depth -= 1;
        self.loop_depth = saved_loops;

        let body = body?;
        Ok(self.alloc_stmt(
            StmtKind::Def { name, params, body },
            start.merge(self.prev_span()),
        ))
    }

    /// Handles both `if` and `elif`; an `elif` chain nests as an `else` block.
    fn if_statement(&mut self) -> PResult<StmtId> {
        let start = self.advance();
        let cond = self.test()?;
        self.expect(&TokenKind::Colon)?;
        let then = self.suite()?;

        let otherwise = if self.check(&TokenKind::Elif) {
            vec![self.if_statement()?]
        } else if self.eat(&TokenKind::Else) {
            self.expect(&TokenKind::Colon)?;
            self.suite()?
        } else {
            Vec::new()
        };

        Ok(self.alloc_stmt(
            StmtKind::If {
                cond,
                then,
                otherwise,
            },
            start.merge(self.prev_span()),
        ))
    }

    fn for_statement(&mut self) -> PResult<StmtId> {
        let start = self.advance();
        let target = self.loop_target()?;
        self.expect(&TokenKind::In)?;
        let iter = self.expr_list()?;
        self.expect(&TokenKind::Colon)?;

        self.loop_depth += 1;
        let body = self.suite();
        self.loop_depth -= 1;

        let body = body?;
        Ok(self.alloc_stmt(
            StmtKind::For { target, iter, body },
            start.merge(self.prev_span()),
        ))
    }

    /// A block body: either statements on the same line, or an indented
    /// block.
    fn suite(&mut self) -> PResult<Vec<StmtId>> {
        let mut body = Vec::new();
        if !self.check(&TokenKind::Newline) {
            self.simple_statement(&mut body)?;
            return Ok(body);
        }

        self.advance();
        self.expect(&TokenKind::Indent)?;
        self.block_depth += 1;
        while !self.check(&TokenKind::Dedent) && !self.at_end() {
            if self.check(&TokenKind::Newline) {
                self.advance();
                continue;
            }
            if let Err(err) = self.statement(&mut body) {
                self.errors.push(err);
                self.recover();
            }
        }
        self.eat(&TokenKind::Dedent);
        self.block_depth -= 1;
        Ok(body)
    }

    /// Parameter list up to (not including) `close`.
    fn params(&mut self, close: &TokenKind) -> PResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        let mut seen_optional = false;

        while !self.check(close) {
            let start = self.current_span();
            let kind = if self.eat(&TokenKind::Star) {
                ParamKind::Args
            } else if self.eat(&TokenKind::StarStar) {
                ParamKind::Kwargs
            } else {
                ParamKind::Normal
            };
            let (name, name_span) = self.expect_ident()?;
            if params.iter().any(|p| p.name == name) {
                return Err(SyntaxError::new(
                    format!("duplicate parameter `{name}`"),
                    name_span,
                ));
            }

            let default = if kind == ParamKind::Normal && self.eat(&TokenKind::Eq) {
                seen_optional = true;
                Some(self.test()?)
            } else {
                let after_star = params.iter().any(|p| p.kind == ParamKind::Args);
                if kind == ParamKind::Normal && seen_optional && !after_star {
                    return Err(SyntaxError::new(
                        "required parameter may not follow optional",
                        name_span,
                    ));
                }
                None
            };

            if let Some(last) = params.last() {
                if last.kind == ParamKind::Kwargs {
                    return Err(SyntaxError::new(
                        "parameter may not follow **kwargs",
                        name_span,
                    ));
                }
                if last.kind == ParamKind::Args && kind == ParamKind::Args {
                    return Err(SyntaxError::new("multiple *args parameters", name_span));
                }
            }

            params.push(Param {
                name,
                default,
                kind,
                span: start.merge(self.prev_span()),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }
}
