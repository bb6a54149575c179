//! Expression parsing: precedence climbing, operands, trailers,
//! comprehensions, and lambdas.

use sky_ir::{Argument, BinaryOp, Clause, ComprehensionKind, Expr, ExprId, ExprKind, Span, UnaryOp};
use sky_lexer::TokenKind;
use sky_stack::ensure_sufficient_stack;

use super::{PResult, Parser};
use crate::error::SyntaxError;

/// Binding power of `not` as a prefix operator.
const NOT_PREC: u8 = 3;

impl Parser<'_> {
    fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr { kind, span })
    }

    fn span_of(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    /// True if the current token can begin an expression.
    pub(super) fn starts_expr(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
        )
    }

    /// `test (',' test)* [',']`, a tuple when a comma is present.
    pub(super) fn expr_list(&mut self) -> PResult<ExprId> {
        let first = self.test()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expr() {
                break;
            }
            items.push(self.test()?);
        }
        let span = self.span_of(first).merge(self.prev_span());
        Ok(self.alloc_expr(ExprKind::Tuple(items), span))
    }

    /// Full expression: lambda, or a conditional expression.
    pub(super) fn test(&mut self) -> PResult<ExprId> {
        ensure_sufficient_stack(|| {
            if self.check(&TokenKind::Lambda) {
                return self.lambda();
            }
            let then = self.binary(1)?;
            if !self.eat(&TokenKind::If) {
                return Ok(then);
            }
            let cond = self.binary(1)?;
            self.expect(&TokenKind::Else)?;
            let otherwise = self.test()?;
            let span = self.span_of(then).merge(self.span_of(otherwise));
            Ok(self.alloc_expr(
                ExprKind::Conditional {
                    cond,
                    then,
                    otherwise,
                },
                span,
            ))
        })
    }

    fn lambda(&mut self) -> PResult<ExprId> {
        let start = self.advance();
        let params = self.params(&TokenKind::Colon)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.test()?;
        let span = start.merge(self.span_of(body));
        Ok(self.alloc_expr(ExprKind::Lambda { params, body }, span))
    }

    /// Operator at the current position with its precedence and token width.
    fn binary_op(&self) -> Option<(BinaryOp, u8, usize)> {
        let (op, prec) = match self.current_kind() {
            TokenKind::Or => (BinaryOp::Or, 1),
            TokenKind::And => (BinaryOp::And, 2),
            TokenKind::EqEq => (BinaryOp::Eq, 4),
            TokenKind::NotEq => (BinaryOp::NotEq, 4),
            TokenKind::Lt => (BinaryOp::Lt, 4),
            TokenKind::LtEq => (BinaryOp::LtEq, 4),
            TokenKind::Gt => (BinaryOp::Gt, 4),
            TokenKind::GtEq => (BinaryOp::GtEq, 4),
            TokenKind::In => (BinaryOp::In, 4),
            TokenKind::Not if matches!(self.peek_kind(1), TokenKind::In) => {
                return Some((BinaryOp::NotIn, 4, 2));
            }
            TokenKind::Pipe => (BinaryOp::BitOr, 5),
            TokenKind::Caret => (BinaryOp::BitXor, 6),
            TokenKind::Amp => (BinaryOp::BitAnd, 7),
            TokenKind::Shl => (BinaryOp::Shl, 8),
            TokenKind::Shr => (BinaryOp::Shr, 8),
            TokenKind::Plus => (BinaryOp::Add, 9),
            TokenKind::Minus => (BinaryOp::Sub, 9),
            TokenKind::Star => (BinaryOp::Mul, 10),
            TokenKind::Slash => (BinaryOp::Div, 10),
            TokenKind::SlashSlash => (BinaryOp::FloorDiv, 10),
            TokenKind::Percent => (BinaryOp::Mod, 10),
            _ => return None,
        };
        Some((op, prec, 1))
    }

    /// Precedence climbing over left-associative binary operators.
    fn binary(&mut self, min_prec: u8) -> PResult<ExprId> {
        ensure_sufficient_stack(|| {
            let mut left = if min_prec <= NOT_PREC && self.check(&TokenKind::Not) {
                let start = self.advance();
                let operand = self.binary(NOT_PREC)?;
                let span = start.merge(self.span_of(operand));
                self.alloc_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand,
                    },
                    span,
                )
            } else {
                self.unary()?
            };

            while let Some((op, prec, width)) = self.binary_op() {
                if prec < min_prec {
                    break;
                }
                for _ in 0..width {
                    self.advance();
                }
                let right = self.binary(prec + 1)?;
                let span = self.span_of(left).merge(self.span_of(right));
                left = self.alloc_expr(ExprKind::Binary { op, left, right }, span);
            }
            Ok(left)
        })
    }

    fn unary(&mut self) -> PResult<ExprId> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.postfix(),
        };
        let start = self.advance();
        let operand = ensure_sufficient_stack(|| self.unary())?;
        let span = start.merge(self.span_of(operand));
        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    /// An operand followed by any number of `.name`, `(args)`, `[index]`.
    fn postfix(&mut self) -> PResult<ExprId> {
        let mut expr = self.operand()?;
        loop {
            let start = self.span_of(expr);
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let (name, end) = self.expect_ident()?;
                    expr = self.alloc_expr(
                        ExprKind::Attr {
                            receiver: expr,
                            name,
                        },
                        start.merge(end),
                    );
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.call_args()?;
                    let end = self.expect(&TokenKind::RParen)?;
                    expr = self.alloc_expr(ExprKind::Call { callee: expr, args }, start.merge(end));
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.index_or_slice(expr, start)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call_args(&mut self) -> PResult<Vec<Argument>> {
        let mut args = Vec::new();
        let mut seen_named = false;

        while !self.check(&TokenKind::RParen) {
            let arg_span = self.current_span();
            let arg = if self.eat(&TokenKind::Star) {
                Argument::Star(self.test()?)
            } else if self.eat(&TokenKind::StarStar) {
                Argument::StarStar(self.test()?)
            } else if matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek_kind(1), TokenKind::Eq)
            {
                let (name, _) = self.expect_ident()?;
                self.advance();
                seen_named = true;
                Argument::Named(name, self.test()?)
            } else {
                if seen_named {
                    return Err(SyntaxError::new(
                        "positional argument may not follow named argument",
                        arg_span,
                    ));
                }
                Argument::Positional(self.test()?)
            };
            args.push(arg);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn index_or_slice(&mut self, receiver: ExprId, start: Span) -> PResult<ExprId> {
        let first = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(self.test()?)
        };

        if !self.eat(&TokenKind::Colon) {
            let end = self.expect(&TokenKind::RBracket)?;
            return match first {
                Some(index) => {
                    Ok(self.alloc_expr(ExprKind::Index { receiver, index }, start.merge(end)))
                }
                None => Err(SyntaxError::new("empty index", end)),
            };
        }

        let end_expr = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(self.test()?)
        };
        let step = if self.eat(&TokenKind::Colon) && !self.check(&TokenKind::RBracket) {
            Some(self.test()?)
        } else {
            None
        };
        let end = self.expect(&TokenKind::RBracket)?;
        Ok(self.alloc_expr(
            ExprKind::Slice {
                receiver,
                start: first,
                end: end_expr,
                step,
            },
            start.merge(end),
        ))
    }

    fn operand(&mut self) -> PResult<ExprId> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::Float(f) => ExprKind::Float(*f),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::None => ExprKind::None,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LParen => return self.paren(),
            TokenKind::LBracket => return self.list_display(),
            TokenKind::LBrace => return self.dict_display(),
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(self.alloc_expr(kind, span))
    }

    /// `()`, `(x)`, or a tuple `(x, y)`.
    fn paren(&mut self) -> PResult<ExprId> {
        let start = self.advance();
        if self.check(&TokenKind::RParen) {
            let end = self.advance();
            return Ok(self.alloc_expr(ExprKind::Tuple(Vec::new()), start.merge(end)));
        }
        let first = self.test()?;
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RParen)?;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.test()?);
        }
        let end = self.expect(&TokenKind::RParen)?;
        Ok(self.alloc_expr(ExprKind::Tuple(items), start.merge(end)))
    }

    fn list_display(&mut self) -> PResult<ExprId> {
        let start = self.advance();
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            let first = self.test()?;
            if self.check(&TokenKind::For) {
                let clauses = self.comprehension_clauses()?;
                let end = self.expect(&TokenKind::RBracket)?;
                return Ok(self.alloc_expr(
                    ExprKind::Comprehension {
                        kind: ComprehensionKind::List { element: first },
                        clauses,
                    },
                    start.merge(end),
                ));
            }
            items.push(first);
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                items.push(self.test()?);
            }
        }
        let end = self.expect(&TokenKind::RBracket)?;
        Ok(self.alloc_expr(ExprKind::List(items), start.merge(end)))
    }

    fn dict_display(&mut self) -> PResult<ExprId> {
        let start = self.advance();
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            let key = self.test()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.test()?;
            if self.check(&TokenKind::For) {
                let clauses = self.comprehension_clauses()?;
                let end = self.expect(&TokenKind::RBrace)?;
                return Ok(self.alloc_expr(
                    ExprKind::Comprehension {
                        kind: ComprehensionKind::Dict { key, value },
                        clauses,
                    },
                    start.merge(end),
                ));
            }
            entries.push((key, value));
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                let key = self.test()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.test()?;
                entries.push((key, value));
            }
        }
        let end = self.expect(&TokenKind::RBrace)?;
        Ok(self.alloc_expr(ExprKind::Dict(entries), start.merge(end)))
    }

    /// `for t in iter` followed by any mix of `for` and `if` clauses.
    fn comprehension_clauses(&mut self) -> PResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        loop {
            if self.eat(&TokenKind::For) {
                let target = self.loop_target()?;
                self.expect(&TokenKind::In)?;
                let iter = self.binary(1)?;
                clauses.push(Clause::For { target, iter });
            } else if self.eat(&TokenKind::If) {
                clauses.push(Clause::If(self.binary(1)?));
            } else {
                return Ok(clauses);
            }
        }
    }

    /// Loop variables: one or more assignable operands separated by commas.
    pub(super) fn loop_target(&mut self) -> PResult<ExprId> {
        let first = self.postfix()?;
        let target = if self.check(&TokenKind::Comma) {
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::In) {
                    break;
                }
                items.push(self.postfix()?);
            }
            let span = self.span_of(first).merge(self.prev_span());
            self.alloc_expr(ExprKind::Tuple(items), span)
        } else {
            first
        };
        self.check_assign_target(target)?;
        Ok(target)
    }

    /// Reject assignment to anything other than names, attributes, indexes,
    /// and tuples/lists of those.
    pub(super) fn check_assign_target(&self, target: ExprId) -> PResult<()> {
        let expr = self.arena.expr(target);
        match &expr.kind {
            ExprKind::Ident(_) | ExprKind::Attr { .. } | ExprKind::Index { .. } => Ok(()),
            ExprKind::Tuple(items) | ExprKind::List(items) if !items.is_empty() => items
                .iter()
                .try_for_each(|item| self.check_assign_target(*item)),
            _ => Err(SyntaxError::new("cannot assign to this expression", expr.span)),
        }
    }
}
