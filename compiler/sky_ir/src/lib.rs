//! Sky IR - shared syntax types for the skyfold script dialect.
//!
//! The lexer, parser, and evaluator all speak in terms of the types defined
//! here:
//!
//! - [`Span`]: compact byte range into a module's source text
//! - [`LineIndex`]: byte offset to 1-based line/column mapping
//! - [`Module`]: a parsed module whose expressions and statements live in a
//!   flat arena and refer to each other through [`ExprId`] / [`StmtId`]

mod ast;
mod span;

pub use ast::{
    Argument, AssignOp, BinaryOp, Clause, ComprehensionKind, Expr, ExprId, ExprKind, LoadSymbol,
    Module, Param, ParamKind, Stmt, StmtId, StmtKind, SyntaxArena, UnaryOp,
};
pub use span::{LineIndex, Span};
