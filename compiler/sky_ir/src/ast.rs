//! Flat syntax tree for the script dialect.
//!
//! Expressions and statements are stored in a [`SyntaxArena`] and refer to
//! their children by index. A parsed [`Module`] owns its arena, so function
//! values in the evaluator can share one `Rc<Module>` instead of cloning
//! subtrees.

use std::fmt;

use crate::Span;

/// Index into the expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Index into the statement arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        StmtId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtId({})", self.0)
    }
}

/// Binary operators, in no particular precedence order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Source spelling, used in error messages.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    BitNot,
}

/// Compound assignment operators (`+=` and friends).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl AssignOp {
    /// The binary operator this compound assignment applies.
    pub fn binary_op(self) -> BinaryOp {
        match self {
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::FloorDiv => BinaryOp::FloorDiv,
            AssignOp::Mod => BinaryOp::Mod,
            AssignOp::BitAnd => BinaryOp::BitAnd,
            AssignOp::BitOr => BinaryOp::BitOr,
            AssignOp::BitXor => BinaryOp::BitXor,
            AssignOp::Shl => BinaryOp::Shl,
            AssignOp::Shr => BinaryOp::Shr,
        }
    }
}

/// One argument at a call site.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Positional(ExprId),
    Named(String, ExprId),
    /// `*args`
    Star(ExprId),
    /// `**kwargs`
    StarStar(ExprId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Normal,
    /// `*args`
    Args,
    /// `**kwargs`
    Kwargs,
}

/// A function or lambda parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<ExprId>,
    pub kind: ParamKind,
    pub span: Span,
}

/// A `for`/`if` clause inside a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    For { target: ExprId, iter: ExprId },
    If(ExprId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComprehensionKind {
    List { element: ExprId },
    Dict { key: ExprId, value: ExprId },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    List(Vec<ExprId>),
    Tuple(Vec<ExprId>),
    Dict(Vec<(ExprId, ExprId)>),
    Attr {
        receiver: ExprId,
        name: String,
    },
    Index {
        receiver: ExprId,
        index: ExprId,
    },
    Slice {
        receiver: ExprId,
        start: Option<ExprId>,
        end: Option<ExprId>,
        step: Option<ExprId>,
    },
    Call {
        callee: ExprId,
        args: Vec<Argument>,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `then if cond else otherwise`
    Conditional {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    Lambda {
        params: Vec<Param>,
        body: ExprId,
    },
    Comprehension {
        kind: ComprehensionKind,
        clauses: Vec<Clause>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// One symbol imported by a `load` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadSymbol {
    /// Name bound in the importing module.
    pub local: String,
    /// Name exported by the loaded module.
    pub remote: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(ExprId),
    Assign {
        target: ExprId,
        value: ExprId,
    },
    AugAssign {
        target: ExprId,
        op: AssignOp,
        value: ExprId,
    },
    If {
        cond: ExprId,
        then: Vec<StmtId>,
        otherwise: Vec<StmtId>,
    },
    For {
        target: ExprId,
        iter: ExprId,
        body: Vec<StmtId>,
    },
    Def {
        name: String,
        params: Vec<Param>,
        body: Vec<StmtId>,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Pass,
    Load {
        module: String,
        symbols: Vec<LoadSymbol>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Contiguous storage for all expressions and statements of one module.
#[derive(Clone, Debug, Default)]
pub struct SyntaxArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(u32::try_from(self.stmts.len()).unwrap_or(u32::MAX));
        self.stmts.push(stmt);
        id
    }

    /// Get an expression by ID.
    ///
    /// IDs are only ever produced by `alloc_expr` on the same arena.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// A parsed module: its arena plus the top-level statement list.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub arena: SyntaxArena,
    pub body: Vec<StmtId>,
}

impl Module {
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        self.arena.expr(id)
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        self.arena.stmt(id)
    }

    /// Every `load` statement at the top level, in source order.
    pub fn loads(&self) -> impl Iterator<Item = (&str, Span)> + '_ {
        self.body.iter().filter_map(|id| {
            let stmt = self.stmt(*id);
            match &stmt.kind {
                StmtKind::Load { module, .. } => Some((module.as_str(), stmt.span)),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests;
