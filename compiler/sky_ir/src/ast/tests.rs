use super::*;
use pretty_assertions::assert_eq;

fn expr(kind: ExprKind, start: u32, end: u32) -> Expr {
    Expr {
        kind,
        span: Span::new(start, end),
    }
}

#[test]
fn arena_ids_are_sequential() {
    let mut arena = SyntaxArena::new();
    let a = arena.alloc_expr(expr(ExprKind::Int(1), 0, 1));
    let b = arena.alloc_expr(expr(ExprKind::Int(2), 2, 3));
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(arena.expr(b).kind, ExprKind::Int(2));
    assert_eq!(arena.expr_count(), 2);
}

#[test]
fn module_lists_loads_in_order() {
    let mut module = Module::default();
    let first = module.arena.alloc_stmt(Stmt {
        kind: StmtKind::Load {
            module: "a.sky".to_string(),
            symbols: vec![],
        },
        span: Span::new(0, 10),
    });
    let value = module.arena.alloc_expr(expr(ExprKind::None, 11, 15));
    let middle = module.arena.alloc_stmt(Stmt {
        kind: StmtKind::Expr(value),
        span: Span::new(11, 15),
    });
    let last = module.arena.alloc_stmt(Stmt {
        kind: StmtKind::Load {
            module: "b.sky".to_string(),
            symbols: vec![],
        },
        span: Span::new(16, 26),
    });
    module.body = vec![first, middle, last];

    let loads: Vec<_> = module.loads().map(|(name, _)| name).collect();
    assert_eq!(loads, vec!["a.sky", "b.sky"]);
}

#[test]
fn assign_op_maps_to_binary_op() {
    assert_eq!(AssignOp::Add.binary_op(), BinaryOp::Add);
    assert_eq!(AssignOp::FloorDiv.binary_op(), BinaryOp::FloorDiv);
    assert_eq!(AssignOp::Shr.binary_op().as_symbol(), ">>");
}
