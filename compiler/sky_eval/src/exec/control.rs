//! Statements and assignment.

use std::rc::Rc;

use sky_ir::{AssignOp, BinaryOp, ExprId, ExprKind, Param, ParamKind, StmtId, StmtKind};

use super::{Ctx, Flow};
use crate::errors::{index_out_of_range, EvalError};
use crate::operators::evaluate_binary;
use crate::value::{FunctionBody, FunctionValue, ParamSpec, Value};
use crate::Interpreter;

impl Interpreter {
    pub(crate) fn exec_block(&mut self, ctx: &Ctx, stmts: &[StmtId]) -> Result<Flow, EvalError> {
        for &id in stmts {
            match self.exec_stmt(ctx, id)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, ctx: &Ctx, id: StmtId) -> Result<Flow, EvalError> {
        let stmt = ctx.module().stmt(id);
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(ctx, *expr)?;
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(ctx, *value)?;
                self.assign(ctx, *target, value)?;
            }
            StmtKind::AugAssign { target, op, value } => {
                self.aug_assign(ctx, *target, *op, *value)?;
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if self.eval_expr(ctx, *cond)?.truthy() {
                    then
                } else {
                    otherwise
                };
                return self.exec_block(ctx, branch);
            }
            StmtKind::For { target, iter, body } => {
                let items = self
                    .eval_expr(ctx, *iter)?
                    .iterate()
                    .map_err(|e| e.at(ctx.position_of(*iter)))?;
                for item in items {
                    self.assign(ctx, *target, item)?;
                    match self.exec_block(ctx, body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            StmtKind::Def { name, params, body } => {
                let params = self.eval_params(ctx, params)?;
                let function = FunctionValue::new(
                    Rc::from(name.as_str()),
                    params,
                    FunctionBody::Block(Rc::from(body.as_slice())),
                    Rc::clone(&ctx.env),
                    ctx.scope.clone(),
                );
                ctx.bind(name, Value::Function(Rc::new(function)));
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(ctx, *expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Pass => {}
            StmtKind::Load { .. } => {
                return Err(EvalError::new("load statement must be at top level")
                    .at(ctx.env.position(stmt.span)));
            }
        }
        Ok(Flow::Normal)
    }

    /// Evaluate parameter defaults once, at definition time.
    pub(crate) fn eval_params(
        &mut self,
        ctx: &Ctx,
        params: &[Param],
    ) -> Result<Vec<ParamSpec>, EvalError> {
        params
            .iter()
            .map(|param| {
                let default = match param.default {
                    Some(expr) if param.kind == ParamKind::Normal => {
                        Some(self.eval_expr(ctx, expr)?)
                    }
                    _ => None,
                };
                Ok(ParamSpec {
                    name: Rc::from(param.name.as_str()),
                    default,
                    kind: param.kind,
                })
            })
            .collect()
    }

    pub(crate) fn assign(&mut self, ctx: &Ctx, target: ExprId, value: Value) -> Result<(), EvalError> {
        let expr = ctx.module().expr(target);
        let result = match &expr.kind {
            ExprKind::Ident(name) => {
                ctx.bind(name, value);
                Ok(())
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                let items = value.iterate()?;
                if items.len() != targets.len() {
                    let detail = if items.len() > targets.len() {
                        "too many values to unpack"
                    } else {
                        "too few values to unpack"
                    };
                    return Err(EvalError::new(format!(
                        "{detail} (got {}, want {})",
                        items.len(),
                        targets.len()
                    ))
                    .at(ctx.position_of(target)));
                }
                for (t, item) in targets.iter().zip(items) {
                    self.assign(ctx, *t, item)?;
                }
                Ok(())
            }
            ExprKind::Attr { receiver, name } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                set_attr(&receiver, name, value)
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                let index = self.eval_expr(ctx, *index)?;
                set_index(&receiver, &index, value)
            }
            _ => Err(EvalError::new("cannot assign to this expression")),
        };
        result.map_err(|e| e.at(ctx.position_of(target)))
    }

    /// `x op= y`: the target's receiver and index are evaluated once. Lists
    /// extend in place under `+=`.
    fn aug_assign(
        &mut self,
        ctx: &Ctx,
        target: ExprId,
        op: AssignOp,
        value: ExprId,
    ) -> Result<(), EvalError> {
        let op = op.binary_op();
        let expr = ctx.module().expr(target);
        let at = |e: EvalError| e.at(ctx.position_of(target));
        match &expr.kind {
            ExprKind::Ident(name) => {
                let current = self.lookup(ctx, name).map_err(at)?;
                let rhs = self.eval_expr(ctx, value)?;
                let updated = combine(op, current, rhs).map_err(at)?;
                ctx.bind(name, updated);
            }
            ExprKind::Attr { receiver, name } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                let current = crate::methods::get_attr(&receiver, name).map_err(at)?;
                let rhs = self.eval_expr(ctx, value)?;
                let updated = combine(op, current, rhs).map_err(at)?;
                set_attr(&receiver, name, updated).map_err(at)?;
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                let index = self.eval_expr(ctx, *index)?;
                let current = super::expr::get_index(&receiver, &index).map_err(at)?;
                let rhs = self.eval_expr(ctx, value)?;
                let updated = combine(op, current, rhs).map_err(at)?;
                set_index(&receiver, &index, updated).map_err(at)?;
            }
            _ => return Err(at(EvalError::new("invalid target for augmented assignment"))),
        }
        Ok(())
    }
}

fn combine(op: BinaryOp, current: Value, rhs: Value) -> Result<Value, EvalError> {
    if let (BinaryOp::Add, Value::List(list)) = (op, &current) {
        list.extend(rhs.iterate()?)?;
        return Ok(current);
    }
    evaluate_binary(op, &current, &rhs)
}

fn set_attr(receiver: &Value, name: &str, value: Value) -> Result<(), EvalError> {
    match receiver {
        Value::Native(object) => object.set_attr(name, value),
        other => Err(EvalError::new(format!(
            "{} value does not support field assignment (.{name})",
            other.type_name()
        ))),
    }
}

fn set_index(receiver: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
    match receiver {
        Value::List(list) => {
            let i = index.expect_int("index")?;
            let len = list.len();
            let slot = normalize_index(i, len).ok_or_else(|| index_out_of_range(i, len))?;
            list.set(slot, value)
        }
        Value::Dict(dict) => dict.insert(index.clone(), value),
        other => Err(EvalError::new(format!(
            "{} value does not support item assignment",
            other.type_name()
        ))),
    }
}

/// Map a possibly negative index into `0..len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let i = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}
