//! Expression evaluation.

use std::rc::Rc;

use sky_ir::{BinaryOp, Clause, ComprehensionKind, ExprId, ExprKind};
use sky_stack::ensure_sufficient_stack;

use super::normalize_index;
use super::Ctx;
use crate::errors::{index_out_of_range, key_not_found, undefined_variable, EvalError};
use crate::methods::get_attr;
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;
use crate::value::{DictValue, FunctionBody, FunctionValue, ListValue, Value};
use crate::{EvalResult, Interpreter};

impl Interpreter {
    /// Evaluate an expression; errors are positioned at the innermost
    /// failing expression.
    pub(crate) fn eval_expr(&mut self, ctx: &Ctx, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(ctx, id))
            .map_err(|e| e.at(ctx.position_of(id)))
    }

    pub(crate) fn lookup(&self, ctx: &Ctx, name: &str) -> EvalResult {
        if let Some(value) = ctx.scope.as_ref().and_then(|s| s.lookup(name)) {
            return Ok(value);
        }
        if let Some(value) = ctx.env.global(name) {
            return Ok(value);
        }
        if let Some(value) = ctx.env.predeclared().get(name) {
            return Ok(value.clone());
        }
        self.universe
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_variable(name))
    }

    fn eval_expr_inner(&mut self, ctx: &Ctx, id: ExprId) -> EvalResult {
        let expr = ctx.module().expr(id);
        match &expr.kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::str(s)),
            ExprKind::Ident(name) => self.lookup(ctx, name),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(ctx, items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(ctx, items)?)),
            ExprKind::Dict(entries) => {
                let dict = DictValue::new();
                for (key, value) in entries {
                    let key = self.eval_expr(ctx, *key)?;
                    let value = self.eval_expr(ctx, *value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Attr { receiver, name } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                get_attr(&receiver, name)
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                let index = self.eval_expr(ctx, *index)?;
                get_index(&receiver, &index)
            }
            ExprKind::Slice {
                receiver,
                start,
                end,
                step,
            } => {
                let receiver = self.eval_expr(ctx, *receiver)?;
                let start = self.eval_opt(ctx, *start)?;
                let end = self.eval_opt(ctx, *end)?;
                let step = self.eval_opt(ctx, *step)?;
                slice(&receiver, &start, &end, &step)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.eval_expr(ctx, *callee)?;
                let args = self.eval_args(ctx, args)?;
                self.call_value(&callee, args, Some(ctx.position_of(id)))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(ctx, *operand)?;
                evaluate_unary(*op, &operand)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.eval_expr(ctx, *left)?;
                if left.truthy() {
                    self.eval_expr(ctx, *right)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.eval_expr(ctx, *left)?;
                if left.truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(ctx, *right)
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(ctx, *left)?;
                let right = self.eval_expr(ctx, *right)?;
                evaluate_binary(*op, &left, &right)
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(ctx, *cond)?.truthy() {
                    self.eval_expr(ctx, *then)
                } else {
                    self.eval_expr(ctx, *otherwise)
                }
            }
            ExprKind::Lambda { params, body } => {
                let params = self.eval_params(ctx, params)?;
                let function = FunctionValue::new(
                    Rc::from("lambda"),
                    params,
                    FunctionBody::Expr(*body),
                    Rc::clone(&ctx.env),
                    ctx.scope.clone(),
                );
                Ok(Value::Function(Rc::new(function)))
            }
            ExprKind::Comprehension { kind, clauses } => {
                let inner = ctx.nested();
                match kind {
                    ComprehensionKind::List { .. } => {
                        let out = ListValue::new(Vec::new());
                        self.comprehension(&inner, kind, clauses, &Sink::List(&out))?;
                        Ok(Value::List(Rc::new(out)))
                    }
                    ComprehensionKind::Dict { .. } => {
                        let out = DictValue::new();
                        self.comprehension(&inner, kind, clauses, &Sink::Dict(&out))?;
                        Ok(Value::dict(out))
                    }
                }
            }
        }
    }

    fn eval_all(&mut self, ctx: &Ctx, items: &[ExprId]) -> Result<Vec<Value>, EvalError> {
        items.iter().map(|id| self.eval_expr(ctx, *id)).collect()
    }

    fn eval_opt(&mut self, ctx: &Ctx, id: Option<ExprId>) -> EvalResult {
        match id {
            Some(id) => self.eval_expr(ctx, id),
            None => Ok(Value::None),
        }
    }

    /// Run the remaining clauses, emitting one element per innermost
    /// iteration.
    fn comprehension(
        &mut self,
        ctx: &Ctx,
        kind: &ComprehensionKind,
        clauses: &[Clause],
        sink: &Sink<'_>,
    ) -> Result<(), EvalError> {
        let Some((clause, rest)) = clauses.split_first() else {
            return match kind {
                ComprehensionKind::List { element } => {
                    let value = self.eval_expr(ctx, *element)?;
                    sink.push(value, None)
                }
                ComprehensionKind::Dict { key, value } => {
                    let k = self.eval_expr(ctx, *key)?;
                    let v = self.eval_expr(ctx, *value)?;
                    sink.push(k, Some(v))
                }
            };
        };
        match clause {
            Clause::For { target, iter } => {
                let items = self
                    .eval_expr(ctx, *iter)?
                    .iterate()
                    .map_err(|e| e.at(ctx.position_of(*iter)))?;
                for item in items {
                    self.assign(ctx, *target, item)?;
                    self.comprehension(ctx, kind, rest, sink)?;
                }
                Ok(())
            }
            Clause::If(cond) => {
                if self.eval_expr(ctx, *cond)?.truthy() {
                    self.comprehension(ctx, kind, rest, sink)?;
                }
                Ok(())
            }
        }
    }
}

enum Sink<'a> {
    List(&'a ListValue),
    Dict(&'a DictValue),
}

impl Sink<'_> {
    fn push(&self, key: Value, value: Option<Value>) -> Result<(), EvalError> {
        match self {
            Sink::List(list) => list.push(key),
            Sink::Dict(dict) => dict.insert(key, value.unwrap_or(Value::None)),
        }
    }
}

/// `x[i]` for lists, tuples, strings, dicts, and natives that expose no
/// indexing (error).
pub(crate) fn get_index(receiver: &Value, index: &Value) -> EvalResult {
    match receiver {
        Value::List(list) => {
            let i = index.expect_int("index")?;
            let len = list.len();
            normalize_index(i, len)
                .and_then(|slot| list.get(slot))
                .ok_or_else(|| index_out_of_range(i, len))
        }
        Value::Tuple(items) => {
            let i = index.expect_int("index")?;
            normalize_index(i, items.len())
                .map(|slot| items[slot].clone())
                .ok_or_else(|| index_out_of_range(i, items.len()))
        }
        Value::Str(s) => {
            let i = index.expect_int("index")?;
            let len = s.chars().count();
            normalize_index(i, len)
                .and_then(|slot| s.chars().nth(slot))
                .map(|c| Value::from(c.to_string()))
                .ok_or_else(|| index_out_of_range(i, len))
        }
        Value::Dict(dict) => dict
            .get(index)?
            .ok_or_else(|| key_not_found(&index.repr())),
        other => Err(EvalError::new(format!(
            "unhandled index operation {}[{}]",
            other.type_name(),
            index.type_name()
        ))),
    }
}

fn slice(receiver: &Value, start: &Value, end: &Value, step: &Value) -> EvalResult {
    let len = match receiver.len() {
        Some(len) if !matches!(receiver, Value::Dict(_)) => len,
        _ => {
            return Err(EvalError::new(format!(
                "invalid slice operand {}",
                receiver.type_name()
            )))
        }
    };
    let indices = slice_indices(len, start, end, step)?;
    Ok(match receiver {
        Value::List(list) => {
            let items = list.borrow();
            Value::list(indices.iter().map(|&i| items[i].clone()).collect())
        }
        Value::Tuple(items) => Value::tuple(indices.iter().map(|&i| items[i].clone()).collect()),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Value::from(indices.iter().map(|&i| chars[i]).collect::<String>())
        }
        _ => Value::None,
    })
}

fn slice_bound(value: &Value, what: &str) -> Result<Option<i64>, EvalError> {
    match value {
        Value::None => Ok(None),
        other => other.expect_int(what).map(Some),
    }
}

/// Python slice semantics over `0..len`.
fn slice_indices(
    len: usize,
    start: &Value,
    end: &Value,
    step: &Value,
) -> Result<Vec<usize>, EvalError> {
    let n = i64::try_from(len).unwrap_or(i64::MAX);
    let step = slice_bound(step, "slice step")?.unwrap_or(1);
    if step == 0 {
        return Err(EvalError::new("slice step cannot be zero"));
    }
    let (lo, hi) = if step > 0 { (0, n) } else { (-1, n - 1) };
    let clamp = |bound: Option<i64>, default: i64| match bound {
        None => default,
        Some(b) if b < 0 => (b + n).clamp(lo, hi),
        Some(b) => b.clamp(lo, hi),
    };
    let start = clamp(slice_bound(start, "slice start")?, if step > 0 { lo } else { hi });
    let end = clamp(slice_bound(end, "slice end")?, if step > 0 { hi } else { lo });

    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        out.extend(usize::try_from(i).ok());
        i += step;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(len: usize, start: Value, end: Value, step: Value) -> Vec<usize> {
        slice_indices(len, &start, &end, &step).unwrap_or_default()
    }

    #[test]
    fn slices_follow_python_bounds() {
        assert_eq!(idx(5, Value::Int(1), Value::Int(3), Value::None), vec![1, 2]);
        assert_eq!(idx(5, Value::Int(-2), Value::None, Value::None), vec![3, 4]);
        assert_eq!(idx(5, Value::None, Value::None, Value::Int(-1)), vec![4, 3, 2, 1, 0]);
        assert_eq!(idx(5, Value::None, Value::None, Value::Int(2)), vec![0, 2, 4]);
        assert_eq!(idx(3, Value::Int(10), Value::Int(20), Value::None), Vec::<usize>::new());
    }

    #[test]
    fn zero_step_is_an_error() {
        assert!(slice_indices(3, &Value::None, &Value::None, &Value::Int(0)).is_err());
    }
}
