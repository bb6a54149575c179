//! Argument evaluation and parameter binding for script functions.

use std::rc::Rc;

use sky_ir::{Argument, ParamKind};

use super::{Ctx, Flow};
use crate::environment::Scope;
use crate::errors::{argument_mismatch, EvalError};
use crate::value::{DictValue, FunctionBody, FunctionValue, Value};
use crate::{Arguments, EvalResult, Interpreter};

impl Interpreter {
    pub(crate) fn eval_args(&mut self, ctx: &Ctx, args: &[Argument]) -> Result<Arguments, EvalError> {
        let mut out = Arguments::default();
        for arg in args {
            match arg {
                Argument::Positional(expr) => out.positional.push(self.eval_expr(ctx, *expr)?),
                Argument::Named(name, expr) => {
                    let value = self.eval_expr(ctx, *expr)?;
                    out.named.push((Rc::from(name.as_str()), value));
                }
                Argument::Star(expr) => {
                    let value = self.eval_expr(ctx, *expr)?;
                    let items = value.iterate().map_err(|e| e.at(ctx.position_of(*expr)))?;
                    out.positional.extend(items);
                }
                Argument::StarStar(expr) => {
                    let value = self.eval_expr(ctx, *expr)?;
                    let Value::Dict(dict) = &value else {
                        return Err(EvalError::new(format!(
                            "argument after ** must be a dict, not {}",
                            value.type_name()
                        ))
                        .at(ctx.position_of(*expr)));
                    };
                    for (key, value) in dict.items() {
                        let Value::Str(name) = key else {
                            return Err(EvalError::new("keywords must be strings")
                                .at(ctx.position_of(*expr)));
                        };
                        out.named.push((name, value));
                    }
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn call_function(&mut self, function: &Rc<FunctionValue>, args: Arguments) -> EvalResult {
        let scope = Scope::new(function.closure.clone());
        bind_params(function, args, &scope)?;
        let ctx = Ctx {
            env: Rc::clone(&function.env),
            scope: Some(scope),
        };
        match &function.body {
            FunctionBody::Block(stmts) => match self.exec_block(&ctx, stmts)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal | Flow::Break | Flow::Continue => Ok(Value::None),
            },
            FunctionBody::Expr(expr) => self.eval_expr(&ctx, *expr),
        }
    }
}

/// Bind call arguments to a function's parameters in `scope`.
///
/// Normal parameters after `*args` are keyword-only.
fn bind_params(function: &FunctionValue, args: Arguments, scope: &Scope) -> Result<(), EvalError> {
    let name = &function.name;
    let params = &function.params;
    let mut bound: Vec<Option<Value>> = vec![None; params.len()];

    let positional_slots: Vec<usize> = params
        .iter()
        .take_while(|p| p.kind == ParamKind::Normal)
        .enumerate()
        .map(|(i, _)| i)
        .collect();
    let varargs = params.iter().position(|p| p.kind == ParamKind::Args);
    let kwargs = params.iter().position(|p| p.kind == ParamKind::Kwargs);

    let mut positional = args.positional.into_iter();
    for &slot in &positional_slots {
        match positional.next() {
            Some(value) => bound[slot] = Some(value),
            None => break,
        }
    }
    let extra: Vec<Value> = positional.collect();
    match varargs {
        Some(slot) => bound[slot] = Some(Value::tuple(extra)),
        None if !extra.is_empty() => {
            return Err(argument_mismatch(
                name,
                format!(
                    "accepts at most {} positional arguments ({} given)",
                    positional_slots.len(),
                    positional_slots.len() + extra.len()
                ),
            ));
        }
        None => {}
    }

    let extra_named = DictValue::new();
    for (key, value) in args.named {
        let slot = params
            .iter()
            .position(|p| p.kind == ParamKind::Normal && *p.name == *key);
        match slot {
            Some(slot) if bound[slot].is_some() => {
                return Err(argument_mismatch(
                    name,
                    format!("got multiple values for parameter \"{key}\""),
                ));
            }
            Some(slot) => bound[slot] = Some(value),
            None if kwargs.is_some() => extra_named.insert(Value::Str(key), value)?,
            None => {
                return Err(argument_mismatch(
                    name,
                    format!("unexpected keyword argument \"{key}\""),
                ));
            }
        }
    }
    if let Some(slot) = kwargs {
        bound[slot] = Some(Value::dict(extra_named));
    }

    for (param, value) in params.iter().zip(bound) {
        let value = match (value, &param.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(argument_mismatch(
                    name,
                    format!("missing argument for {}", param.name),
                ));
            }
        };
        scope.set(&param.name, value);
    }
    Ok(())
}
