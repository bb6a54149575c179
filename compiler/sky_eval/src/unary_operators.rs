//! Unary operator implementations for the evaluator.

use sky_ir::UnaryOp;

use crate::errors::{integer_overflow, unsupported_unary};
use crate::value::Value;
use crate::EvalResult;

pub fn evaluate_unary(op: UnaryOp, value: &Value) -> EvalResult {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Int(_) | Value::Float(_)) => Ok(value.clone()),
        (UnaryOp::BitNot, Value::Int(n)) => Ok(Value::Int(!n)),
        (op, v) => Err(unsupported_unary(symbol(op), &v.type_name())),
    }
}

fn symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Pos => "+",
        UnaryOp::Not => "not",
        UnaryOp::BitNot => "~",
    }
}
