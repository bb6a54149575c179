//! Binary operator implementations for the evaluator.
//!
//! Direct enum-based dispatch over the fixed set of value variants. `and`
//! and `or` short-circuit in the expression walker and never reach here.

use std::cmp::Ordering;
use std::rc::Rc;

use sky_ir::BinaryOp;

use crate::errors::{division_by_zero, integer_overflow, unsupported_binary, EvalError};
use crate::format::percent_format;
use crate::value::{DictValue, Value};
use crate::EvalResult;

/// Upper bound on the length of a repeated string or sequence.
const MAX_REPEAT_LEN: usize = 1 << 28;

#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Evaluate a binary operation.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Eq => return left.equals(right).map(Value::Bool),
        BinaryOp::NotEq => return left.equals(right).map(|eq| Value::Bool(!eq)),
        BinaryOp::Lt => return compare(left, right, op, Ordering::is_lt),
        BinaryOp::LtEq => return compare(left, right, op, Ordering::is_le),
        BinaryOp::Gt => return compare(left, right, op, Ordering::is_gt),
        BinaryOp::GtEq => return compare(left, right, op, Ordering::is_ge),
        BinaryOp::In => return contains(right, left).map(Value::Bool),
        BinaryOp::NotIn => return contains(right, left).map(|found| Value::Bool(!found)),
        _ => {}
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (left.as_f64().unwrap_or(0.0), right.as_f64().unwrap_or(0.0));
            eval_float_binary(a, b, op).ok_or_else(|| mismatch(op, left, right))?
        }
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Value::from(s))
        }
        (Value::Str(format), args) if op == BinaryOp::Mod => {
            percent_format(format, args).map(Value::from)
        }
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) if op == BinaryOp::Mul => {
            let count = repeat_count(s.len(), *n)?;
            Ok(Value::from(s.repeat(count)))
        }
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = a.snapshot();
            items.extend(b.snapshot());
            Ok(Value::list(items))
        }
        (Value::List(list), Value::Int(n)) | (Value::Int(n), Value::List(list))
            if op == BinaryOp::Mul =>
        {
            Ok(Value::list(repeat(&list.snapshot(), *n)?))
        }
        (Value::Tuple(a), Value::Tuple(b)) if op == BinaryOp::Add => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Tuple(items), Value::Int(n)) | (Value::Int(n), Value::Tuple(items))
            if op == BinaryOp::Mul =>
        {
            Ok(Value::tuple(repeat(items, *n)?))
        }
        (Value::Dict(a), Value::Dict(b)) if op == BinaryOp::BitOr => {
            let merged = DictValue::from_pairs(a.items())?;
            for (key, value) in b.items() {
                merged.insert(key, value)?;
            }
            Ok(Value::Dict(Rc::new(merged)))
        }
        _ => Err(mismatch(op, left, right)),
    }
}

#[cold]
fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    unsupported_binary(op.as_symbol(), &left.type_name(), &right.type_name())
}

fn compare(left: &Value, right: &Value, op: BinaryOp, test: fn(Ordering) -> bool) -> EvalResult {
    match left.compare(right) {
        Ok(ordering) => Ok(Value::Bool(test(ordering))),
        Err(_) => Err(mismatch(op, left, right)),
    }
}

/// `needle in haystack`.
fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvalError> {
    match haystack {
        Value::List(list) => {
            for item in list.snapshot() {
                if item.equals(needle)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Tuple(items) => {
            for item in items.iter() {
                if item.equals(needle)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Dict(dict) => dict.contains_key(needle),
        Value::Str(s) => match needle {
            Value::Str(sub) => Ok(s.contains(&**sub)),
            other => Err(EvalError::new(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        other => Err(unsupported_binary(
            "in",
            &needle.type_name(),
            &other.type_name(),
        )),
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        #[allow(clippy::cast_precision_loss)]
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(division_by_zero());
            }
            checked_arith(floor_div(a, b), "floor division")
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(division_by_zero());
            }
            Ok(Value::Int(floor_mod(a, b)))
        }
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Shl => {
            let shift = shift_count(b)?;
            let shifted = a.checked_shl(shift).filter(|r| r >> shift == a);
            checked_arith(shifted, "left shift")
        }
        BinaryOp::Shr => {
            let shift = shift_count(b)?;
            Ok(Value::Int(a >> shift))
        }
        _ => Err(unsupported_binary(op.as_symbol(), "int", "int")),
    }
}

/// Floor division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn shift_count(b: i64) -> Result<u32, EvalError> {
    u32::try_from(b)
        .ok()
        .filter(|&s| s < 64)
        .ok_or_else(|| EvalError::new(format!("shift count out of range: {b}")))
}

/// `None` when the operator does not apply to floats.
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Option<EvalResult> {
    Some(match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div if b == 0.0 => Err(division_by_zero()),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => Err(division_by_zero()),
        BinaryOp::FloorDiv => Ok(Value::Float((a / b).floor())),
        BinaryOp::Mod => Ok(Value::Float(a - b * (a / b).floor())),
        _ => return None,
    })
}

fn repeat_count(unit_len: usize, n: i64) -> Result<usize, EvalError> {
    let count = usize::try_from(n.max(0)).unwrap_or(usize::MAX);
    match unit_len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(integer_overflow("repetition")),
    }
}

fn repeat(items: &[Value], n: i64) -> Result<Vec<Value>, EvalError> {
    let count = repeat_count(items.len(), n)?;
    let mut out = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
