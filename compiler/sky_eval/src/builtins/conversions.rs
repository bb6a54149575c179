use std::rc::Rc;

use crate::args::{arg, int_or};
use crate::errors::{invalid_argument, EvalError};
use crate::methods::update_pairs;
use crate::value::{DictValue, Value};
use crate::{Arguments, EvalResult, Interpreter};

pub(super) fn bool_(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("bool", ["x?"])?;
    Ok(Value::Bool(x.is_some_and(|x| x.truthy())))
}

pub(super) fn str_(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("str", ["x?"])?;
    Ok(match x {
        Some(value @ Value::Str(_)) => value,
        Some(value) => Value::from(value.to_str()),
        None => Value::str(""),
    })
}

pub(super) fn repr(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("repr", ["x"])?;
    Ok(Value::from(arg(x).repr()))
}

pub(super) fn type_(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("type", ["x"])?;
    Ok(Value::from(arg(x).type_name()))
}

pub(super) fn int(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x, base] = args.bind("int", ["x?", "base?"])?;
    let Some(x) = x else {
        return Ok(Value::Int(0));
    };
    match (&x, &base) {
        (Value::Str(s), _) => parse_int(s, int_or("int", "base", base, 10)?),
        (_, Some(_)) => Err(EvalError::new("int: can't convert non-string with explicit base")),
        (Value::Int(_), None) => Ok(x),
        (Value::Bool(b), None) => Ok(Value::Int(i64::from(*b))),
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        (Value::Float(f), None) => {
            if !f.is_finite() || f.trunc() >= i64::MAX as f64 || f.trunc() < i64::MIN as f64 {
                return Err(EvalError::new(format!("int: cannot convert {} to int", x.repr())));
            }
            Ok(Value::Int(f.trunc() as i64))
        }
        (other, None) => Err(invalid_argument("int", "x", &other.type_name(), "int, float, bool, or string")),
    }
}

fn parse_int(text: &str, base: i64) -> EvalResult {
    let invalid = || EvalError::new(format!("int: invalid literal with base {base}: {text:?}"));
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, digits) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &digits[2..]),
        (0 | 8, Some("0o")) => (8, &digits[2..]),
        (0 | 2, Some("0b")) => (2, &digits[2..]),
        (0, _) => (10, digits),
        (2..=36, _) => (u32::try_from(base).map_err(|_| invalid())?, digits),
        _ => return Err(EvalError::new(format!("int: base must be 0 or in range 2..=36, got {base}"))),
    };
    if digits.is_empty() {
        return Err(invalid());
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map(Value::Int).ok_or_else(invalid)
}

pub(super) fn float(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("float", ["x?"])?;
    match x {
        None => Ok(Value::Float(0.0)),
        Some(Value::Bool(b)) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Some(x @ (Value::Int(_) | Value::Float(_))) => Ok(Value::Float(x.as_f64().unwrap_or(0.0))),
        Some(Value::Str(s)) => {
            let parsed = match s.trim().to_ascii_lowercase().as_str() {
                "nan" | "+nan" | "-nan" => Some(f64::NAN),
                "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
                "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
                other => other.parse::<f64>().ok(),
            };
            parsed
                .map(Value::Float)
                .ok_or_else(|| EvalError::new(format!("float: invalid float literal: {s:?}")))
        }
        Some(other) => Err(invalid_argument("float", "x", &other.type_name(), "int, float, bool, or string")),
    }
}

pub(super) fn list(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("list", ["iterable?"])?;
    Ok(Value::list(match x {
        Some(x) => x.iterate()?,
        None => Vec::new(),
    }))
}

pub(super) fn tuple(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("tuple", ["iterable?"])?;
    Ok(match x {
        Some(t @ Value::Tuple(_)) => t,
        Some(x) => Value::tuple(x.iterate()?),
        None => Value::tuple(Vec::new()),
    })
}

/// `dict(pairs_or_dict?, **kwargs)`.
pub(super) fn dict(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let Arguments { positional, named } = args;
    if positional.len() > 1 {
        return Err(EvalError::new(format!(
            "dict: got {} arguments, want at most 1",
            positional.len()
        )));
    }
    let out = DictValue::new();
    if let Some(source) = positional.first() {
        for (key, value) in update_pairs("dict", source)? {
            out.insert(key, value)?;
        }
    }
    for (key, value) in named {
        out.insert(Value::Str(key), value)?;
    }
    Ok(Value::Dict(Rc::new(out)))
}
