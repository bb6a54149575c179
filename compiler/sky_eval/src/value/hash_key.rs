use std::rc::Rc;

use super::Value;
use crate::errors::{unhashable, EvalError};

/// Hashable projection of a dict key.
///
/// Numerically equal ints and floats project to the same key, matching
/// `Value::equals`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<HashKey>),
}

impl HashKey {
    pub fn from_value(value: &Value) -> Result<HashKey, EvalError> {
        Ok(match value {
            Value::None => HashKey::None,
            Value::Bool(b) => HashKey::Bool(*b),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(f) => float_key(*f),
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(HashKey::from_value)
                    .collect::<Result<_, _>>()?,
            ),
            other => return Err(unhashable(&other.type_name())),
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_key(f: f64) -> HashKey {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return HashKey::Int(f as i64);
    }
    HashKey::Float(f.to_bits())
}
