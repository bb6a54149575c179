//! Runtime values.
//!
//! `Value` is a cheap-to-clone handle: scalars are inline, everything else
//! sits behind an `Rc`. Lists and dicts carry their own frozen flag and an
//! optional [`ValueGuard`] that admits (and converts) every stored element;
//! the typed-record bridge uses guards for repeated and map fields.

mod dict;
mod function;
mod guard;
mod hash_key;
mod list;
mod namespace;
mod native;
mod repr;

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

pub use dict::DictValue;
pub use function::{BuiltinFunction, FunctionBody, FunctionValue, ParamSpec};
pub use guard::ValueGuard;
pub use hash_key::HashKey;
pub use list::ListValue;
pub use namespace::{ModuleValue, Namespace};
pub use native::NativeObject;

use crate::errors::{type_mismatch, unsupported_binary, EvalError};

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<ListValue>),
    Tuple(Rc<[Value]>),
    Dict(Rc<DictValue>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinFunction>),
    Native(Rc<dyn NativeObject>),
}

impl Value {
    // ===== Constructors =====

    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(ListValue::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::from(items))
    }

    pub fn dict(dict: DictValue) -> Value {
        Value::Dict(Rc::new(dict))
    }

    pub fn native<T: NativeObject>(object: T) -> Value {
        Value::Native(Rc::new(object))
    }

    pub fn builtin(
        name: &str,
        func: impl Fn(&mut crate::Interpreter, crate::Arguments) -> crate::EvalResult + 'static,
    ) -> Value {
        Value::Builtin(Rc::new(BuiltinFunction::new(name, func)))
    }

    // ===== Inspection =====

    /// Type name as reported by `type(x)` and in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::Dict(_) => "dict".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Native(n) => n.type_name(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
            Value::Native(n) => n.truthy(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Downcast a native object to its concrete host type.
    pub fn downcast_native<T: NativeObject>(&self) -> Option<&T> {
        match self {
            Value::Native(n) => n.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::Builtin(_) => true,
            Value::Native(n) => n.is_callable(),
            _ => false,
        }
    }

    /// Length of strings (in characters) and containers.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(l) => Some(l.len()),
            Value::Tuple(t) => Some(t.len()),
            Value::Dict(d) => Some(d.len()),
            _ => None,
        }
    }

    /// Elements produced by `for x in value`.
    ///
    /// Lists are snapshotted, so the loop body may mutate the list it
    /// iterates without invalidating the iteration.
    pub fn iterate(&self) -> Result<Vec<Value>, EvalError> {
        match self {
            Value::List(l) => Ok(l.snapshot()),
            Value::Tuple(t) => Ok(t.to_vec()),
            Value::Dict(d) => Ok(d.keys()),
            other => Err(EvalError::new(format!(
                "{} value is not iterable",
                other.type_name()
            ))),
        }
    }

    // ===== Mutability =====

    /// Make this value and everything reachable from it immutable.
    pub fn freeze(&self) {
        match self {
            Value::List(l) => l.freeze(),
            Value::Tuple(t) => t.iter().for_each(Value::freeze),
            Value::Dict(d) => d.freeze(),
            Value::Function(f) => f.freeze(),
            Value::Native(n) => n.freeze(),
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Builtin(_) => {}
        }
    }

    pub fn is_frozen(&self) -> bool {
        match self {
            Value::List(l) => l.is_frozen(),
            Value::Dict(d) => d.is_frozen(),
            Value::Native(n) => n.is_frozen(),
            _ => true,
        }
    }

    // ===== Comparison =====

    /// Structural equality; ints and floats compare numerically.
    pub fn equals(&self, other: &Value) -> Result<bool, EvalError> {
        Ok(match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            #[allow(clippy::cast_precision_loss)]
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || seq_equals(&a.snapshot(), &b.snapshot())?
            }
            (Value::Tuple(a), Value::Tuple(b)) => seq_equals(a, b)?,
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || a.equals(b)?,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)) || a.equals(b.as_ref())?
            }
            _ => false,
        })
    }

    /// Ordering for `<`, `sorted`, `min`, `max`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, EvalError> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            #[allow(clippy::cast_precision_loss)]
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = self.as_f64().unwrap_or(f64::NAN);
                let b = other.as_f64().unwrap_or(f64::NAN);
                Ok(a.total_cmp(&b))
            }
            (Value::List(a), Value::List(b)) => seq_compare(&a.snapshot(), &b.snapshot()),
            (Value::Tuple(a), Value::Tuple(b)) => seq_compare(a, b),
            _ => Err(unsupported_binary(
                "<",
                &self.type_name(),
                &other.type_name(),
            )),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Require a specific variant for a positional context, e.g. `x[i]`.
    pub(crate) fn expect_int(&self, what: &str) -> Result<i64, EvalError> {
        self.as_int()
            .ok_or_else(|| type_mismatch(&format!("int {what}"), &self.type_name()))
    }
}

fn seq_equals(a: &[Value], b: &[Value]) -> Result<bool, EvalError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn seq_compare(a: &[Value], b: &[Value]) -> Result<Ordering, EvalError> {
    for (x, y) in a.iter().zip(b) {
        match x.compare(y)? {
            Ordering::Equal => {}
            other => return Ok(other),
        }
    }
    Ok(a.len().cmp(&b.len()))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

/// `str(x)`: strings print raw, everything else as its repr.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.repr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

#[cfg(test)]
mod tests;
