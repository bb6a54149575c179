//! Builtin calling convention.
//!
//! Builtins receive an [`Arguments`] and bind it against a fixed parameter
//! list with [`Arguments::bind`]. The typed extractors below produce the
//! uniform `<fn>: for parameter <p>: got <actual>, want <expected>` error.

use std::rc::Rc;

use crate::errors::{argument_mismatch, invalid_argument, EvalError};
use crate::value::{DictValue, ListValue, Value};

/// Evaluated call arguments, in call order.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Vec<(Rc<str>, Value)>,
}

impl Arguments {
    pub fn new(positional: Vec<Value>, named: Vec<(Rc<str>, Value)>) -> Self {
        Arguments { positional, named }
    }

    pub fn positional(values: Vec<Value>) -> Self {
        Arguments {
            positional: values,
            named: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Bind to `params`; a trailing `?` marks a parameter optional.
    ///
    /// Required parameters are always `Some` in the result.
    pub fn bind<const N: usize>(
        self,
        function: &str,
        params: [&str; N],
    ) -> Result<[Option<Value>; N], EvalError> {
        let mut slots: [Option<Value>; N] = std::array::from_fn(|_| None);
        if self.positional.len() > N {
            return Err(argument_mismatch(
                function,
                format!(
                    "got {} arguments, want at most {N}",
                    self.positional.len()
                ),
            ));
        }
        for (slot, value) in slots.iter_mut().zip(self.positional) {
            *slot = Some(value);
        }
        for (name, value) in self.named {
            let Some(i) = params
                .iter()
                .position(|p| p.trim_end_matches('?') == &*name)
            else {
                return Err(argument_mismatch(
                    function,
                    format!("unexpected keyword argument \"{name}\""),
                ));
            };
            if slots[i].is_some() {
                return Err(argument_mismatch(
                    function,
                    format!("got multiple values for parameter \"{name}\""),
                ));
            }
            slots[i] = Some(value);
        }
        for (slot, param) in slots.iter().zip(params) {
            if slot.is_none() && !param.ends_with('?') {
                return Err(argument_mismatch(
                    function,
                    format!("missing argument for {param}"),
                ));
            }
        }
        Ok(slots)
    }

    /// Reject any argument.
    pub fn no_args(self, function: &str) -> Result<(), EvalError> {
        self.bind(function, []).map(|[]| ())
    }
}

/// Unwrap a bound slot; absent optionals read as `None`.
pub fn arg(slot: Option<Value>) -> Value {
    slot.unwrap_or(Value::None)
}

pub fn expect_str(function: &str, param: &str, value: &Value) -> Result<Rc<str>, EvalError> {
    match value {
        Value::Str(s) => Ok(Rc::clone(s)),
        other => Err(invalid_argument(function, param, &other.type_name(), "string")),
    }
}

pub fn expect_int(function: &str, param: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(invalid_argument(function, param, &other.type_name(), "int")),
    }
}

pub fn expect_bool(function: &str, param: &str, value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(invalid_argument(function, param, &other.type_name(), "bool")),
    }
}

pub fn expect_dict(
    function: &str,
    param: &str,
    value: &Value,
) -> Result<Rc<DictValue>, EvalError> {
    match value {
        Value::Dict(d) => Ok(Rc::clone(d)),
        other => Err(invalid_argument(function, param, &other.type_name(), "dict")),
    }
}

pub fn expect_list(
    function: &str,
    param: &str,
    value: &Value,
) -> Result<Rc<ListValue>, EvalError> {
    match value {
        Value::List(l) => Ok(Rc::clone(l)),
        other => Err(invalid_argument(function, param, &other.type_name(), "list")),
    }
}

/// Elements of a list or tuple.
pub fn expect_sequence(
    function: &str,
    param: &str,
    value: &Value,
) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(l) => Ok(l.snapshot()),
        Value::Tuple(t) => Ok(t.to_vec()),
        other => Err(invalid_argument(
            function,
            param,
            &other.type_name(),
            "list or tuple",
        )),
    }
}

/// Optional int with a default when absent or `None`.
pub fn int_or(
    function: &str,
    param: &str,
    slot: Option<Value>,
    default: i64,
) -> Result<i64, EvalError> {
    match slot {
        None | Some(Value::None) => Ok(default),
        Some(value) => expect_int(function, param, &value),
    }
}

/// Optional bool with a default when absent.
pub fn bool_or(
    function: &str,
    param: &str,
    slot: Option<Value>,
    default: bool,
) -> Result<bool, EvalError> {
    match slot {
        None => Ok(default),
        Some(value) => expect_bool(function, param, &value),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str, value: Value) -> (Rc<str>, Value) {
        (Rc::from(name), value)
    }

    #[test]
    fn binds_positional_and_named() {
        let args = Arguments::new(vec![Value::Int(1)], vec![named("sep", Value::str(","))]);
        let [a, b, sep] = args.bind("f", ["a", "b?", "sep?"]).unwrap();
        assert_eq!(a.unwrap().as_int(), Some(1));
        assert!(b.is_none());
        assert_eq!(sep.unwrap().as_str(), Some(","));
    }

    #[test]
    fn binding_errors() {
        let err = Arguments::positional(vec![Value::None; 3])
            .bind("len", ["x"])
            .unwrap_err();
        assert_eq!(err.message, "len: got 3 arguments, want at most 1");

        let err = Arguments::default().bind("len", ["x"]).unwrap_err();
        assert_eq!(err.message, "len: missing argument for x");

        let err = Arguments::new(vec![], vec![named("y", Value::None)])
            .bind("len", ["x?"])
            .unwrap_err();
        assert_eq!(err.message, "len: unexpected keyword argument \"y\"");

        let err = Arguments::new(vec![Value::None], vec![named("x", Value::None)])
            .bind("len", ["x"])
            .unwrap_err();
        assert_eq!(err.message, "len: got multiple values for parameter \"x\"");
    }

    #[test]
    fn extractor_reports_kinds() {
        let err = expect_dict("url.encode_query", "d", &Value::Int(1)).unwrap_err();
        assert_eq!(
            err.message,
            "url.encode_query: for parameter d: got int, want dict"
        );
    }
}
