use std::rc::Rc;

use super::method_name;
use crate::args::arg;
use crate::errors::{key_not_found, EvalError};
use crate::value::{DictValue, Value};
use crate::{Arguments, EvalResult};

pub(super) const METHODS: &[&str] = &[
    "clear",
    "get",
    "items",
    "keys",
    "pop",
    "popitem",
    "setdefault",
    "update",
    "values",
];

pub(super) fn call(dict: &Rc<DictValue>, qualified: &str, args: Arguments) -> EvalResult {
    let f = qualified;
    match method_name(qualified) {
        "clear" => {
            args.no_args(f)?;
            dict.clear()?;
            Ok(Value::None)
        }
        "get" => {
            let [key, default] = args.bind(f, ["key", "default?"])?;
            Ok(dict.get(&arg(key))?.unwrap_or_else(|| arg(default)))
        }
        "items" => {
            args.no_args(f)?;
            Ok(Value::list(
                dict.items()
                    .into_iter()
                    .map(|(k, v)| Value::tuple(vec![k, v]))
                    .collect(),
            ))
        }
        "keys" => {
            args.no_args(f)?;
            Ok(Value::list(dict.keys()))
        }
        "values" => {
            args.no_args(f)?;
            Ok(Value::list(dict.values()))
        }
        "pop" => {
            let [key, default] = args.bind(f, ["key", "default?"])?;
            let key = arg(key);
            match (dict.remove(&key)?, default) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default),
                (None, None) => Err(key_not_found(&key.repr())),
            }
        }
        "popitem" => {
            args.no_args(f)?;
            match dict.pop_first()? {
                Some((k, v)) => Ok(Value::tuple(vec![k, v])),
                None => Err(EvalError::new(format!("{f}: empty dict"))),
            }
        }
        "setdefault" => {
            let [key, default] = args.bind(f, ["key", "default?"])?;
            let key = arg(key);
            if let Some(existing) = dict.get(&key)? {
                return Ok(existing);
            }
            let default = arg(default);
            dict.insert(key, default.clone())?;
            Ok(default)
        }
        "update" => {
            let Arguments { positional, named } = args;
            if positional.len() > 1 {
                return Err(EvalError::new(format!(
                    "{f}: got {} arguments, want at most 1",
                    positional.len()
                )));
            }
            if let Some(source) = positional.into_iter().next() {
                for (key, value) in update_pairs(f, &source)? {
                    dict.insert(key, value)?;
                }
            }
            for (key, value) in named {
                dict.insert(Value::Str(key), value)?;
            }
            Ok(Value::None)
        }
        other => Err(EvalError::new(format!("dict has no .{other} method"))),
    }
}

/// Pairs from a dict or an iterable of 2-element sequences.
pub(crate) fn update_pairs(f: &str, source: &Value) -> Result<Vec<(Value, Value)>, EvalError> {
    if let Value::Dict(d) = source {
        return Ok(d.items());
    }
    source
        .iterate()?
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let pair = item.iterate().map_err(|_| {
                EvalError::new(format!("{f}: dictionary update sequence element #{i} is not iterable ({})", item.type_name()))
            })?;
            match <[Value; 2]>::try_from(pair) {
                Ok([k, v]) => Ok((k, v)),
                Err(pair) => Err(EvalError::new(format!(
                    "{f}: dictionary update sequence element #{i} has length {}, want 2",
                    pair.len()
                ))),
            }
        })
        .collect()
}
