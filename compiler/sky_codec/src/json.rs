use serde_json::{Map, Number};
use sky_eval::args::{arg, expect_str};
use sky_eval::{Arguments, DictValue, EvalError, EvalResult, Interpreter, StructValue, Value};

use crate::{module, MAX_DEPTH};

pub fn json_module() -> Value {
    module("json", &[("marshal", marshal), ("unmarshal", unmarshal)])
}

fn marshal(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [v] = args.bind("json.marshal", ["v"])?;
    let json = to_json(&arg(v), 0).map_err(|e| prefixed("json.marshal", e))?;
    serde_json::to_string(&json)
        .map(Value::from)
        .map_err(|e| EvalError::new(format!("json.marshal: {e}")))
}

fn unmarshal(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [s] = args.bind("json.unmarshal", ["s"])?;
    let s = expect_str("json.unmarshal", "s", &arg(s))?;
    let json: serde_json::Value = serde_json::from_str(&s)
        .map_err(|e| EvalError::new(format!("json.unmarshal: {e}")))?;
    from_json(json)
}

fn prefixed(function: &str, err: String) -> EvalError {
    EvalError::new(format!("{function}: {err}"))
}

pub(crate) fn to_json(value: &Value, depth: usize) -> Result<serde_json::Value, String> {
    if depth > MAX_DEPTH {
        return Err("value is nested too deeply (or cyclic)".to_string());
    }
    Ok(match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number(Number::from(*n)),
        Value::Float(f) => serde_json::Value::Number(
            Number::from_f64(*f).ok_or_else(|| format!("cannot encode non-finite float {f}"))?,
        ),
        Value::Str(s) => serde_json::Value::String(s.to_string()),
        Value::List(list) => array(&list.snapshot(), depth)?,
        Value::Tuple(items) => array(items, depth)?,
        Value::Dict(dict) => {
            let mut object = Map::new();
            for (key, item) in dict.items() {
                let key = match &key {
                    Value::Str(s) => s.to_string(),
                    Value::Int(n) => n.to_string(),
                    other => {
                        return Err(format!("unsupported dict key type {}", other.type_name()))
                    }
                };
                // `13` and `"13"` render to the same key.
                if object.contains_key(&key) {
                    return Err(format!("duplicate key {key:?} in dict"));
                }
                object.insert(key, to_json(&item, depth + 1)?);
            }
            serde_json::Value::Object(object)
        }
        other => match other.downcast_native::<StructValue>() {
            Some(s) => {
                let mut object = Map::new();
                for (name, field) in s.fields() {
                    object.insert(name.clone(), to_json(field, depth + 1)?);
                }
                serde_json::Value::Object(object)
            }
            None => return Err(format!("cannot marshal {} value", other.type_name())),
        },
    })
}

fn array(items: &[Value], depth: usize) -> Result<serde_json::Value, String> {
    items
        .iter()
        .map(|item| to_json(item, depth + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(serde_json::Value::Array)
}

fn from_json(json: serde_json::Value) -> EvalResult {
    Ok(match json {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => Value::list(
            items
                .into_iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(object) => {
            let dict = DictValue::new();
            for (key, item) in object {
                dict.insert(Value::from(key), from_json(item)?)?;
            }
            Value::dict(dict)
        }
    })
}

#[cfg(test)]
mod tests;
