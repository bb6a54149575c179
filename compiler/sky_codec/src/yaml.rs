use std::cmp::Ordering;

use serde_yaml::{Mapping, Number};
use sky_eval::args::{arg, expect_str};
use sky_eval::{Arguments, DictValue, EvalError, EvalResult, Interpreter, StructValue, Value};

use crate::{module, MAX_DEPTH};

pub fn yaml_module() -> Value {
    module("yaml", &[("marshal", marshal), ("unmarshal", unmarshal)])
}

fn marshal(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [v] = args.bind("yaml.marshal", ["v"])?;
    let yaml = to_yaml(&arg(v), 0).map_err(|e| EvalError::new(format!("yaml.marshal: {e}")))?;
    serde_yaml::to_string(&yaml)
        .map(Value::from)
        .map_err(|e| EvalError::new(format!("yaml.marshal: {e}")))
}

fn unmarshal(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [s] = args.bind("yaml.unmarshal", ["s"])?;
    let s = expect_str("yaml.unmarshal", "s", &arg(s))?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&s)
        .map_err(|e| EvalError::new(format!("yaml.unmarshal: {e}")))?;
    from_yaml(yaml).map_err(|e| EvalError::new(format!("yaml.unmarshal: {}", e.message)))
}

/// Key order for plain mappings: numbers, then booleans, then strings.
fn key_rank(key: &Value) -> Option<u8> {
    match key {
        Value::Int(_) | Value::Float(_) => Some(0),
        Value::Bool(_) => Some(1),
        Value::Str(_) => Some(2),
        _ => None,
    }
}

fn compare_keys(a: &Value, b: &Value) -> Ordering {
    key_rank(a)
        .cmp(&key_rank(b))
        .then_with(|| a.compare(b).unwrap_or(Ordering::Equal))
}

fn to_yaml(value: &Value, depth: usize) -> Result<serde_yaml::Value, String> {
    if depth > MAX_DEPTH {
        return Err("value is nested too deeply (or cyclic)".to_string());
    }
    Ok(match value {
        Value::None => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number(Number::from(*n)),
        Value::Float(f) => serde_yaml::Value::Number(Number::from(*f)),
        Value::Str(s) => serde_yaml::Value::String(s.to_string()),
        Value::List(list) => sequence(&list.snapshot(), depth)?,
        Value::Tuple(items) => sequence(items, depth)?,
        Value::Dict(dict) => {
            let mut pairs = dict.items();
            if let Some((key, _)) = pairs.iter().find(|(k, _)| key_rank(k).is_none()) {
                return Err(format!("unsupported mapping key type {}", key.type_name()));
            }
            pairs.sort_by(|(a, _), (b, _)| compare_keys(a, b));
            let mut mapping = Mapping::new();
            for (key, item) in pairs {
                mapping.insert(to_yaml(&key, depth + 1)?, to_yaml(&item, depth + 1)?);
            }
            serde_yaml::Value::Mapping(mapping)
        }
        other => match other.downcast_native::<StructValue>() {
            Some(s) => {
                let mut mapping = Mapping::new();
                for (name, field) in s.fields() {
                    mapping.insert(
                        serde_yaml::Value::String(name.clone()),
                        to_yaml(field, depth + 1)?,
                    );
                }
                serde_yaml::Value::Mapping(mapping)
            }
            None => return Err(format!("cannot marshal {} value", other.type_name())),
        },
    })
}

fn sequence(items: &[Value], depth: usize) -> Result<serde_yaml::Value, String> {
    items
        .iter()
        .map(|item| to_yaml(item, depth + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(serde_yaml::Value::Sequence)
}

fn from_yaml(yaml: serde_yaml::Value) -> EvalResult {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::None,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::from(s),
        serde_yaml::Value::Sequence(items) => Value::list(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let dict = DictValue::new();
            for (key, item) in mapping {
                dict.insert(from_yaml(key)?, from_yaml(item)?)?;
            }
            Value::dict(dict)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}
