use std::rc::Rc;
use std::sync::Arc;

use sky_eval::{DictValue, EvalError, Value};

use crate::descriptor::{Cardinality, FieldDescriptor, FieldType, MessageDescriptor, ScalarKind};
use crate::record::TypedRecord;
use crate::registry::TypeRegistry;

/// Build a record from a canonical JSON object. Unknown fields are errors;
/// `null` leaves a field unset.
pub fn from_json_value(
    descriptor: Arc<MessageDescriptor>,
    registry: Arc<dyn TypeRegistry>,
    json: &serde_json::Value,
) -> Result<TypedRecord, EvalError> {
    let serde_json::Value::Object(object) = json else {
        return Err(EvalError::new(format!(
            "{}: want a JSON object, got {}",
            descriptor.full_name(),
            kind_of(json)
        )));
    };
    let record = TypedRecord::new(Arc::clone(&descriptor), Arc::clone(&registry));
    for (name, value) in object {
        let Some((_, field)) = descriptor.field(name) else {
            return Err(EvalError::new(format!(
                "{} has no field {name:?}",
                descriptor.full_name()
            )));
        };
        if value.is_null() {
            continue;
        }
        let value = field_value(&registry, descriptor.full_name(), field, value)?;
        record.set(name, value)?;
    }
    Ok(record)
}

fn field_value(
    registry: &Arc<dyn TypeRegistry>,
    message: &str,
    field: &FieldDescriptor,
    json: &serde_json::Value,
) -> Result<Value, EvalError> {
    let context = format!("{message}.{}", field.name);
    match &field.cardinality {
        Cardinality::Singular => element(registry, &context, &field.ty, json),
        Cardinality::Repeated => {
            let serde_json::Value::Array(items) = json else {
                return Err(mismatch(&context, "array", json));
            };
            let items = items
                .iter()
                .map(|item| element(registry, &context, &field.ty, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(items))
        }
        Cardinality::Map { key } => {
            let serde_json::Value::Object(entries) = json else {
                return Err(mismatch(&context, "object", json));
            };
            let dict = DictValue::new();
            for (k, v) in entries {
                dict.insert(
                    map_key(&context, *key, k)?,
                    element(registry, &context, &field.ty, v)?,
                )?;
            }
            Ok(Value::dict(dict))
        }
    }
}

fn element(
    registry: &Arc<dyn TypeRegistry>,
    context: &str,
    ty: &FieldType,
    json: &serde_json::Value,
) -> Result<Value, EvalError> {
    use serde_json::Value as Json;
    match (ty, json) {
        (FieldType::Scalar(ScalarKind::Bool), Json::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldType::Scalar(ScalarKind::String), Json::String(s)) => Ok(Value::str(s)),
        (FieldType::Scalar(kind), Json::Number(n)) if kind.is_float() => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| mismatch(context, kind.name(), json)),
        (FieldType::Scalar(kind), Json::String(s)) if kind.is_float() => match s.as_str() {
            "NaN" => Ok(Value::Float(f64::NAN)),
            "Infinity" => Ok(Value::Float(f64::INFINITY)),
            "-Infinity" => Ok(Value::Float(f64::NEG_INFINITY)),
            _ => Err(mismatch(context, kind.name(), json)),
        },
        (FieldType::Scalar(kind), Json::Number(n)) if kind.int_range().is_some() => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch(context, kind.name(), json)),
        (FieldType::Scalar(kind), Json::String(s)) if kind.int_range().is_some() => s
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| mismatch(context, kind.name(), json)),
        (FieldType::Enum(_), Json::String(s)) => Ok(Value::str(s)),
        (FieldType::Enum(_), Json::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch(context, "enum", json)),
        (FieldType::Message(name), Json::Object(_)) => {
            let descriptor = registry
                .lookup_message(name)
                .map_err(|e| EvalError::new(format!("{context}: {e}")))?;
            let record = from_json_value(descriptor, Arc::clone(registry), json)?;
            Ok(Value::Native(Rc::new(record)))
        }
        (ty, json) => Err(mismatch(context, &ty.to_string(), json)),
    }
}

/// Map keys are JSON strings; parse them back to the key kind.
fn map_key(context: &str, kind: ScalarKind, key: &str) -> Result<Value, EvalError> {
    let bad_key = || EvalError::new(format!("{context}: invalid {kind} map key {key:?}"));
    match kind {
        ScalarKind::String => Ok(Value::str(key)),
        ScalarKind::Bool => match key {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(bad_key()),
        },
        _ => key.parse::<i64>().map(Value::Int).map_err(|_| bad_key()),
    }
}

#[cold]
fn mismatch(context: &str, want: &str, got: &serde_json::Value) -> EvalError {
    EvalError::new(format!("{context}: got JSON {}, want {want}", kind_of(got)))
}

fn kind_of(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
