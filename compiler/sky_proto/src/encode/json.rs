use serde_json::{Map, Number};
use sky_eval::Value;

use crate::descriptor::{Cardinality, FieldType, ScalarKind};
use crate::record::TypedRecord;

/// Canonical JSON object for a record.
pub fn to_json_value(record: &TypedRecord) -> serde_json::Value {
    let mut object = Map::new();
    for (field, value) in record.set_fields() {
        let encoded = match (&field.cardinality, &value) {
            (Cardinality::Singular, v) => element(&field.ty, v),
            (Cardinality::Repeated, Value::List(list)) => serde_json::Value::Array(
                list.snapshot().iter().map(|v| element(&field.ty, v)).collect(),
            ),
            (Cardinality::Map { .. }, Value::Dict(dict)) => serde_json::Value::Object(
                dict.items()
                    .iter()
                    .map(|(k, v)| (map_key(k), element(&field.ty, v)))
                    .collect(),
            ),
            _ => serde_json::Value::Null,
        };
        object.insert(field.name.clone(), encoded);
    }
    serde_json::Value::Object(object)
}

fn element(ty: &FieldType, value: &Value) -> serde_json::Value {
    match (ty, value) {
        (FieldType::Scalar(kind), Value::Int(n)) if kind.is_64_bit_int() => {
            serde_json::Value::String(n.to_string())
        }
        (FieldType::Scalar(_), Value::Int(n)) => serde_json::Value::Number(Number::from(*n)),
        (FieldType::Scalar(_), Value::Float(f)) => float(*f),
        (FieldType::Scalar(ScalarKind::Bool), Value::Bool(b)) => serde_json::Value::Bool(*b),
        (FieldType::Scalar(_) | FieldType::Enum(_), Value::Str(s)) => {
            serde_json::Value::String(s.to_string())
        }
        (FieldType::Message(_), value) => value
            .downcast_native::<TypedRecord>()
            .map_or(serde_json::Value::Null, to_json_value),
        _ => serde_json::Value::Null,
    }
}

/// Non-finite floats use the protobuf JSON spellings.
fn float(f: f64) -> serde_json::Value {
    match Number::from_f64(f) {
        Some(n) => serde_json::Value::Number(n),
        None if f.is_nan() => serde_json::Value::String("NaN".to_string()),
        None if f > 0.0 => serde_json::Value::String("Infinity".to_string()),
        None => serde_json::Value::String("-Infinity".to_string()),
    }
}

pub(crate) fn map_key(key: &Value) -> String {
    match key {
        Value::Str(s) => s.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.repr(),
    }
}
