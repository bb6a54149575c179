//! Record encoders and decoders.
//!
//! JSON is the canonical form: declared field names, unset fields omitted,
//! 64-bit integers as strings, enums by name. YAML is the canonical JSON
//! re-encoded, so field order carries over.

mod decode;
pub(crate) mod json;
pub(crate) mod text;

use std::sync::Arc;

use serde::Serialize;
use sky_eval::EvalError;

pub use decode::from_json_value;
pub use json::to_json_value;

use crate::descriptor::MessageDescriptor;
use crate::record::TypedRecord;
use crate::registry::TypeRegistry;

/// Compact JSON, or tab-indented when `compact` is false.
pub fn to_json(record: &TypedRecord, compact: bool) -> Result<String, EvalError> {
    let value = to_json_value(record);
    if compact {
        return serde_json::to_string(&value).map_err(|e| EvalError::new(e.to_string()));
    }
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| EvalError::new(e.to_string()))?;
    String::from_utf8(out).map_err(|e| EvalError::new(e.to_string()))
}

/// Text format: `a:1 b:{c:"x"}` when compact, one field per line otherwise.
pub fn to_text(record: &TypedRecord, compact: bool) -> String {
    text::encode(record, compact)
}

pub fn to_yaml(record: &TypedRecord) -> Result<String, EvalError> {
    serde_yaml::to_string(&to_json_value(record)).map_err(|e| EvalError::new(e.to_string()))
}

/// Parse canonical JSON into a new mutable record.
pub fn from_json(
    descriptor: Arc<MessageDescriptor>,
    registry: Arc<dyn TypeRegistry>,
    text: &str,
) -> Result<TypedRecord, EvalError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EvalError::new(format!("invalid JSON: {e}")))?;
    from_json_value(descriptor, registry, &value)
}

/// Parse YAML shaped like canonical JSON into a new mutable record.
pub fn from_yaml(
    descriptor: Arc<MessageDescriptor>,
    registry: Arc<dyn TypeRegistry>,
    text: &str,
) -> Result<TypedRecord, EvalError> {
    let value: serde_json::Value =
        serde_yaml::from_str(text).map_err(|e| EvalError::new(format!("invalid YAML: {e}")))?;
    from_json_value(descriptor, registry, &value)
}
