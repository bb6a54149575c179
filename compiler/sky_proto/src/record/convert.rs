//! Admission of script values into typed fields.

use std::rc::Rc;
use std::sync::Arc;

use sky_eval::{EvalError, Value, ValueGuard};

use super::TypedRecord;
use crate::descriptor::{FieldType, ScalarKind};
use crate::registry::TypeRegistry;

/// Element check for one field: a singular value, one repeated element,
/// or one map key or value.
pub(crate) struct FieldGuard {
    /// `Message.field`, used to prefix errors.
    context: Arc<str>,
    ty: FieldType,
    registry: Arc<dyn TypeRegistry>,
}

impl FieldGuard {
    pub(crate) fn new(context: Arc<str>, ty: FieldType, registry: Arc<dyn TypeRegistry>) -> Self {
        FieldGuard {
            context,
            ty,
            registry,
        }
    }
}

impl ValueGuard for FieldGuard {
    fn admit(&self, value: Value) -> Result<Value, EvalError> {
        convert(&self.context, &self.ty, &self.registry, value)
    }

    fn describe(&self) -> String {
        self.ty.to_string()
    }
}

#[cold]
fn wrong_type(context: &str, got: &Value, want: &dyn std::fmt::Display) -> EvalError {
    EvalError::new(format!("{context}: got {}, want {want}", got.type_name()))
}

/// Convert `value` to the canonical stored form for `ty`.
///
/// Ints are range checked, floats accept ints, enums are stored by value
/// name, and message fields accept a record of the same type or a dict of
/// field values. A mutable record is stored as is; a frozen one is stored
/// as a mutable deep copy so the owning record stays fully mutable.
pub(crate) fn convert(
    context: &str,
    ty: &FieldType,
    registry: &Arc<dyn TypeRegistry>,
    value: Value,
) -> Result<Value, EvalError> {
    match ty {
        FieldType::Scalar(kind) => convert_scalar(context, *kind, value),
        FieldType::Enum(name) => {
            let descriptor = registry
                .lookup_enum(name)
                .map_err(|e| EvalError::new(format!("{context}: {e}")))?;
            let found = match &value {
                Value::Str(s) => descriptor.by_name(s),
                Value::Int(n) => descriptor.by_number(*n),
                _ => return Err(wrong_type(context, &value, name)),
            };
            match found {
                Some(v) => Ok(Value::str(&v.name)),
                None => Err(EvalError::new(format!(
                    "{context}: {} is not a value of {name}",
                    value.repr()
                ))),
            }
        }
        FieldType::Message(name) => {
            if let Some(record) = value.downcast_native::<TypedRecord>() {
                if record.full_name() == &**name {
                    if record.is_frozen() {
                        return Ok(Value::Native(Rc::new(record.deep_clone()?)));
                    }
                    return Ok(value);
                }
                return Err(EvalError::new(format!(
                    "{context}: got {}, want {name}",
                    record.full_name()
                )));
            }
            match &value {
                Value::Dict(dict) => {
                    let descriptor = registry
                        .lookup_message(name)
                        .map_err(|e| EvalError::new(format!("{context}: {e}")))?;
                    let record = TypedRecord::new(descriptor, Arc::clone(registry));
                    for (key, field_value) in dict.items() {
                        let Value::Str(field) = &key else {
                            return Err(EvalError::new(format!(
                                "{context}: field names must be strings, got {}",
                                key.type_name()
                            )));
                        };
                        record.set(field, field_value)?;
                    }
                    Ok(Value::Native(Rc::new(record)))
                }
                _ => Err(wrong_type(context, &value, name)),
            }
        }
    }
}

fn convert_scalar(context: &str, kind: ScalarKind, value: Value) -> Result<Value, EvalError> {
    if let Some((min, max)) = kind.int_range() {
        let Value::Int(n) = value else {
            return Err(wrong_type(context, &value, &kind));
        };
        if n < min || n > max {
            return Err(EvalError::new(format!(
                "{context}: value {n} out of range for {kind}"
            )));
        }
        return Ok(value);
    }
    match (kind, &value) {
        (ScalarKind::Double | ScalarKind::Float, Value::Float(_))
        | (ScalarKind::Bool, Value::Bool(_))
        | (ScalarKind::String, Value::Str(_)) => Ok(value),
        #[allow(clippy::cast_precision_loss)]
        (ScalarKind::Double | ScalarKind::Float, Value::Int(n)) => Ok(Value::Float(*n as f64)),
        _ => Err(wrong_type(context, &value, &kind)),
    }
}
