use std::any::Any;

use crate::errors::{argument_mismatch, EvalError};
use crate::value::{NativeObject, Value};
use crate::Arguments;

/// Immutable record built by `struct(name = value, ...)`.
///
/// Fields are kept sorted by name.
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new(mut fields: Vec<(String, Value)>) -> Self {
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        StructValue { fields }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()
            .map(|i| &self.fields[i].1)
    }
}

impl NativeObject for StructValue {
    fn type_name(&self) -> String {
        "struct".to_string()
    }

    fn repr(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| format!("{name} = {}", value.repr()))
            .collect();
        format!("struct({})", fields.join(", "))
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(self.field(name).cloned())
    }

    fn attr_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    fn set_attr(&self, name: &str, _value: Value) -> Result<(), EvalError> {
        Err(EvalError::new(format!("cannot set .{name} field of struct")))
    }

    fn freeze(&self) {
        for (_, value) in &self.fields {
            value.freeze();
        }
    }

    fn equals(&self, other: &dyn NativeObject) -> Result<bool, EvalError> {
        let Some(other) = other.as_any().downcast_ref::<StructValue>() else {
            return Ok(false);
        };
        if self.fields.len() != other.fields.len() {
            return Ok(false);
        }
        for ((a_name, a), (b_name, b)) in self.fields.iter().zip(&other.fields) {
            if a_name != b_name || !a.equals(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `struct(**kwargs)`.
pub fn struct_builtin() -> Value {
    Value::builtin("struct", |_, args| {
        let Arguments { positional, named } = args;
        if !positional.is_empty() {
            return Err(argument_mismatch(
                "struct",
                "unexpected positional arguments",
            ));
        }
        let fields = named
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Ok(Value::native(StructValue::new(fields)))
    })
}
