use std::any::Any;

use super::Value;
use crate::errors::{not_callable, EvalError};
use crate::{Arguments, EvalResult, Interpreter};

/// A host object exposed to scripts.
///
/// Typed records, `struct` values, capability namespaces, and package
/// handles all implement this trait. Attribute reads return `Ok(None)` for
/// unknown names; the interpreter turns that into a "no such field" error.
pub trait NativeObject: Any {
    fn type_name(&self) -> String;

    fn repr(&self) -> String;

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError>;

    /// Names listed by `dir(x)`.
    fn attr_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn set_attr(&self, name: &str, _value: Value) -> Result<(), EvalError> {
        Err(EvalError::new(format!(
            "{} value does not support field assignment (.{name})",
            self.type_name()
        )))
    }

    fn freeze(&self) {}

    /// Objects without mutable state report frozen.
    fn is_frozen(&self) -> bool {
        true
    }

    fn truthy(&self) -> bool {
        true
    }

    /// Structural equality with another native; identity is checked first
    /// by the caller.
    fn equals(&self, _other: &dyn NativeObject) -> Result<bool, EvalError> {
        Ok(false)
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, _interp: &mut Interpreter, _args: Arguments) -> EvalResult {
        Err(not_callable(&self.type_name()))
    }

    fn as_any(&self) -> &dyn Any;
}
