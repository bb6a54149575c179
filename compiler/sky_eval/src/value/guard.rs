use super::Value;
use crate::errors::EvalError;

/// Admission check for elements stored in a guarded list or dict.
///
/// Implementations may convert the value (e.g. a dict literal into a typed
/// record) and return the converted value to store.
pub trait ValueGuard {
    fn admit(&self, value: Value) -> Result<Value, EvalError>;

    /// Name of the admitted kind, used in error messages.
    fn describe(&self) -> String;
}
