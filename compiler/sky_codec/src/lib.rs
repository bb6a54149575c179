//! Sky Codec - text codecs exposed to scripts as capability namespaces.
//!
//! - `json`: `marshal` (compact, dict keys in insertion order) and
//!   `unmarshal`
//! - `yaml`: `marshal` (mapping keys sorted: numbers, booleans, strings)
//!   and `unmarshal`
//! - `url`: `encode_query`
//! - `hash`: `sha256`
//!
//! Each constructor returns a frozen module value ready to be bound as a
//! global.

mod hash;
mod json;
mod query;
mod yaml;

use sky_eval::{Arguments, EvalResult, Interpreter, ModuleValue, Namespace, Value};

pub use hash::hash_module;
pub use json::json_module;
pub use query::url_module;
pub use yaml::yaml_module;

type BuiltinFn = fn(&mut Interpreter, Arguments) -> EvalResult;

/// Nesting limit for marshalling; cyclic containers hit it.
const MAX_DEPTH: usize = 256;

fn module(name: &str, members: &[(&str, BuiltinFn)]) -> Value {
    let mut namespace = Namespace::new();
    for &(member, func) in members {
        namespace.set(member, Value::builtin(&format!("{name}.{member}"), func));
    }
    namespace.freeze();
    Value::native(ModuleValue::new(name, namespace))
}

#[cfg(test)]
mod test_support;
