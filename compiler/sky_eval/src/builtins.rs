//! The universe: builtins visible in every module without import.
//!
//! `fail` and `struct` also live here; the loader exposes them again as
//! capability globals so hosts can override them per load.

mod conversions;
mod fail;
mod introspection;
mod sequences;
mod structs;

pub use fail::fail_builtin;
pub use structs::{struct_builtin, StructValue};

use crate::value::{Namespace, Value};
use crate::{Arguments, EvalResult, Interpreter};

type BuiltinFn = fn(&mut Interpreter, Arguments) -> EvalResult;

const UNIVERSE: &[(&str, BuiltinFn)] = &[
    ("all", sequences::all),
    ("any", sequences::any),
    ("bool", conversions::bool_),
    ("dict", conversions::dict),
    ("dir", introspection::dir),
    ("enumerate", sequences::enumerate),
    ("float", conversions::float),
    ("getattr", introspection::getattr),
    ("hasattr", introspection::hasattr),
    ("int", conversions::int),
    ("len", sequences::len),
    ("list", conversions::list),
    ("max", sequences::max),
    ("min", sequences::min),
    ("print", introspection::print),
    ("range", sequences::range),
    ("repr", conversions::repr),
    ("reversed", sequences::reversed),
    ("sorted", sequences::sorted),
    ("str", conversions::str_),
    ("tuple", conversions::tuple),
    ("type", conversions::type_),
    ("zip", sequences::zip),
];

/// Build the universe namespace.
pub fn universe() -> Namespace {
    let mut ns = Namespace::new();
    ns.set("None", Value::None);
    ns.set("True", Value::Bool(true));
    ns.set("False", Value::Bool(false));
    for &(name, func) in UNIVERSE {
        ns.set(name, Value::builtin(name, func));
    }
    ns.set("fail", fail_builtin());
    ns.set("struct", struct_builtin());
    ns
}
