//! Sky Eval - tree-walking interpreter for the skyfold script dialect.
//!
//! The crate provides:
//!
//! - [`Value`]: the runtime value model (scalars, lists, dicts, functions,
//!   and host objects through [`NativeObject`])
//! - [`Interpreter`]: executes parsed modules and calls values
//! - [`Arguments`]: the builtin calling convention
//! - the universe builtins, `fail`, and `struct`
//! - [`EvalError`]: positioned errors with tracebacks
//!
//! Module resolution is not handled here. A host supplies a [`LoadHook`]
//! that turns `load("path", ...)` into the frozen bindings of another
//! module.

pub mod args;
mod builtins;
mod diagnostics;
mod environment;
pub mod errors;
mod exec;
mod format;
mod interpreter;
mod methods;
mod operators;
mod print_handler;
#[cfg(test)]
mod test_support;
mod unary_operators;
pub mod value;

pub use args::Arguments;
pub use builtins::{fail_builtin, struct_builtin, universe, StructValue};
pub use diagnostics::{CallFrame, CallStack, DEFAULT_MAX_DEPTH, TOPLEVEL};
pub use environment::{ModuleEnv, Scope};
pub use errors::{EvalError, EvalErrorKind, EvalResult, Position};
pub use interpreter::{Interpreter, InterpreterBuilder, LoadHook, NoLoad};
pub use methods::get_attr;
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, silent_handler, stderr_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use value::{
    DictValue, ListValue, ModuleValue, Namespace, NativeObject, Value, ValueGuard,
};
