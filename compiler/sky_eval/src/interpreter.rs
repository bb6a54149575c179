//! Tree-walking interpreter.
//!
//! One `Interpreter` executes one module body (and every call made from
//! it). The statement and expression walkers live in `crate::exec`:
//!
//! - `exec::control` - statements, assignment targets, loops
//! - `exec::expr` - expressions, comprehensions, indexing
//! - `exec::call` - argument evaluation and parameter binding
//!
//! Loading is delegated to a [`LoadHook`] so that module resolution and
//! caching stay outside the evaluator.

mod builder;

pub use builder::InterpreterBuilder;

use std::rc::Rc;
use std::sync::Arc;

use sky_ir::StmtKind;
use sky_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::diagnostics::{CallFrame, CallStack};
use crate::environment::ModuleEnv;
use crate::errors::{load_failed, not_callable, EvalError, Position};
use crate::exec::Ctx;
use crate::print_handler::SharedPrintHandler;
use crate::value::{Namespace, Value};
use crate::{Arguments, EvalResult};

/// Source of modules named by `load` statements.
pub trait LoadHook {
    /// Load `module` on behalf of the module at `from` and return its
    /// (frozen) top-level bindings.
    fn load(&mut self, module: &str, from: &Arc<str>) -> Result<Rc<Namespace>, EvalError>;
}

/// Hook for standalone evaluation: every `load` fails.
pub struct NoLoad;

impl LoadHook for NoLoad {
    fn load(&mut self, module: &str, _from: &Arc<str>) -> Result<Rc<Namespace>, EvalError> {
        Err(load_failed(module, "loading is not supported here"))
    }
}

pub struct Interpreter {
    pub(crate) print: SharedPrintHandler,
    pub(crate) call_stack: CallStack,
    pub(crate) universe: Rc<Namespace>,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// Position of the innermost active call, if any.
    pub fn current_call_site(&self) -> Option<&Position> {
        self.call_stack.top().and_then(|f| f.call_site.as_ref())
    }

    /// Execute a module body top to bottom.
    ///
    /// `load` statements are resolved through `hook` as they are reached.
    /// Top-level bindings are left in `env` for the caller to export.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %env.path()))]
    pub fn exec_module(
        &mut self,
        env: &Rc<ModuleEnv>,
        hook: &mut dyn LoadHook,
    ) -> Result<(), EvalError> {
        let ctx = Ctx::toplevel(env);
        let module = env.module();
        for &id in &module.body {
            let stmt = module.stmt(id);
            if let StmtKind::Load { module: name, symbols } = &stmt.kind {
                let position = env.position(stmt.span);
                let exports = hook.load(name, env.path()).map_err(|e| e.at(position))?;
                for symbol in symbols {
                    let value = import_symbol(&exports, name, &symbol.remote)
                        .map_err(|e| e.at(env.position(symbol.span)))?;
                    env.set_global(&symbol.local, value);
                }
                continue;
            }
            self.exec_block(&ctx, &[id])?;
        }
        Ok(())
    }

    /// Call any callable value.
    ///
    /// Every call pushes a frame; an error leaving the call carries the
    /// traceback captured at the innermost frame.
    pub fn call_value(
        &mut self,
        callee: &Value,
        args: Arguments,
        call_site: Option<Position>,
    ) -> EvalResult {
        let name: Rc<str> = match callee {
            Value::Function(f) => Rc::clone(&f.name),
            Value::Builtin(b) => Rc::clone(b.name()),
            Value::Native(n) if n.is_callable() => Rc::from(n.type_name()),
            other => return Err(not_callable(&other.type_name())),
        };
        trace!(function = %name, depth = self.call_stack.depth(), "call");
        self.call_stack.push(CallFrame { name, call_site })?;
        let result = ensure_sufficient_stack(|| match callee {
            Value::Function(f) => self.call_function(f, args),
            Value::Builtin(b) => b.call(self, args),
            Value::Native(n) => n.call(self, args),
            other => Err(not_callable(&other.type_name())),
        });
        let result = result.map_err(|e| self.call_stack.attach_backtrace(e));
        self.call_stack.pop();
        result
    }
}

fn import_symbol(exports: &Namespace, module: &str, name: &str) -> EvalResult {
    if name.starts_with('_') {
        return Err(load_failed(module, format!("name {name} is private")));
    }
    exports
        .get(name)
        .cloned()
        .ok_or_else(|| load_failed(module, format!("name {name} not found in module")))
}
