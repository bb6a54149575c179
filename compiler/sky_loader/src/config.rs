//! The result of a completed load and the entry-point protocol.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use sky_eval::{Arguments, EvalError, Interpreter, Namespace, SharedPrintHandler, Value};
use sky_proto::TypedRecord;
use tracing::debug;

use crate::context::ContextValue;
use crate::error::{render_eval, EntryPointError};
use crate::resolver::ModulePath;
use crate::testing::{TestResult, TestSummary};

/// Name of the entry point looked up by [`Config::main`].
pub const MAIN: &str = "main";

/// Prefix of functions listed by [`Config::tests`].
pub const TEST_PREFIX: &str = "test_";

/// A loaded configuration: the entry module's bindings plus everything
/// needed to call into them.
pub struct Config {
    entry: ModulePath,
    globals: Rc<Namespace>,
    locals: Rc<Namespace>,
    modules: Vec<ModulePath>,
    vars: Vec<(String, Value)>,
    print: SharedPrintHandler,
}

impl Config {
    pub(crate) fn new(
        entry: ModulePath,
        globals: Rc<Namespace>,
        locals: Rc<Namespace>,
        modules: Vec<ModulePath>,
        vars: Vec<(String, Value)>,
        print: SharedPrintHandler,
    ) -> Self {
        Config {
            entry,
            globals,
            locals,
            modules,
            vars,
            print,
        }
    }

    pub fn entry(&self) -> &ModulePath {
        &self.entry
    }

    pub fn globals(&self) -> &Namespace {
        &self.globals
    }

    /// Frozen top-level bindings of the entry module.
    pub fn locals(&self) -> &Namespace {
        &self.locals
    }

    /// Every module executed by the load, in the order execution began.
    pub fn modules(&self) -> &[ModulePath] {
        &self.modules
    }

    pub fn vars(&self) -> &[(String, Value)] {
        &self.vars
    }

    /// Call `main(ctx)` and collect the returned records.
    pub fn main(&self) -> Result<Vec<TypedRecord>, EntryPointError> {
        self.call_entry_point(MAIN)
    }

    /// Call the entry module's `name(ctx)`; it must return `None` or a
    /// list or tuple of records. The records are detached copies.
    #[tracing::instrument(level = "debug", skip(self), fields(entry = %self.entry))]
    pub fn call_entry_point(&self, name: &str) -> Result<Vec<TypedRecord>, EntryPointError> {
        let callee = self.lookup_callable(name)?;
        let ctx = ContextValue::new(&self.vars).map_err(EntryPointError::Exec)?;
        let result = self
            .call(&callee, ctx)
            .map_err(EntryPointError::Exec)?;
        let items = match &result {
            Value::None => return Ok(Vec::new()),
            Value::List(list) => list.snapshot(),
            Value::Tuple(items) => items.to_vec(),
            other => {
                return Err(EntryPointError::BadReturn {
                    name: name.to_string(),
                    index: None,
                    got: other.type_name(),
                })
            }
        };
        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let record = item.downcast_native::<TypedRecord>().ok_or_else(|| {
                    EntryPointError::BadReturn {
                        name: name.to_string(),
                        index: Some(i),
                        got: item.type_name(),
                    }
                })?;
                record.deep_clone().map_err(EntryPointError::Exec)
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(records = records.len(), "entry point returned");
        Ok(records)
    }

    /// Names of top-level `test_*` functions, in definition order.
    pub fn tests(&self) -> Vec<String> {
        self.locals
            .iter()
            .filter(|(name, value)| {
                name.starts_with(TEST_PREFIX) && matches!(value, Value::Function(_))
            })
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Run one test with a context exposing `vars` and `assert`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run_test(&self, name: &str) -> TestResult {
        let start = Instant::now();
        let outcome = self
            .lookup_callable(name)
            .map_err(|e| e.to_string())
            .and_then(|callee| {
                let ctx = ContextValue::new(&self.vars)
                    .map_err(|e| e.to_string())?
                    .with_assertions();
                self.call(&callee, ctx).map_err(|e| render_eval(&e))
            });
        match outcome {
            Ok(_) => TestResult::passed(name, start.elapsed()),
            Err(message) => TestResult::failed(name, message, start.elapsed()),
        }
    }

    pub fn run_tests(&self) -> TestSummary {
        let mut summary = TestSummary::new();
        for name in self.tests() {
            summary.add_result(self.run_test(&name));
        }
        summary
    }

    fn lookup_callable(&self, name: &str) -> Result<Value, EntryPointError> {
        let value = self
            .locals
            .get(name)
            .ok_or_else(|| EntryPointError::Missing {
                path: self.entry.clone(),
                name: name.to_string(),
            })?;
        if !value.is_callable() {
            return Err(EntryPointError::NotCallable {
                path: self.entry.clone(),
                name: name.to_string(),
                got: value.type_name(),
            });
        }
        Ok(value.clone())
    }

    /// Each call gets a fresh interpreter; load-time state is untouched.
    fn call(&self, callee: &Value, ctx: ContextValue) -> Result<Value, EvalError> {
        let mut interp = Interpreter::builder()
            .print_handler(Arc::clone(&self.print))
            .build();
        interp.call_value(callee, Arguments::positional(vec![Value::native(ctx)]), None)
    }
}
