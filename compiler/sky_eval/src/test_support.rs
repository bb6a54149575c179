//! Helpers shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;
use std::sync::Arc;

use crate::{
    buffer_handler, EvalError, Interpreter, ModuleEnv, Namespace, NoLoad, SharedPrintHandler, Value,
};

pub(crate) struct Run {
    pub env: Rc<ModuleEnv>,
    pub output: SharedPrintHandler,
}

impl Run {
    pub fn global(&self, name: &str) -> Value {
        self.env
            .global(name)
            .unwrap_or_else(|| panic!("global {name} not bound"))
    }
}

pub(crate) fn try_run(source: &str) -> Result<Run, EvalError> {
    let module = sky_parse::parse(source).expect("test source parses");
    let env = ModuleEnv::new(Arc::from("test.sky"), source, module, Rc::new(Namespace::new()));
    let output = buffer_handler();
    let mut interp = Interpreter::builder()
        .print_handler(Arc::clone(&output))
        .build();
    interp.exec_module(&env, &mut NoLoad)?;
    Ok(Run { env, output })
}

pub(crate) fn run(source: &str) -> Run {
    try_run(source).unwrap_or_else(|e| panic!("execution failed: {e}"))
}

pub(crate) fn run_err(source: &str) -> EvalError {
    match try_run(source) {
        Ok(_) => panic!("expected execution to fail"),
        Err(e) => e,
    }
}

/// Evaluate one expression and return its repr.
pub(crate) fn eval(expr: &str) -> String {
    run(&format!("x = {expr}\n")).global("x").repr()
}

/// Evaluate one expression and return the error message.
pub(crate) fn eval_err(expr: &str) -> String {
    run_err(&format!("x = {expr}\n")).message
}
