//! Script runner for the codec tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;
use std::sync::Arc;

use sky_eval::{silent_handler, EvalError, Interpreter, ModuleEnv, Namespace, NoLoad, Value};

use crate::{hash_module, json_module, url_module, yaml_module};

fn try_eval(expr: &str) -> Result<Value, EvalError> {
    let source = format!("x = {expr}\n");
    let module = sky_parse::parse(&source).expect("test source parses");
    let mut predeclared = Namespace::new();
    predeclared.set("json", json_module());
    predeclared.set("yaml", yaml_module());
    predeclared.set("url", url_module());
    predeclared.set("hash", hash_module());
    let env = ModuleEnv::new(Arc::from("codec.sky"), &source, module, Rc::new(predeclared));
    let mut interp = Interpreter::builder()
        .print_handler(silent_handler())
        .build();
    interp.exec_module(&env, &mut NoLoad)?;
    Ok(env.global("x").expect("x is bound"))
}

/// Evaluate one expression and return its repr.
pub(crate) fn eval(expr: &str) -> String {
    try_eval(expr)
        .unwrap_or_else(|e| panic!("evaluation failed: {e}"))
        .repr()
}

/// Evaluate one expression and return the string it produced.
pub(crate) fn eval_str(expr: &str) -> String {
    try_eval(expr)
        .unwrap_or_else(|e| panic!("evaluation failed: {e}"))
        .to_str()
}

/// Evaluate one expression and return the error message.
pub(crate) fn eval_err(expr: &str) -> String {
    match try_eval(expr) {
        Ok(v) => panic!("expected an error, got {}", v.repr()),
        Err(e) => e.message,
    }
}
