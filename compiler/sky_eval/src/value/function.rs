use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use sky_ir::{ExprId, ParamKind, StmtId};

use super::Value;
use crate::environment::{ModuleEnv, Scope};
use crate::{Arguments, EvalResult, Interpreter};

/// A parameter of a script function, with its default evaluated at `def`
/// time.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: Rc<str>,
    pub default: Option<Value>,
    pub kind: ParamKind,
}

#[derive(Clone, Debug)]
pub enum FunctionBody {
    /// Statements of a `def`.
    Block(Rc<[StmtId]>),
    /// Expression of a `lambda`.
    Expr(ExprId),
}

/// A function defined in script source (`def` or `lambda`).
pub struct FunctionValue {
    pub name: Rc<str>,
    pub params: Vec<ParamSpec>,
    pub body: FunctionBody,
    /// Module the function was defined in; its globals stay visible.
    pub env: Rc<ModuleEnv>,
    /// Enclosing function scope for nested functions and lambdas.
    pub closure: Option<Rc<Scope>>,
    frozen: Cell<bool>,
}

impl FunctionValue {
    pub fn new(
        name: Rc<str>,
        params: Vec<ParamSpec>,
        body: FunctionBody,
        env: Rc<ModuleEnv>,
        closure: Option<Rc<Scope>>,
    ) -> Self {
        FunctionValue {
            name,
            params,
            body,
            env,
            closure,
            frozen: Cell::new(false),
        }
    }

    /// Freeze default values and captured variables.
    pub fn freeze(&self) {
        if self.frozen.replace(true) {
            return;
        }
        for param in &self.params {
            if let Some(default) = &param.default {
                default.freeze();
            }
        }
        if let Some(scope) = &self.closure {
            scope.freeze();
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

type BuiltinFn = dyn Fn(&mut Interpreter, Arguments) -> EvalResult;

/// A host function callable from scripts.
///
/// Bound methods (`"a,b".split(",")`) are builtins whose closure captures
/// the receiver.
pub struct BuiltinFunction {
    name: Rc<str>,
    func: Box<BuiltinFn>,
}

impl BuiltinFunction {
    pub fn new(
        name: &str,
        func: impl Fn(&mut Interpreter, Arguments) -> EvalResult + 'static,
    ) -> Self {
        BuiltinFunction {
            name: Rc::from(name),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    pub fn call(&self, interp: &mut Interpreter, args: Arguments) -> EvalResult {
        (self.func)(interp, args)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<built-in function {}>", self.name)
    }
}
