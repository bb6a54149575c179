//! Statement and expression walkers.

mod call;
mod control;
mod expr;

pub(crate) use control::normalize_index;

use std::rc::Rc;

use sky_ir::{ExprId, Module};

use crate::environment::{ModuleEnv, Scope};
use crate::errors::Position;
use crate::value::Value;

/// How a statement block finished.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Where code is executing: which module, and which local scope (none at
/// module top level).
pub(crate) struct Ctx {
    pub env: Rc<ModuleEnv>,
    pub scope: Option<Rc<Scope>>,
}

impl Ctx {
    pub fn toplevel(env: &Rc<ModuleEnv>) -> Self {
        Ctx {
            env: Rc::clone(env),
            scope: None,
        }
    }

    pub fn module(&self) -> &Module {
        self.env.module()
    }

    pub fn position_of(&self, id: ExprId) -> Position {
        self.env.position(self.module().expr(id).span)
    }

    /// Bind in the innermost scope, or as a module global at top level.
    pub fn bind(&self, name: &str, value: Value) {
        match &self.scope {
            Some(scope) => scope.set(name, value),
            None => self.env.set_global(name, value),
        }
    }

    /// A child scope for comprehensions, whose loop variables do not leak.
    pub fn nested(&self) -> Ctx {
        Ctx {
            env: Rc::clone(&self.env),
            scope: Some(Scope::new(self.scope.clone())),
        }
    }
}
