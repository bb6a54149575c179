//! Variable scoping.
//!
//! Name lookup walks, in order: the enclosing function scopes, the module's
//! top-level bindings, the predeclared globals shared by every module of a
//! load, and finally the universe builtins.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use sky_ir::{LineIndex, Module, Span};

use crate::errors::Position;
use crate::value::{Namespace, Value};

/// Per-module execution state, shared by every function defined in it.
pub struct ModuleEnv {
    path: Arc<str>,
    source: Rc<str>,
    lines: LineIndex,
    module: Rc<Module>,
    predeclared: Rc<Namespace>,
    globals: RefCell<Namespace>,
}

impl ModuleEnv {
    pub fn new(
        path: Arc<str>,
        source: &str,
        module: Module,
        predeclared: Rc<Namespace>,
    ) -> Rc<Self> {
        Rc::new(ModuleEnv {
            path,
            source: Rc::from(source),
            lines: LineIndex::new(source),
            module: Rc::new(module),
            predeclared,
            globals: RefCell::new(Namespace::new()),
        })
    }

    /// Canonical path of the module.
    pub fn path(&self) -> &Arc<str> {
        &self.path
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn predeclared(&self) -> &Rc<Namespace> {
        &self.predeclared
    }

    /// Resolve a span to `file:line:col`.
    pub fn position(&self, span: Span) -> Position {
        let (line, col) = self.lines.line_col(&self.source, span.start);
        Position::new(Arc::clone(&self.path), line, col)
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().set(name, value);
    }

    pub fn globals(&self) -> Ref<'_, Namespace> {
        self.globals.borrow()
    }
}

/// A function-local (or comprehension-local) scope.
#[derive(Default)]
pub struct Scope {
    vars: RefCell<FxHashMap<Rc<str>, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new(parent: Option<Rc<Scope>>) -> Rc<Self> {
        Rc::new(Scope {
            vars: RefCell::new(FxHashMap::default()),
            parent,
        })
    }

    /// Look the name up in this scope and its parents.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.vars.borrow().get(name) {
                return Some(value.clone());
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// Bind in this scope; parents are never written.
    pub fn set(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(Rc::from(name), value);
    }

    /// Freeze values captured by a closure, including parent scopes.
    pub fn freeze(&self) {
        for value in self.vars.borrow().values() {
            value.freeze();
        }
        if let Some(parent) = &self.parent {
            parent.freeze();
        }
    }
}
