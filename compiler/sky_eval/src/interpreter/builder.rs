//! `InterpreterBuilder` for creating Interpreter instances.

use std::rc::Rc;

use super::Interpreter;
use crate::builtins::universe;
use crate::diagnostics::{CallStack, DEFAULT_MAX_DEPTH};
use crate::print_handler::{stderr_handler, SharedPrintHandler};
use crate::value::Namespace;

pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    max_depth: Option<usize>,
    universe: Option<Rc<Namespace>>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            print_handler: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            universe: None,
        }
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Call depth limit; `None` disables the check.
    #[must_use]
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Share one universe across interpreters of the same load.
    #[must_use]
    pub fn universe(mut self, universe: Rc<Namespace>) -> Self {
        self.universe = Some(universe);
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            print: self.print_handler.unwrap_or_else(stderr_handler),
            call_stack: CallStack::new(self.max_depth),
            universe: self.universe.unwrap_or_else(|| Rc::new(universe())),
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
