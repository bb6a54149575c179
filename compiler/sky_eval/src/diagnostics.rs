//! Live call stack for the interpreter.
//!
//! Every call (script function or builtin) pushes a [`CallFrame`] naming
//! the callee and the position of the call expression. The depth check is
//! part of `push`. When an error leaves a call, the stack is snapshotted
//! into an [`EvalBacktrace`] rendered as a traceback.

use std::rc::Rc;

use crate::errors::{call_depth_exceeded, BacktraceFrame, EvalBacktrace, EvalError, Position};

/// Name shown for module-level code in tracebacks.
pub const TOPLEVEL: &str = "<toplevel>";

/// Default call depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Callee name.
    pub name: Rc<str>,
    /// Where the call was made; `None` for calls made by the host.
    pub call_site: Option<Position>,
}

#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// The frame is not pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(call_depth_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The innermost frame, i.e. the call currently executing.
    pub fn top(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Snapshot as a traceback, outermost call first.
    ///
    /// Each frame's call site is reported as a position inside its caller,
    /// so the function named on a traceback line is the caller's.
    pub fn capture(&self) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .enumerate()
            .filter_map(|(i, frame)| {
                let position = frame.call_site.clone()?;
                let function = match i.checked_sub(1) {
                    Some(caller) => self.frames[caller].name.to_string(),
                    None => TOPLEVEL.to_string(),
                };
                Some(BacktraceFrame { function, position })
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace unless the error already carries one.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_DEPTH))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use super::*;
    use crate::errors::EvalErrorKind;

    fn frame(name: &str, line: Option<u32>) -> CallFrame {
        CallFrame {
            name: Rc::from(name),
            call_site: line.map(|line| Position::new(Arc::from("m.sky"), line, 1)),
        }
    }

    #[test]
    fn push_respects_limit() {
        let mut stack = CallStack::new(Some(2));
        stack.push(frame("a", Some(1))).unwrap();
        stack.push(frame("b", Some(2))).unwrap();
        let err = stack.push(frame("c", Some(3))).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 2 });
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn capture_names_callers() {
        let mut stack = CallStack::default();
        stack.push(frame("main", None)).unwrap();
        stack.push(frame("helper", Some(5))).unwrap();
        stack.push(frame("fail", Some(2))).unwrap();

        let trace = stack.capture();
        let names: Vec<_> = trace
            .frames()
            .iter()
            .map(|f| (f.function.as_str(), f.position.line))
            .collect();
        assert_eq!(names, vec![("main", 5), ("helper", 2)]);
    }

    #[test]
    fn toplevel_frame_for_module_calls() {
        let mut stack = CallStack::default();
        stack.push(frame("f", Some(7))).unwrap();
        assert_eq!(stack.capture().frames()[0].function, TOPLEVEL);
    }
}
