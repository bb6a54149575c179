//! Error types for script evaluation.
//!
//! `EvalErrorKind` is the structured category; factory functions below
//! populate both `kind` and `message` so callers never build messages by
//! hand.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// A resolved source position, `file:line:col` with 1-based line and column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: Arc<str>,
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(file: Arc<str>, line: u32, col: u32) -> Self {
        Position { file, line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        operation: &'static str,
    },

    // Types and operators
    TypeMismatch {
        expected: String,
        got: String,
    },
    UnsupportedBinary {
        op: &'static str,
        left: String,
        right: String,
    },
    UnsupportedUnary {
        op: &'static str,
        operand: String,
    },
    Unhashable {
        type_name: String,
    },

    // Calls
    /// A builtin argument of the wrong kind.
    InvalidArgument {
        function: String,
        param: String,
        got: String,
        want: String,
    },
    /// Arity or keyword binding failure.
    ArgumentMismatch {
        function: String,
        detail: String,
    },
    NotCallable {
        type_name: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    NoSuchAttribute {
        type_name: String,
        name: String,
    },
    IndexOutOfRange {
        index: i64,
        len: usize,
    },
    KeyNotFound {
        key: String,
    },

    // Mutation
    Frozen {
        type_name: String,
    },

    // Script-requested failure
    Fail {
        message: String,
    },

    // Module loading
    Load {
        module: String,
        detail: String,
    },

    /// Catch-all for errors without a structured category.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),

            Self::TypeMismatch { expected, got } => write!(f, "got {got}, want {expected}"),
            Self::UnsupportedBinary { op, left, right } => {
                write!(f, "unknown binary op: {left} {op} {right}")
            }
            Self::UnsupportedUnary { op, operand } => {
                write!(f, "unknown unary op: {op} {operand}")
            }
            Self::Unhashable { type_name } => write!(f, "unhashable type: {type_name}"),

            Self::InvalidArgument {
                function,
                param,
                got,
                want,
            } => write!(f, "{function}: for parameter {param}: got {got}, want {want}"),
            Self::ArgumentMismatch { function, detail } => write!(f, "{function}: {detail}"),
            Self::NotCallable { type_name } => write!(f, "invalid call of non-function ({type_name})"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::UndefinedVariable { name } => write!(f, "undefined: {name}"),
            Self::NoSuchAttribute { type_name, name } => {
                write!(f, "{type_name} has no .{name} field or method")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range [0:{len}]")
            }
            Self::KeyNotFound { key } => write!(f, "key {key} not in dict"),

            Self::Frozen { type_name } => write!(f, "cannot mutate frozen {type_name}"),

            Self::Fail { message } => write!(f, "fail: {message}"),

            Self::Load { module, detail } => write!(f, "cannot load {module}: {detail}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// One frame of a rendered traceback: where execution was inside `function`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub function: String,
    pub position: Position,
}

/// Snapshot of the call stack at an error site, outermost call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        write!(f, "Traceback (most recent call last):")?;
        for frame in &self.frames {
            write!(f, "\n  {}: in {}", frame.position, frame.function)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Innermost source position the error was raised at.
    pub position: Option<Position>,
    /// Call stack at the error site, when raised inside a call.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an uncategorized error.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            position: None,
            backtrace: None,
        }
    }

    /// Attach a position unless one is already present.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// True for errors raised by the script's own `fail(...)` call.
    pub fn is_fail(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Fail { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(backtrace) = self.backtrace.as_ref().filter(|b| !b.is_empty()) {
            write!(f, "\n{backtrace}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

// Types and operators

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn unsupported_binary(op: &'static str, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedBinary {
        op,
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn unsupported_unary(op: &'static str, operand: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedUnary {
        op,
        operand: operand.to_string(),
    })
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unhashable {
        type_name: type_name.to_string(),
    })
}

// Calls

/// `<function>: for parameter <param>: got <got>, want <want>`
#[cold]
pub fn invalid_argument(function: &str, param: &str, got: &str, want: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        function: function.to_string(),
        param: param.to_string(),
        got: got.to_string(),
        want: want.to_string(),
    })
}

#[cold]
pub fn argument_mismatch(function: &str, detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentMismatch {
        function: function.to_string(),
        detail: detail.into(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn call_depth_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Access

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_attribute(type_name: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchAttribute {
        type_name: type_name.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index, len })
}

#[cold]
pub fn key_not_found(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

// Mutation

#[cold]
pub fn frozen(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Frozen {
        type_name: type_name.to_string(),
    })
}

// Failure and loading

#[cold]
pub fn fail(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Fail {
        message: message.into(),
    })
}

#[cold]
pub fn load_failed(module: &str, detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Load {
        module: module.to_string(),
        detail: detail.into(),
    })
}
