//! Load and entry-point errors.

use std::fmt;
use std::io;
use std::sync::Arc;

use sky_eval::{EvalError, Position};
use sky_ir::LineIndex;
use sky_parse::ParseError;
use thiserror::Error;

use crate::resolver::{ModulePath, ResolveError};

/// A syntax error mapped to a source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Failure of a load.
///
/// Every variant except `Resolve` is cached against its module, so a
/// second `load` of a failed module returns the same error.
#[derive(Clone, Debug, Error)]
pub enum LoadError {
    #[error("cannot resolve {name:?}{}: {reason}", from_suffix(.from.as_ref()))]
    Resolve {
        from: Option<ModulePath>,
        name: String,
        #[source]
        reason: ResolveError,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: ModulePath,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("{}", render_lines(.errors))]
    Parse {
        path: ModulePath,
        errors: Vec<SyntaxDiagnostic>,
    },

    #[error("import cycle: {}", render_chain(.chain))]
    Cycle { chain: Vec<ModulePath> },

    #[error("{}", render_eval(.error))]
    Exec { path: ModulePath, error: EvalError },

    #[error("{position}: in load({module:?}): {source}")]
    Import {
        importer: ModulePath,
        position: Position,
        module: String,
        #[source]
        source: Box<LoadError>,
    },
}

impl LoadError {
    /// Innermost cause, following `Import` links.
    pub fn root(&self) -> &LoadError {
        let mut current = self;
        while let LoadError::Import { source, .. } = current {
            current = source;
        }
        current
    }

    /// Module the failure was raised in, if known.
    pub fn path(&self) -> Option<&ModulePath> {
        match self {
            LoadError::Resolve { from, .. } => from.as_ref(),
            LoadError::Read { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Exec { path, .. } => Some(path),
            LoadError::Cycle { chain } => chain.first(),
            LoadError::Import { importer, .. } => Some(importer),
        }
    }

    #[cold]
    pub(crate) fn read(path: &ModulePath, err: io::Error) -> Self {
        LoadError::Read {
            path: path.clone(),
            source: Arc::new(err),
        }
    }

    #[cold]
    pub(crate) fn parse(path: &ModulePath, source: &str, err: ParseError) -> Self {
        let index = LineIndex::new(source);
        let errors = err
            .errors
            .into_iter()
            .map(|e| {
                let (line, col) = index.line_col(source, e.span.start);
                SyntaxDiagnostic {
                    position: Position::new(Arc::clone(path.as_arc()), line, col),
                    message: e.message,
                }
            })
            .collect();
        LoadError::Parse {
            path: path.clone(),
            errors,
        }
    }
}

/// Failure of `Config::main` and friends.
#[derive(Clone, Debug, Error)]
pub enum EntryPointError {
    #[error("{path}: missing entry point {name:?}")]
    Missing { path: ModulePath, name: String },

    #[error("{path}: entry point {name:?} is not callable (got {got})")]
    NotCallable {
        path: ModulePath,
        name: String,
        got: String,
    },

    #[error("{}", render_bad_return(.name, .index.as_ref(), .got))]
    BadReturn {
        name: String,
        index: Option<usize>,
        got: String,
    },

    #[error("{}", render_eval(.0))]
    Exec(EvalError),
}

fn from_suffix(from: Option<&ModulePath>) -> String {
    from.map(|from| format!(" from {from}")).unwrap_or_default()
}

fn render_lines(errors: &[SyntaxDiagnostic]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_chain(chain: &[ModulePath]) -> String {
    chain
        .iter()
        .map(ModulePath::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// `file:line:col: message` plus the traceback, if any.
pub(crate) fn render_eval(error: &EvalError) -> String {
    match &error.position {
        Some(position) => format!("{position}: {error}"),
        None => error.to_string(),
    }
}

fn render_bad_return(name: &str, index: Option<&usize>, got: &str) -> String {
    match index {
        Some(i) => format!("{name}: element {i} of the result is {got}, want a proto message"),
        None => format!("{name}: returned {got}, want a list of proto messages"),
    }
}
