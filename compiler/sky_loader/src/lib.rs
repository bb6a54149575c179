//! Sky Loader - loads a skyfold script and its imports.
//!
//! [`load`] resolves the entry module, executes it (and, depth-first,
//! every module it `load`s) exactly once, and returns a [`Config`] holding
//! the entry module's frozen bindings. [`Config::main`] then calls the
//! script's `main(ctx)` and returns the records it built.
//!
//! ```text
//! load(entry) -> resolve -> cache? -> read -> parse -> execute
//!                                  ^                     |
//!                                  +---- load("...") ----+
//! ```
//!
//! Every module sees the same global namespace: the capability table
//! (`proto`, `json`, `yaml`, `url`, `hash`, `fail`, `struct`) plus caller
//! additions from [`LoadOptions`].

mod cache;
pub mod capabilities;
mod config;
mod context;
mod error;
mod loader;
mod options;
mod resolver;
mod testing;

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

pub use cache::{CacheEntry, ModuleCache};
pub use config::{Config, MAIN, TEST_PREFIX};
pub use context::ContextValue;
pub use error::{EntryPointError, LoadError, SyntaxDiagnostic};
pub use options::{LoadOptions, LoadOptionsBuilder};
pub use resolver::{
    normalize_path, FsResolver, MemoryResolver, ModulePath, ModuleResolver, ResolveError,
};
pub use testing::{TestOutcome, TestResult, TestSummary};

use loader::Loader;

/// Load `entry` and everything it imports.
///
/// Without a resolver in `options`, `entry` is a filesystem path and
/// every module name resolves against its directory.
#[tracing::instrument(level = "debug", skip(options))]
pub fn load(entry: &str, options: LoadOptions) -> Result<Config, LoadError> {
    let LoadOptions {
        globals: additions,
        resolver,
        registry,
        print,
        vars,
    } = options;

    let (resolver, entry_name): (Box<dyn ModuleResolver>, String) = match resolver {
        Some(resolver) => (resolver, entry.to_string()),
        None => {
            let (resolver, name) =
                FsResolver::for_entry(Path::new(entry)).map_err(|reason| LoadError::Resolve {
                    from: None,
                    name: entry.to_string(),
                    reason,
                })?;
            (Box::new(resolver), name)
        }
    };

    let mut globals = capabilities::capability_namespace(&registry);
    for (name, value) in additions {
        globals.set(&name, value);
    }
    // Also freezes the caller's globals; see `LoadOptionsBuilder::global`.
    globals.freeze();
    let globals = Rc::new(globals);

    let mut loader = Loader::new(resolver.as_ref(), Rc::clone(&globals), Arc::clone(&print));
    let (path, locals) = loader.resolve_and_run(&entry_name, None)?;
    let modules = loader.into_order();
    debug!(entry = %path, modules = modules.len(), "load complete");

    Ok(Config::new(path, globals, locals, modules, vars, print))
}
