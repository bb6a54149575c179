//! Recursive module execution.
//!
//! `Loader` owns the cache for one load and doubles as the evaluator's
//! [`LoadHook`]: each `load` statement re-enters [`Loader::resolve_and_run`]
//! synchronously, so imports execute depth-first in statement order.

use std::rc::Rc;
use std::sync::Arc;

use sky_eval::{
    errors::load_failed, EvalError, Interpreter, LoadHook, ModuleEnv, Namespace, Position,
    SharedPrintHandler,
};
use tracing::debug;

use crate::cache::{CacheEntry, ModuleCache};
use crate::error::LoadError;
use crate::resolver::{ModulePath, ModuleResolver};

/// A nested load failure held until `exec_module` unwinds back to the
/// importing module.
struct PendingImport {
    module: String,
    error: LoadError,
}

pub(crate) struct Loader<'a> {
    resolver: &'a dyn ModuleResolver,
    globals: Rc<Namespace>,
    universe: Rc<Namespace>,
    print: SharedPrintHandler,
    cache: ModuleCache,
    /// Modules currently executing, outermost first.
    active: Vec<ModulePath>,
    pending: Option<PendingImport>,
}

impl<'a> Loader<'a> {
    pub(crate) fn new(
        resolver: &'a dyn ModuleResolver,
        globals: Rc<Namespace>,
        print: SharedPrintHandler,
    ) -> Self {
        Loader {
            resolver,
            globals,
            universe: Rc::new(sky_eval::universe()),
            print,
            cache: ModuleCache::new(),
            active: Vec::new(),
            pending: None,
        }
    }

    /// Paths in the order their execution began.
    pub(crate) fn into_order(self) -> Vec<ModulePath> {
        self.cache.into_order()
    }

    /// Resolve `name` and return the module's frozen exports, executing it
    /// on first use.
    pub(crate) fn resolve_and_run(
        &mut self,
        name: &str,
        from: Option<&ModulePath>,
    ) -> Result<(ModulePath, Rc<Namespace>), LoadError> {
        let path = self
            .resolver
            .resolve(name, from)
            .map_err(|reason| LoadError::Resolve {
                from: from.cloned(),
                name: name.to_string(),
                reason,
            })?;

        match self.cache.get(&path) {
            Some(CacheEntry::Loaded(exports)) => {
                debug!(%path, "module cache hit");
                return Ok((path, Rc::clone(exports)));
            }
            Some(CacheEntry::Failed(err)) => {
                debug!(%path, "module cache hit (failed)");
                return Err(err.clone());
            }
            Some(CacheEntry::Reserved) => {
                return Err(LoadError::Cycle {
                    chain: self.cycle_chain(&path),
                });
            }
            None => {}
        }

        debug!(%path, "module cache miss");
        self.cache.reserve(&path);
        self.active.push(path.clone());
        let result = self.execute(&path);
        self.active.pop();
        self.cache.complete(&path, &result);
        result.map(|exports| (path, exports))
    }

    fn cycle_chain(&self, path: &ModulePath) -> Vec<ModulePath> {
        let start = self.active.iter().position(|p| p == path).unwrap_or(0);
        let mut chain = self.active[start..].to_vec();
        chain.push(path.clone());
        chain
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
    fn execute(&mut self, path: &ModulePath) -> Result<Rc<Namespace>, LoadError> {
        let source = self
            .resolver
            .read(path)
            .map_err(|e| LoadError::read(path, e))?;
        let module = sky_parse::parse(&source).map_err(|e| LoadError::parse(path, &source, e))?;
        let env = ModuleEnv::new(
            Arc::clone(path.as_arc()),
            &source,
            module,
            Rc::clone(&self.globals),
        );
        let mut interp = Interpreter::builder()
            .print_handler(Arc::clone(&self.print))
            .universe(Rc::clone(&self.universe))
            .build();

        if let Err(error) = interp.exec_module(&env, self) {
            return Err(match self.pending.take() {
                Some(PendingImport { module, error: source }) => LoadError::Import {
                    importer: path.clone(),
                    position: error
                        .position
                        .unwrap_or_else(|| Position::new(Arc::clone(path.as_arc()), 1, 1)),
                    module,
                    source: Box::new(source),
                },
                None => LoadError::Exec {
                    path: path.clone(),
                    error,
                },
            });
        }

        let exports = env.globals().clone();
        exports.freeze();
        debug!(bindings = exports.len(), "module executed");
        Ok(Rc::new(exports))
    }
}

impl LoadHook for Loader<'_> {
    fn load(&mut self, module: &str, from: &Arc<str>) -> Result<Rc<Namespace>, EvalError> {
        let from = ModulePath::from(Arc::clone(from));
        match self.resolve_and_run(module, Some(&from)) {
            Ok((_, exports)) => Ok(exports),
            Err(error) => {
                let detail = error.root().to_string();
                self.pending = Some(PendingImport {
                    module: module.to_string(),
                    error,
                });
                Err(load_failed(module, detail))
            }
        }
    }
}
