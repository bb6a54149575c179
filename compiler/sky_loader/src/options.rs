//! `LoadOptions` and its builder.

use std::sync::Arc;

use sky_eval::{stderr_handler, SharedPrintHandler, Value};
use sky_proto::{SchemaRegistry, TypeRegistry};

use crate::resolver::ModuleResolver;

/// Settings for one [`load`](crate::load).
pub struct LoadOptions {
    pub(crate) globals: Vec<(String, Value)>,
    pub(crate) resolver: Option<Box<dyn ModuleResolver>>,
    pub(crate) registry: Arc<dyn TypeRegistry>,
    pub(crate) print: SharedPrintHandler,
    pub(crate) vars: Vec<(String, Value)>,
}

impl LoadOptions {
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::new()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptionsBuilder::new().build()
    }
}

pub struct LoadOptionsBuilder {
    globals: Vec<(String, Value)>,
    resolver: Option<Box<dyn ModuleResolver>>,
    registry: Option<Arc<dyn TypeRegistry>>,
    print: Option<SharedPrintHandler>,
    vars: Vec<(String, Value)>,
}

impl LoadOptionsBuilder {
    pub fn new() -> Self {
        LoadOptionsBuilder {
            globals: Vec::new(),
            resolver: None,
            registry: None,
            print: None,
            vars: Vec::new(),
        }
    }

    /// Bind an extra global, overriding a capability or an earlier global
    /// of the same name.
    ///
    /// Globals are shared with every module, so [`load`](crate::load)
    /// freezes `value` in place. A list or dict passed here cannot be
    /// mutated afterwards, through the script or through the caller's own
    /// handle.
    #[must_use]
    pub fn global(mut self, name: &str, value: Value) -> Self {
        self.globals.push((name.to_string(), value));
        self
    }

    /// Module source; defaults to an `FsResolver` rooted at the entry
    /// file's directory.
    #[must_use]
    pub fn resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print = Some(handler);
        self
    }

    /// Context variable exposed to the entry point as `ctx.vars[name]`.
    #[must_use]
    pub fn var(mut self, name: &str, value: Value) -> Self {
        self.vars.push((name.to_string(), value));
        self
    }

    pub fn build(self) -> LoadOptions {
        LoadOptions {
            globals: self.globals,
            resolver: self.resolver,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(SchemaRegistry::empty())),
            print: self.print.unwrap_or_else(stderr_handler),
            vars: self.vars,
        }
    }
}

impl Default for LoadOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
