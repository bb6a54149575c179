use std::any::Any;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{NativeObject, Value};
use crate::errors::EvalError;

/// Insertion-ordered name-to-value bindings.
///
/// Used for module globals, capability tables, and loaded module exports.
#[derive(Clone, Default)]
pub struct Namespace {
    entries: Vec<(Rc<str>, Value)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Bind `name`; rebinding keeps the original position.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(&i) = self.index.get(name) {
            self.entries[i].1 = value;
            return;
        }
        let name: Rc<str> = Rc::from(name);
        self.index.insert(Rc::clone(&name), self.entries.len());
        self.entries.push((name, value));
    }

    /// Bind every entry of `other`, overwriting same-named entries.
    pub fn extend(&mut self, other: &Namespace) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (&**name, value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| &**name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze every bound value.
    pub fn freeze(&self) {
        for (_, value) in &self.entries {
            value.freeze();
        }
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A named group of builtins exposed as one global, e.g. `json` or `proto`.
pub struct ModuleValue {
    name: Rc<str>,
    members: Namespace,
}

impl ModuleValue {
    pub fn new(name: &str, members: Namespace) -> Self {
        ModuleValue {
            name: Rc::from(name),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &Namespace {
        &self.members
    }
}

impl NativeObject for ModuleValue {
    fn type_name(&self) -> String {
        "module".to_string()
    }

    fn repr(&self) -> String {
        format!("<module {}>", self.name)
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(self.members.get(name).cloned())
    }

    fn attr_names(&self) -> Vec<String> {
        self.members.names().map(str::to_string).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
