//! Per-load module cache.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use sky_eval::Namespace;

use crate::error::LoadError;
use crate::resolver::ModulePath;

/// State of one module within a load.
#[derive(Clone, Debug)]
pub enum CacheEntry {
    /// Execution has started and not yet returned; seeing it again is a
    /// cycle.
    Reserved,
    Loaded(Rc<Namespace>),
    Failed(LoadError),
}

/// Entries are never removed; the cache lives as long as its load.
#[derive(Default)]
pub struct ModuleCache {
    entries: FxHashMap<ModulePath, CacheEntry>,
    /// Paths in the order their execution began.
    order: Vec<ModulePath>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &ModulePath) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    pub fn reserve(&mut self, path: &ModulePath) {
        debug_assert!(!self.entries.contains_key(path), "module reserved twice");
        self.entries.insert(path.clone(), CacheEntry::Reserved);
        self.order.push(path.clone());
    }

    /// Replace the reservation with the outcome of execution.
    pub fn complete(&mut self, path: &ModulePath, result: &Result<Rc<Namespace>, LoadError>) {
        let entry = match result {
            Ok(exports) => CacheEntry::Loaded(Rc::clone(exports)),
            Err(err) => CacheEntry::Failed(err.clone()),
        };
        self.entries.insert(path.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_order(self) -> Vec<ModulePath> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_then_complete() {
        let mut cache = ModuleCache::new();
        let path = ModulePath::new("/a.sky");
        cache.reserve(&path);
        assert!(matches!(cache.get(&path), Some(CacheEntry::Reserved)));

        cache.complete(&path, &Ok(Rc::new(Namespace::new())));
        assert!(matches!(cache.get(&path), Some(CacheEntry::Loaded(_))));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.into_order(), vec![path]);
    }

    #[test]
    fn failures_are_kept() {
        let mut cache = ModuleCache::new();
        let path = ModulePath::new("/bad.sky");
        cache.reserve(&path);
        cache.complete(
            &path,
            &Err(LoadError::Cycle {
                chain: vec![path.clone(), path.clone()],
            }),
        );
        assert!(matches!(
            cache.get(&path),
            Some(CacheEntry::Failed(LoadError::Cycle { .. }))
        ));
    }
}
