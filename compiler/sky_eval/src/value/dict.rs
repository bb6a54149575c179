use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{HashKey, Value, ValueGuard};
use crate::errors::{frozen, EvalError};

#[derive(Default)]
struct Entries {
    pairs: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl Entries {
    fn reindex(&mut self) {
        self.index.clear();
        for (i, (key, _)) in self.pairs.iter().enumerate() {
            if let Ok(hk) = HashKey::from_value(key) {
                self.index.insert(hk, i);
            }
        }
    }
}

/// Insertion-ordered dict with optional key and value guards.
#[derive(Default)]
pub struct DictValue {
    entries: RefCell<Entries>,
    frozen: Cell<bool>,
    key_guard: Option<Rc<dyn ValueGuard>>,
    value_guard: Option<Rc<dyn ValueGuard>>,
}

impl std::fmt::Debug for DictValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}

impl DictValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> Result<Self, EvalError> {
        let dict = Self::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    pub fn guarded(
        key_guard: Rc<dyn ValueGuard>,
        value_guard: Rc<dyn ValueGuard>,
    ) -> Self {
        DictValue {
            key_guard: Some(key_guard),
            value_guard: Some(value_guard),
            ..Self::default()
        }
    }

    pub fn key_guard(&self) -> Option<&Rc<dyn ValueGuard>> {
        self.key_guard.as_ref()
    }

    pub fn value_guard(&self) -> Option<&Rc<dyn ValueGuard>> {
        self.value_guard.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        let hk = HashKey::from_value(key)?;
        let entries = self.entries.borrow();
        Ok(entries.index.get(&hk).map(|&i| entries.pairs[i].1.clone()))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, EvalError> {
        let hk = HashKey::from_value(key)?;
        Ok(self.entries.borrow().index.contains_key(&hk))
    }

    pub fn items(&self) -> Vec<(Value, Value)> {
        self.entries.borrow().pairs.clone()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries
            .borrow()
            .pairs
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries
            .borrow()
            .pairs
            .iter()
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    pub fn freeze(&self) {
        if self.frozen.replace(true) {
            return;
        }
        for (key, value) in &self.entries.borrow().pairs {
            key.freeze();
            value.freeze();
        }
    }

    fn check_mutable(&self) -> Result<(), EvalError> {
        if self.frozen.get() {
            return Err(frozen("dict"));
        }
        Ok(())
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn insert(&self, key: Value, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let key = match &self.key_guard {
            Some(guard) => guard.admit(key)?,
            None => key,
        };
        let value = match &self.value_guard {
            Some(guard) => guard.admit(value)?,
            None => value,
        };
        let hk = HashKey::from_value(&key)?;
        let mut entries = self.entries.borrow_mut();
        if let Some(&i) = entries.index.get(&hk) {
            entries.pairs[i].1 = value;
        } else {
            let i = entries.pairs.len();
            entries.pairs.push((key, value));
            entries.index.insert(hk, i);
        }
        Ok(())
    }

    pub fn remove(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        self.check_mutable()?;
        let hk = HashKey::from_value(key)?;
        let mut entries = self.entries.borrow_mut();
        let Some(i) = entries.index.remove(&hk) else {
            return Ok(None);
        };
        let (_, value) = entries.pairs.remove(i);
        entries.reindex();
        Ok(Some(value))
    }

    /// Remove and return the first entry in insertion order.
    pub fn pop_first(&self) -> Result<Option<(Value, Value)>, EvalError> {
        self.check_mutable()?;
        let mut entries = self.entries.borrow_mut();
        if entries.pairs.is_empty() {
            return Ok(None);
        }
        let pair = entries.pairs.remove(0);
        entries.reindex();
        Ok(Some(pair))
    }

    pub fn clear(&self) -> Result<(), EvalError> {
        self.check_mutable()?;
        let mut entries = self.entries.borrow_mut();
        entries.pairs.clear();
        entries.index.clear();
        Ok(())
    }

    /// Same keys mapping to equal values, regardless of order.
    pub fn equals(&self, other: &DictValue) -> Result<bool, EvalError> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (key, value) in self.items() {
            match other.get(&key)? {
                Some(theirs) if theirs.equals(&value)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}
