use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use super::{Value, ValueGuard};
use crate::errors::{frozen, index_out_of_range, EvalError};

/// A mutable list, optionally restricted by a [`ValueGuard`].
pub struct ListValue {
    items: RefCell<Vec<Value>>,
    frozen: Cell<bool>,
    guard: Option<Rc<dyn ValueGuard>>,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Self {
        ListValue {
            items: RefCell::new(items),
            frozen: Cell::new(false),
            guard: None,
        }
    }

    /// Build a guarded list, admitting every initial element.
    pub fn guarded(guard: Rc<dyn ValueGuard>, items: Vec<Value>) -> Result<Self, EvalError> {
        let items = items
            .into_iter()
            .map(|item| guard.admit(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListValue {
            items: RefCell::new(items),
            frozen: Cell::new(false),
            guard: Some(guard),
        })
    }

    pub fn guard(&self) -> Option<&Rc<dyn ValueGuard>> {
        self.guard.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Freeze the list and every element. The flag is set first so that a
    /// list reachable from itself terminates.
    pub fn freeze(&self) {
        if self.frozen.replace(true) {
            return;
        }
        for item in self.items.borrow().iter() {
            item.freeze();
        }
    }

    fn check_mutable(&self) -> Result<(), EvalError> {
        if self.frozen.get() {
            return Err(frozen("list"));
        }
        Ok(())
    }

    fn admit(&self, value: Value) -> Result<Value, EvalError> {
        match &self.guard {
            Some(guard) => guard.admit(value),
            None => Ok(value),
        }
    }

    pub fn push(&self, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let value = self.admit(value)?;
        self.items.borrow_mut().push(value);
        Ok(())
    }

    /// Append all of `values`; on a rejected element nothing is appended.
    pub fn extend(&self, values: Vec<Value>) -> Result<(), EvalError> {
        self.check_mutable()?;
        let values = values
            .into_iter()
            .map(|v| self.admit(v))
            .collect::<Result<Vec<_>, _>>()?;
        self.items.borrow_mut().extend(values);
        Ok(())
    }

    /// Insert before `index`, clamped to the list bounds.
    pub fn insert(&self, index: usize, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let value = self.admit(value)?;
        let mut items = self.items.borrow_mut();
        let index = index.min(items.len());
        items.insert(index, value);
        Ok(())
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let value = self.admit(value)?;
        let mut items = self.items.borrow_mut();
        let len = items.len();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(index_out_of_range(
                i64::try_from(index).unwrap_or(i64::MAX),
                len,
            )),
        }
    }

    pub fn remove_at(&self, index: usize) -> Result<Value, EvalError> {
        self.check_mutable()?;
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            return Err(index_out_of_range(
                i64::try_from(index).unwrap_or(i64::MAX),
                items.len(),
            ));
        }
        Ok(items.remove(index))
    }

    pub fn clear(&self) -> Result<(), EvalError> {
        self.check_mutable()?;
        self.items.borrow_mut().clear();
        Ok(())
    }
}
