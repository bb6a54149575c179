//! Typed records: schema-checked, freezable message values.
//!
//! A record owns one slot per declared field. Slots hold canonical values
//! (see [`convert`]); unset slots read as zero values, `None` for message
//! fields, and live guarded containers for repeated and map fields.

mod convert;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use sky_eval::errors::frozen;
use sky_eval::{DictValue, EvalError, ListValue, NativeObject, Value, ValueGuard};

pub(crate) use convert::FieldGuard;

use crate::descriptor::{
    Cardinality, DefaultValue, FieldDescriptor, FieldType, MessageDescriptor, ScalarKind,
};
use crate::encode::text;
use crate::registry::TypeRegistry;

pub struct TypedRecord {
    descriptor: Arc<MessageDescriptor>,
    registry: Arc<dyn TypeRegistry>,
    slots: RefCell<Vec<Option<Value>>>,
    frozen: Cell<bool>,
}

impl TypedRecord {
    pub fn new(descriptor: Arc<MessageDescriptor>, registry: Arc<dyn TypeRegistry>) -> Self {
        let slots = vec![None; descriptor.fields().len()];
        TypedRecord {
            descriptor,
            registry,
            slots: RefCell::new(slots),
            frozen: Cell::new(false),
        }
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    pub fn registry(&self) -> &Arc<dyn TypeRegistry> {
        &self.registry
    }

    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Freeze this record and every value reachable from its fields.
    pub fn freeze(&self) {
        if self.frozen.replace(true) {
            return;
        }
        for value in self.slots.borrow().iter().flatten() {
            value.freeze();
        }
    }

    fn check_mutable(&self) -> Result<(), EvalError> {
        if self.frozen.get() {
            return Err(frozen(self.full_name()));
        }
        Ok(())
    }

    fn field_index(&self, name: &str) -> Result<usize, EvalError> {
        self.descriptor.field(name).map(|(i, _)| i).ok_or_else(|| {
            EvalError::new(format!("{} has no field {name:?}", self.full_name()))
        })
    }

    fn context(&self, field: &FieldDescriptor) -> Arc<str> {
        Arc::from(format!("{}.{}", self.short_name(), field.name))
    }

    fn short_name(&self) -> &str {
        let name = self.full_name();
        name.rfind('.').map_or(name, |i| &name[i + 1..])
    }

    fn guard(&self, field: &FieldDescriptor, ty: FieldType) -> Rc<dyn ValueGuard> {
        Rc::new(FieldGuard::new(
            self.context(field),
            ty,
            Arc::clone(&self.registry),
        ))
    }

    fn new_list(&self, field: &FieldDescriptor, items: Vec<Value>) -> Result<ListValue, EvalError> {
        ListValue::guarded(self.guard(field, field.ty.clone()), items)
    }

    fn new_dict(&self, field: &FieldDescriptor) -> DictValue {
        let Cardinality::Map { key } = field.cardinality else {
            return DictValue::new();
        };
        DictValue::guarded(
            self.guard(field, FieldType::Scalar(key)),
            self.guard(field, field.ty.clone()),
        )
    }

    // ===== Field access =====

    /// Read a field by name.
    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        let index = self.field_index(name)?;
        self.read(index)
    }

    /// Read a slot, creating the container of an unset repeated or map
    /// field so that mutations through it stick. Frozen records hand out a
    /// frozen empty container instead.
    fn read(&self, index: usize) -> Result<Value, EvalError> {
        if let Some(value) = &self.slots.borrow()[index] {
            return Ok(value.clone());
        }
        let field = &self.descriptor.fields()[index];
        let value = match field.cardinality {
            Cardinality::Singular => return self.zero_value(field),
            Cardinality::Repeated => Value::List(Rc::new(self.new_list(field, Vec::new())?)),
            Cardinality::Map { .. } => Value::Dict(Rc::new(self.new_dict(field))),
        };
        if self.is_frozen() {
            value.freeze();
        } else {
            self.slots.borrow_mut()[index] = Some(value.clone());
        }
        Ok(value)
    }

    fn zero_value(&self, field: &FieldDescriptor) -> Result<Value, EvalError> {
        Ok(match &field.ty {
            FieldType::Scalar(kind) if kind.is_float() => Value::Float(0.0),
            FieldType::Scalar(ScalarKind::Bool) => Value::Bool(false),
            FieldType::Scalar(ScalarKind::String) => Value::str(""),
            FieldType::Scalar(_) => Value::Int(0),
            FieldType::Enum(name) => {
                let descriptor = self
                    .registry
                    .lookup_enum(name)
                    .map_err(|e| EvalError::new(e.to_string()))?;
                descriptor
                    .zero()
                    .map_or(Value::None, |v| Value::str(&v.name))
            }
            FieldType::Message(_) => Value::None,
        })
    }

    /// Assign a field. `None` clears it.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let index = self.field_index(name)?;
        let field = &self.descriptor.fields()[index];
        let stored = match (&field.cardinality, value) {
            (_, Value::None) => None,
            (Cardinality::Singular, value) => Some(convert::convert(
                &self.context(field),
                &field.ty,
                &self.registry,
                value,
            )?),
            (Cardinality::Repeated, value) => {
                let items = match &value {
                    Value::List(l) => l.snapshot(),
                    Value::Tuple(t) => t.to_vec(),
                    other => {
                        return Err(EvalError::new(format!(
                            "{}: got {}, want list",
                            self.context(field),
                            other.type_name()
                        )))
                    }
                };
                Some(Value::List(Rc::new(self.new_list(field, items)?)))
            }
            (Cardinality::Map { .. }, value) => {
                let Value::Dict(source) = &value else {
                    return Err(EvalError::new(format!(
                        "{}: got {}, want dict",
                        self.context(field),
                        value.type_name()
                    )));
                };
                let dict = self.new_dict(field);
                for (k, v) in source.items() {
                    dict.insert(k, v)?;
                }
                Some(Value::Dict(Rc::new(dict)))
            }
        };
        self.slots.borrow_mut()[index] = stored;
        Ok(())
    }

    /// Fields that are set, in declaration order. Empty repeated and map
    /// fields count as unset.
    pub fn set_fields(&self) -> Vec<(&FieldDescriptor, Value)> {
        let slots = self.slots.borrow();
        self.descriptor
            .fields()
            .iter()
            .zip(slots.iter())
            .filter_map(|(field, slot)| {
                let value = slot.as_ref()?;
                let empty = match value {
                    Value::List(l) => l.is_empty(),
                    Value::Dict(d) => d.is_empty(),
                    _ => false,
                };
                (!empty).then(|| (field, value.clone()))
            })
            .collect()
    }

    // ===== Record operations =====

    /// Reset every field to unset.
    pub fn clear(&self) -> Result<(), EvalError> {
        self.check_mutable()?;
        self.slots.borrow_mut().iter_mut().for_each(|slot| *slot = None);
        Ok(())
    }

    /// Deep copy. The copy is mutable regardless of this record's state.
    pub fn deep_clone(&self) -> Result<TypedRecord, EvalError> {
        let slots = self
            .slots
            .borrow()
            .iter()
            .map(|slot| slot.as_ref().map(clone_value).transpose())
            .collect::<Result<_, _>>()?;
        Ok(TypedRecord {
            descriptor: Arc::clone(&self.descriptor),
            registry: Arc::clone(&self.registry),
            slots: RefCell::new(slots),
            frozen: Cell::new(false),
        })
    }

    /// Merge `src` into this record: set scalars overwrite, nested records
    /// merge, repeated fields append, and map entries overwrite per key.
    pub fn merge_from(&self, src: &TypedRecord) -> Result<(), EvalError> {
        self.check_mutable()?;
        if src.full_name() != self.full_name() {
            return Err(EvalError::new(format!(
                "cannot merge {} into {}",
                src.full_name(),
                self.full_name()
            )));
        }
        let incoming: Vec<Option<Value>> = src.slots.borrow().clone();
        for (index, value) in incoming.into_iter().enumerate() {
            let Some(value) = value else { continue };
            let field = &self.descriptor.fields()[index];
            match field.cardinality {
                Cardinality::Singular => self.merge_singular(index, &value)?,
                Cardinality::Repeated => {
                    if let (Value::List(dst), Value::List(src)) = (self.read(index)?, &value) {
                        let items = src
                            .snapshot()
                            .iter()
                            .map(clone_value)
                            .collect::<Result<_, _>>()?;
                        dst.extend(items)?;
                    }
                }
                Cardinality::Map { .. } => {
                    if let (Value::Dict(dst), Value::Dict(src)) = (self.read(index)?, &value) {
                        for (k, v) in src.items() {
                            dst.insert(k, clone_value(&v)?)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn merge_singular(&self, index: usize, value: &Value) -> Result<(), EvalError> {
        let current = self.slots.borrow()[index].clone();
        if let (Some(dst), Some(src)) = (
            current.as_ref().and_then(Value::downcast_native::<TypedRecord>),
            value.downcast_native::<TypedRecord>(),
        ) {
            return dst.merge_from(src);
        }
        self.slots.borrow_mut()[index] = Some(clone_value(value)?);
        Ok(())
    }

    /// Fill unset or zero-valued scalar and enum fields that declare a
    /// default, then recurse into set nested records.
    pub fn set_defaults(&self) -> Result<(), EvalError> {
        self.check_mutable()?;
        for (index, field) in self.descriptor.fields().iter().enumerate() {
            if field.cardinality != Cardinality::Singular {
                continue;
            }
            let current = self.slots.borrow()[index].clone();
            if let Some(nested) = current
                .as_ref()
                .and_then(Value::downcast_native::<TypedRecord>)
            {
                nested.set_defaults()?;
                continue;
            }
            let Some(default) = &field.default else { continue };
            let is_zero = match &current {
                None => true,
                Some(value) => value.equals(&self.zero_value(field)?)?,
            };
            if is_zero {
                let value = match default {
                    DefaultValue::Bool(b) => Value::Bool(*b),
                    DefaultValue::Int(n) => Value::Int(*n),
                    DefaultValue::Float(f) => Value::Float(*f),
                    DefaultValue::Str(s) => Value::str(s),
                };
                self.set(&field.name, value)?;
            }
        }
        Ok(())
    }

    /// Value of a field for comparison, without creating containers.
    fn peek(&self, index: usize) -> Result<Value, EvalError> {
        if let Some(value) = &self.slots.borrow()[index] {
            return Ok(value.clone());
        }
        let field = &self.descriptor.fields()[index];
        match field.cardinality {
            Cardinality::Singular => self.zero_value(field),
            Cardinality::Repeated => Ok(Value::list(Vec::new())),
            Cardinality::Map { .. } => Ok(Value::dict(DictValue::new())),
        }
    }
}

/// Deep copy of a stored field value. Containers keep their guards.
fn clone_value(value: &Value) -> Result<Value, EvalError> {
    Ok(match value {
        Value::List(list) => {
            let items = list
                .snapshot()
                .iter()
                .map(clone_value)
                .collect::<Result<_, _>>()?;
            let copy = match list.guard() {
                Some(guard) => ListValue::guarded(Rc::clone(guard), items)?,
                None => ListValue::new(items),
            };
            Value::List(Rc::new(copy))
        }
        Value::Dict(dict) => {
            let copy = match (dict.key_guard(), dict.value_guard()) {
                (Some(k), Some(v)) => DictValue::guarded(Rc::clone(k), Rc::clone(v)),
                _ => DictValue::new(),
            };
            for (k, v) in dict.items() {
                copy.insert(k, clone_value(&v)?)?;
            }
            Value::Dict(Rc::new(copy))
        }
        Value::Native(object) => match object.as_any().downcast_ref::<TypedRecord>() {
            Some(record) => Value::Native(Rc::new(record.deep_clone()?)),
            None => value.clone(),
        },
        other => other.clone(),
    })
}

impl std::fmt::Debug for TypedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&NativeObject::repr(self))
    }
}

impl NativeObject for TypedRecord {
    fn type_name(&self) -> String {
        self.full_name().to_string()
    }

    fn repr(&self) -> String {
        let body = text::encode(self, true);
        if body.is_empty() {
            format!("<{}>", self.full_name())
        } else {
            format!("<{} {body}>", self.full_name())
        }
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        match self.descriptor.field(name) {
            Some((index, _)) => self.read(index).map(Some),
            None => Ok(None),
        }
    }

    fn attr_names(&self) -> Vec<String> {
        self.descriptor
            .fields()
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EvalError> {
        self.set(name, value)
    }

    fn freeze(&self) {
        TypedRecord::freeze(self);
    }

    fn is_frozen(&self) -> bool {
        TypedRecord::is_frozen(self)
    }

    fn equals(&self, other: &dyn NativeObject) -> Result<bool, EvalError> {
        let Some(other) = other.as_any().downcast_ref::<TypedRecord>() else {
            return Ok(false);
        };
        if other.full_name() != self.full_name() {
            return Ok(false);
        }
        for index in 0..self.descriptor.fields().len() {
            if !self.peek(index)?.equals(&other.peek(index)?)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests;
