//! Script handles for packages and the types inside them.
//!
//! `proto.package("example.v1")` returns a [`PackageValue`]. Attribute reads
//! resolve `example.v1.<attr>` against the registry at that moment, so an
//! unknown name only fails when a script actually asks for it.

use std::any::Any;
use std::sync::Arc;

use sky_eval::errors::argument_mismatch;
use sky_eval::{Arguments, EvalError, EvalResult, Interpreter, NativeObject, Value};

use crate::descriptor::{EnumDescriptor, MessageDescriptor};
use crate::record::TypedRecord;
use crate::registry::TypeRegistry;

/// Resolve `full_name` to a message or enum handle.
fn lookup_type(registry: &Arc<dyn TypeRegistry>, full_name: &str) -> Option<Value> {
    if let Ok(descriptor) = registry.lookup_message(full_name) {
        return Some(Value::native(MessageType::new(descriptor, Arc::clone(registry))));
    }
    registry
        .lookup_enum(full_name)
        .ok()
        .map(|descriptor| Value::native(EnumType { descriptor }))
}

pub struct PackageValue {
    name: Arc<str>,
    registry: Arc<dyn TypeRegistry>,
}

impl PackageValue {
    pub fn new(name: &str, registry: Arc<dyn TypeRegistry>) -> Self {
        PackageValue {
            name: Arc::from(name),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl NativeObject for PackageValue {
    fn type_name(&self) -> String {
        "proto.Package".to_string()
    }

    fn repr(&self) -> String {
        format!("<proto.Package {:?}>", &*self.name)
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        let full_name = format!("{}.{name}", self.name);
        match lookup_type(&self.registry, &full_name) {
            Some(value) => Ok(Some(value)),
            None => Err(EvalError::new(format!(
                "proto.package: type {full_name:?} not found"
            ))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A message type; calling it constructs a record from keyword arguments.
pub struct MessageType {
    descriptor: Arc<MessageDescriptor>,
    registry: Arc<dyn TypeRegistry>,
}

impl MessageType {
    pub fn new(descriptor: Arc<MessageDescriptor>, registry: Arc<dyn TypeRegistry>) -> Self {
        MessageType {
            descriptor,
            registry,
        }
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    pub fn registry(&self) -> &Arc<dyn TypeRegistry> {
        &self.registry
    }

    /// A new, empty, mutable record of this type.
    pub fn instantiate(&self) -> TypedRecord {
        TypedRecord::new(Arc::clone(&self.descriptor), Arc::clone(&self.registry))
    }
}

impl NativeObject for MessageType {
    fn type_name(&self) -> String {
        "proto.MessageType".to_string()
    }

    fn repr(&self) -> String {
        format!("<proto.MessageType {:?}>", &**self.descriptor.full_name())
    }

    /// Nested types, e.g. `pkg.Deployment.Strategy`.
    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        let full_name = format!("{}.{name}", self.descriptor.full_name());
        Ok(lookup_type(&self.registry, &full_name))
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, _interp: &mut Interpreter, args: Arguments) -> EvalResult {
        let Arguments { positional, named } = args;
        if !positional.is_empty() {
            return Err(argument_mismatch(
                self.descriptor.full_name(),
                "unexpected positional arguments",
            ));
        }
        let record = self.instantiate();
        for (name, value) in named {
            record.set(&name, value)?;
        }
        Ok(Value::native(record))
    }

    fn equals(&self, other: &dyn NativeObject) -> Result<bool, EvalError> {
        Ok(other
            .as_any()
            .downcast_ref::<MessageType>()
            .is_some_and(|o| o.descriptor.full_name() == self.descriptor.full_name()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An enum type; `Enum.VALUE` reads the value's name.
pub struct EnumType {
    descriptor: Arc<EnumDescriptor>,
}

impl NativeObject for EnumType {
    fn type_name(&self) -> String {
        "proto.EnumType".to_string()
    }

    fn repr(&self) -> String {
        format!("<proto.EnumType {:?}>", &**self.descriptor.full_name())
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(self
            .descriptor
            .by_name(name)
            .map(|value| Value::str(&value.name)))
    }

    fn attr_names(&self) -> Vec<String> {
        self.descriptor
            .values()
            .iter()
            .map(|v| v.name.clone())
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
