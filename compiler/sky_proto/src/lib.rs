//! Sky Proto - the typed-record bridge.
//!
//! Scripts build protobuf-style messages through `proto.package(...)`
//! handles; the host reads them back as [`TypedRecord`]s. Descriptors come
//! from a [`TypeRegistry`], normally a [`SchemaRegistry`] built in code or
//! from YAML/JSON schema documents.
//!
//! Records are mutable until frozen. Freezing is recursive and terminal:
//! every mutating operation then fails with "cannot mutate frozen <type>".

pub mod descriptor;
pub mod encode;
mod namespace;
mod package;
mod record;
mod registry;
mod schema;

pub use descriptor::{
    Cardinality, DefaultValue, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType,
    MessageDescriptor, ScalarKind,
};
pub use namespace::proto_module;
pub use package::{EnumType, MessageType, PackageValue};
pub use record::TypedRecord;
pub use registry::{
    FieldSpec, MessageSpec, RegistryError, SchemaRegistry, SchemaRegistryBuilder, TypeKind,
    TypeRegistry,
};
pub use schema::SchemaError;

#[cfg(test)]
mod test_support;
