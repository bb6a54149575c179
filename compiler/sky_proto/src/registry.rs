//! Type registry: message and enum descriptors by fully qualified name.
//!
//! Records consult the registry lazily, when a nested message or enum type
//! is first needed, so a registry only has to know the types a script
//! actually touches.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::debug;

use crate::descriptor::{
    Cardinality, DefaultValue, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType,
    MessageDescriptor, ScalarKind,
};
use crate::schema::{self, SchemaError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Message,
    Enum,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TypeKind::Message => "message",
            TypeKind::Enum => "enum",
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} type {name:?} not found")]
    NotFound { kind: TypeKind, name: String },
}

/// Source of descriptors for the typed-record bridge.
pub trait TypeRegistry: Send + Sync {
    fn lookup_message(&self, name: &str) -> Result<Arc<MessageDescriptor>, RegistryError>;

    fn lookup_enum(&self, name: &str) -> Result<Arc<EnumDescriptor>, RegistryError>;
}

/// In-memory registry built from [`SchemaRegistryBuilder`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    messages: FxHashMap<String, Arc<MessageDescriptor>>,
    enums: FxHashMap<String, Arc<EnumDescriptor>>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// A registry with no types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a single YAML schema document.
    pub fn from_yaml(text: &str) -> Result<Self, SchemaError> {
        Self::builder().add_yaml(text)?.build()
    }

    pub fn message_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn enum_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.enums.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TypeRegistry for SchemaRegistry {
    fn lookup_message(&self, name: &str) -> Result<Arc<MessageDescriptor>, RegistryError> {
        let found = self.messages.get(name).cloned();
        debug!(name, found = found.is_some(), "message lookup");
        found.ok_or_else(|| RegistryError::NotFound {
            kind: TypeKind::Message,
            name: name.to_string(),
        })
    }

    fn lookup_enum(&self, name: &str) -> Result<Arc<EnumDescriptor>, RegistryError> {
        let found = self.enums.get(name).cloned();
        debug!(name, found = found.is_some(), "enum lookup");
        found.ok_or_else(|| RegistryError::NotFound {
            kind: TypeKind::Enum,
            name: name.to_string(),
        })
    }
}

/// A field whose type name is not yet resolved.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    name: String,
    number: u32,
    type_name: String,
    cardinality: Cardinality,
    default: Option<DefaultValue>,
}

impl FieldSpec {
    /// `type_name` is a scalar kind (`int32`, `string`, ...) or a message
    /// or enum name, relative to the enclosing message or absolute with a
    /// leading `.`.
    pub fn new(name: &str, number: u32, type_name: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            number,
            type_name: type_name.to_string(),
            cardinality: Cardinality::Singular,
            default: None,
        }
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Make this a map field; `type_name` becomes the value type.
    #[must_use]
    pub fn map(mut self, key: ScalarKind) -> Self {
        self.cardinality = Cardinality::Map { key };
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Clone, Debug)]
pub struct MessageSpec {
    full_name: String,
    fields: Vec<FieldSpec>,
}

impl MessageSpec {
    pub fn new(full_name: &str) -> Self {
        MessageSpec {
            full_name: full_name.to_string(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// Collects message and enum declarations, then resolves type references
/// in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    messages: Vec<MessageSpec>,
    enums: Vec<(String, Vec<EnumValueDescriptor>)>,
}

impl SchemaRegistryBuilder {
    #[must_use]
    pub fn message(mut self, spec: MessageSpec) -> Self {
        self.messages.push(spec);
        self
    }

    #[must_use]
    pub fn enumeration(mut self, full_name: &str, values: &[(&str, i32)]) -> Self {
        let values = values
            .iter()
            .map(|&(name, number)| EnumValueDescriptor {
                name: name.to_string(),
                number,
            })
            .collect();
        self.enums.push((full_name.to_string(), values));
        self
    }

    pub fn add_yaml(mut self, text: &str) -> Result<Self, SchemaError> {
        let doc = schema::parse_yaml(text)?;
        schema::flatten(&doc, &mut self.messages, &mut self.enums)?;
        Ok(self)
    }

    pub fn add_json(mut self, text: &str) -> Result<Self, SchemaError> {
        let doc = schema::parse_json(text)?;
        schema::flatten(&doc, &mut self.messages, &mut self.enums)?;
        Ok(self)
    }

    /// Read a schema file; `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn add_file(self, path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "reading schema");
        if path.extension().is_some_and(|ext| ext == "json") {
            self.add_json(&text)
        } else {
            self.add_yaml(&text)
        }
    }

    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut names = FxHashSet::default();
        let mut enum_names = FxHashSet::default();
        for spec in &self.messages {
            if !names.insert(spec.full_name.clone()) {
                return Err(SchemaError::DuplicateType(spec.full_name.clone()));
            }
        }
        for (name, _) in &self.enums {
            if names.contains(name) || !enum_names.insert(name.clone()) {
                return Err(SchemaError::DuplicateType(name.clone()));
            }
        }

        let mut registry = SchemaRegistry::default();
        for (name, values) in self.enums {
            if values.is_empty() {
                return Err(SchemaError::EmptyEnum(name));
            }
            let descriptor = EnumDescriptor::new(&name, values);
            registry.enums.insert(name, Arc::new(descriptor));
        }
        for spec in self.messages {
            let fields = resolve_fields(&spec, &names, &enum_names)?;
            let descriptor = MessageDescriptor::new(&spec.full_name, fields);
            registry.messages.insert(spec.full_name, Arc::new(descriptor));
        }
        debug!(
            messages = registry.messages.len(),
            enums = registry.enums.len(),
            "schema registry built"
        );
        Ok(registry)
    }
}

fn resolve_fields(
    spec: &MessageSpec,
    messages: &FxHashSet<String>,
    enums: &FxHashSet<String>,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let mut seen_names = FxHashSet::default();
    let mut seen_numbers = FxHashSet::default();
    let mut fields = Vec::with_capacity(spec.fields.len());
    for field in &spec.fields {
        if !seen_names.insert(field.name.as_str()) || !seen_numbers.insert(field.number) {
            return Err(SchemaError::DuplicateField {
                message: spec.full_name.clone(),
                field: field.name.clone(),
            });
        }
        if field.number == 0 {
            return Err(SchemaError::InvalidField {
                message: spec.full_name.clone(),
                field: field.name.clone(),
                detail: "field number must be positive".to_string(),
            });
        }
        if let Cardinality::Map { key } = field.cardinality {
            if !key.is_valid_map_key() {
                return Err(SchemaError::InvalidField {
                    message: spec.full_name.clone(),
                    field: field.name.clone(),
                    detail: format!("{key} cannot be a map key"),
                });
            }
        }
        let ty = resolve_type(&spec.full_name, &field.type_name, messages, enums).ok_or_else(
            || SchemaError::UnknownType {
                message: spec.full_name.clone(),
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            },
        )?;
        if field.default.is_some()
            && (field.cardinality != Cardinality::Singular || matches!(ty, FieldType::Message(_)))
        {
            return Err(SchemaError::InvalidField {
                message: spec.full_name.clone(),
                field: field.name.clone(),
                detail: "only singular scalar and enum fields may declare a default".to_string(),
            });
        }
        fields.push(FieldDescriptor {
            name: field.name.clone(),
            number: field.number,
            ty,
            cardinality: field.cardinality.clone(),
            default: field.default.clone(),
        });
    }
    Ok(fields)
}

/// Resolve a type reference the way protobuf does: a leading `.` is
/// absolute, otherwise search from the innermost enclosing scope outwards.
pub(crate) fn resolve_type(
    scope: &str,
    type_name: &str,
    messages: &FxHashSet<String>,
    enums: &FxHashSet<String>,
) -> Option<FieldType> {
    if let Some(kind) = ScalarKind::parse(type_name) {
        return Some(FieldType::Scalar(kind));
    }
    let lookup = |candidate: &str| {
        if messages.contains(candidate) {
            Some(FieldType::Message(Arc::from(candidate)))
        } else if enums.contains(candidate) {
            Some(FieldType::Enum(Arc::from(candidate)))
        } else {
            None
        }
    };
    if let Some(absolute) = type_name.strip_prefix('.') {
        return lookup(absolute);
    }
    let mut scope = scope;
    loop {
        let candidate = if scope.is_empty() {
            type_name.to_string()
        } else {
            format!("{scope}.{type_name}")
        };
        if let Some(found) = lookup(&candidate) {
            return Some(found);
        }
        if scope.is_empty() {
            return None;
        }
        scope = scope.rfind('.').map_or("", |i| &scope[..i]);
    }
}
