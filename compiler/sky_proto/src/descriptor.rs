//! Message and enum descriptors.
//!
//! Descriptors are immutable once built and shared through `Arc`, so a
//! registry can be handed to every load without copying.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Scalar field kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
}

impl ScalarKind {
    const ALL: [ScalarKind; 14] = [
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Uint32,
        ScalarKind::Uint64,
        ScalarKind::Sint32,
        ScalarKind::Sint64,
        ScalarKind::Fixed32,
        ScalarKind::Fixed64,
        ScalarKind::Sfixed32,
        ScalarKind::Sfixed64,
        ScalarKind::Bool,
        ScalarKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
        }
    }

    pub fn parse(name: &str) -> Option<ScalarKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Inclusive range accepted for integer kinds.
    ///
    /// Unsigned 64-bit kinds are limited to the non-negative `i64` range,
    /// which is what script integers can hold.
    pub fn int_range(self) -> Option<(i64, i64)> {
        match self {
            ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => {
                Some((i64::from(i32::MIN), i64::from(i32::MAX)))
            }
            ScalarKind::Uint32 | ScalarKind::Fixed32 => Some((0, i64::from(u32::MAX))),
            ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => {
                Some((i64::MIN, i64::MAX))
            }
            ScalarKind::Uint64 | ScalarKind::Fixed64 => Some((0, i64::MAX)),
            _ => None,
        }
    }

    /// 64-bit integers are rendered as strings in canonical JSON.
    pub fn is_64_bit_int(self) -> bool {
        matches!(
            self,
            ScalarKind::Int64
                | ScalarKind::Uint64
                | ScalarKind::Sint64
                | ScalarKind::Fixed64
                | ScalarKind::Sfixed64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::Double | ScalarKind::Float)
    }

    /// Kinds allowed as map keys.
    pub fn is_valid_map_key(self) -> bool {
        !self.is_float()
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type of a field. Named types carry fully qualified names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Enum(Arc<str>),
    Message(Arc<str>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => write!(f, "{kind}"),
            FieldType::Enum(name) | FieldType::Message(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
    /// `map<key, ty>`.
    Map { key: ScalarKind },
}

/// Declared default for a singular scalar or enum field.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub ty: FieldType,
    pub cardinality: Cardinality,
    pub default: Option<DefaultValue>,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    /// Human-readable type, e.g. `map<string, int32>` or `repeated string`.
    pub fn type_label(&self) -> String {
        match &self.cardinality {
            Cardinality::Singular => self.ty.to_string(),
            Cardinality::Repeated => format!("repeated {}", self.ty),
            Cardinality::Map { key } => format!("map<{key}, {}>", self.ty),
        }
    }
}

#[derive(Debug)]
pub struct MessageDescriptor {
    full_name: Arc<str>,
    fields: Vec<FieldDescriptor>,
    index: FxHashMap<String, usize>,
}

impl MessageDescriptor {
    /// Fields keep their declaration order.
    pub fn new(full_name: &str, fields: Vec<FieldDescriptor>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        MessageDescriptor {
            full_name: Arc::from(full_name),
            fields,
            index,
        }
    }

    pub fn full_name(&self) -> &Arc<str> {
        &self.full_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field by name, with its position.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.index.get(name).map(|&i| (i, &self.fields[i]))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

#[derive(Debug)]
pub struct EnumDescriptor {
    full_name: Arc<str>,
    values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    pub fn new(full_name: &str, values: Vec<EnumValueDescriptor>) -> Self {
        EnumDescriptor {
            full_name: Arc::from(full_name),
            values,
        }
    }

    pub fn full_name(&self) -> &Arc<str> {
        &self.full_name
    }

    pub fn values(&self) -> &[EnumValueDescriptor] {
        &self.values
    }

    pub fn by_name(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }

    pub fn by_number(&self, number: i64) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| i64::from(v.number) == number)
    }

    /// The zero value: number 0 if declared, else the first value.
    pub fn zero(&self) -> Option<&EnumValueDescriptor> {
        self.by_number(0).or_else(|| self.values.first())
    }
}
