//! Schema documents: YAML or JSON descriptions of messages and enums.
//!
//! ```yaml
//! package: example.v1
//! messages:
//!   - name: Deployment
//!     fields:
//!       - { name: name, number: 1, type: string }
//!       - { name: labels, number: 3, type: map, key_type: string, value_type: string }
//!     messages: []   # nested messages, named Deployment.<name>
//! enums:
//!   - name: Policy
//!     values: [{ name: ALWAYS, number: 0 }]
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::descriptor::{DefaultValue, EnumValueDescriptor, ScalarKind};
use crate::registry::{FieldSpec, MessageSpec};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("type {0} is declared more than once")]
    DuplicateType(String),

    #[error("{message}: field {field} is declared more than once")]
    DuplicateField { message: String, field: String },

    #[error("{message}.{field}: unknown type {type_name:?}")]
    UnknownType {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("{message}.{field}: {detail}")]
    InvalidField {
        message: String,
        field: String,
        detail: String,
    },

    #[error("enum {0} declares no values")]
    EmptyEnum(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SchemaDocument {
    #[serde(default)]
    package: String,
    #[serde(default)]
    messages: Vec<MessageDoc>,
    #[serde(default)]
    enums: Vec<EnumDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageDoc {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDoc>,
    #[serde(default)]
    messages: Vec<MessageDoc>,
    #[serde(default)]
    enums: Vec<EnumDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDoc {
    name: String,
    number: u32,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    key_type: Option<String>,
    #[serde(default)]
    value_type: Option<String>,
    #[serde(default)]
    default: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumDoc {
    name: String,
    values: Vec<EnumValueDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumValueDoc {
    name: String,
    number: i32,
}

pub(crate) fn parse_yaml(text: &str) -> Result<SchemaDocument, SchemaError> {
    Ok(serde_yaml::from_str(text)?)
}

pub(crate) fn parse_json(text: &str) -> Result<SchemaDocument, SchemaError> {
    Ok(serde_json::from_str(text)?)
}

/// Append the document's declarations, with fully qualified names.
pub(crate) fn flatten(
    doc: &SchemaDocument,
    messages: &mut Vec<MessageSpec>,
    enums: &mut Vec<(String, Vec<EnumValueDescriptor>)>,
) -> Result<(), SchemaError> {
    for message in &doc.messages {
        flatten_message(&doc.package, message, messages, enums)?;
    }
    for e in &doc.enums {
        enums.push(enum_decl(&doc.package, e));
    }
    Ok(())
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn flatten_message(
    scope: &str,
    doc: &MessageDoc,
    messages: &mut Vec<MessageSpec>,
    enums: &mut Vec<(String, Vec<EnumValueDescriptor>)>,
) -> Result<(), SchemaError> {
    let full_name = qualify(scope, &doc.name);
    let mut spec = MessageSpec::new(&full_name);
    for field in &doc.fields {
        spec = spec.field(field_spec(&full_name, field)?);
    }
    messages.push(spec);
    for nested in &doc.messages {
        flatten_message(&full_name, nested, messages, enums)?;
    }
    for e in &doc.enums {
        enums.push(enum_decl(&full_name, e));
    }
    Ok(())
}

fn enum_decl(scope: &str, doc: &EnumDoc) -> (String, Vec<EnumValueDescriptor>) {
    let values = doc
        .values
        .iter()
        .map(|v| EnumValueDescriptor {
            name: v.name.clone(),
            number: v.number,
        })
        .collect();
    (qualify(scope, &doc.name), values)
}

fn field_spec(message: &str, doc: &FieldDoc) -> Result<FieldSpec, SchemaError> {
    let invalid = |detail: String| SchemaError::InvalidField {
        message: message.to_string(),
        field: doc.name.clone(),
        detail,
    };

    let mut spec = if doc.type_name == "map" {
        let (Some(key), Some(value)) = (&doc.key_type, &doc.value_type) else {
            return Err(invalid("map fields need key_type and value_type".to_string()));
        };
        let key = ScalarKind::parse(key)
            .ok_or_else(|| invalid(format!("map key type {key:?} is not a scalar kind")))?;
        FieldSpec::new(&doc.name, doc.number, value).map(key)
    } else {
        if doc.key_type.is_some() || doc.value_type.is_some() {
            return Err(invalid(
                "key_type and value_type are only valid for map fields".to_string(),
            ));
        }
        FieldSpec::new(&doc.name, doc.number, &doc.type_name)
    };

    match doc.label.as_deref() {
        None | Some("optional") => {}
        Some("repeated") if doc.type_name != "map" => spec = spec.repeated(),
        Some(other) => return Err(invalid(format!("invalid label {other:?}"))),
    }

    if let Some(default) = &doc.default {
        spec = spec.default_value(default_value(default).ok_or_else(|| {
            invalid(format!("unsupported default {default}"))
        })?);
    }
    Ok(spec)
}

fn default_value(value: &serde_json::Value) -> Option<DefaultValue> {
    match value {
        serde_json::Value::Bool(b) => Some(DefaultValue::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(DefaultValue::Int)
            .or_else(|| n.as_f64().map(DefaultValue::Float)),
        serde_json::Value::String(s) => Some(DefaultValue::Str(s.clone())),
        _ => None,
    }
}
