use std::fmt::Write;

use sky_eval::Value;

use super::json::map_key;
use crate::descriptor::{Cardinality, FieldType, ScalarKind};
use crate::record::TypedRecord;

/// Text-format rendering of a record's set fields.
pub(crate) fn encode(record: &TypedRecord, compact: bool) -> String {
    let mut out = String::new();
    let mut writer = TextWriter {
        out: &mut out,
        compact,
        depth: 0,
        first: true,
    };
    writer.record(record);
    out
}

struct TextWriter<'a> {
    out: &'a mut String,
    compact: bool,
    depth: usize,
    first: bool,
}

impl TextWriter<'_> {
    fn record(&mut self, record: &TypedRecord) {
        for (field, value) in record.set_fields() {
            match (&field.cardinality, &value) {
                (Cardinality::Singular, v) => self.field(&field.name, &field.ty, v),
                (Cardinality::Repeated, Value::List(list)) => {
                    for item in list.snapshot() {
                        self.field(&field.name, &field.ty, &item);
                    }
                }
                (Cardinality::Map { key }, Value::Dict(dict)) => {
                    for (k, v) in dict.items() {
                        self.open(&field.name);
                        self.field("key", &FieldType::Scalar(*key), &k);
                        self.field("value", &field.ty, &v);
                        self.close();
                    }
                }
                _ => {}
            }
        }
    }

    fn separator(&mut self) {
        if self.compact {
            if !self.first {
                self.out.push(' ');
            }
        } else {
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        }
        self.first = false;
    }

    fn end_line(&mut self) {
        if !self.compact {
            self.out.push('\n');
        }
    }

    fn open(&mut self, name: &str) {
        self.separator();
        self.out.push_str(name);
        self.out.push_str(if self.compact { ":{" } else { ": {" });
        self.end_line();
        self.depth += 1;
        self.first = true;
    }

    fn close(&mut self) {
        self.depth -= 1;
        if !self.compact {
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        }
        self.out.push('}');
        self.end_line();
        self.first = false;
    }

    fn field(&mut self, name: &str, ty: &FieldType, value: &Value) {
        if let Some(nested) = value.downcast_native::<TypedRecord>() {
            self.open(name);
            self.record(nested);
            self.close();
            return;
        }
        self.separator();
        self.out.push_str(name);
        self.out.push_str(if self.compact { ":" } else { ": " });
        match (ty, value) {
            (FieldType::Enum(_), Value::Str(s)) => self.out.push_str(s),
            (FieldType::Scalar(ScalarKind::Bool), Value::Bool(b)) => {
                let _ = write!(self.out, "{b}");
            }
            (_, Value::Str(_) | Value::Int(_) | Value::Float(_)) => {
                self.out.push_str(&value.repr());
            }
            (_, other) => self.out.push_str(&map_key(other)),
        }
        self.end_line();
    }
}
