use std::fmt::Write;

use super::Value;

impl Value {
    /// Source-like rendering, as produced by `repr(x)`.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        write_repr(&mut out, self, &mut Vec::new());
        out
    }

    /// Rendering produced by `str(x)`.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.repr(),
        }
    }
}

/// Container identity, used to cut cycles short.
fn identity(value: &Value) -> Option<*const ()> {
    match value {
        Value::List(l) => Some(std::rc::Rc::as_ptr(l).cast()),
        Value::Dict(d) => Some(std::rc::Rc::as_ptr(d).cast()),
        _ => None,
    }
}

fn write_repr(out: &mut String, value: &Value, path: &mut Vec<*const ()>) {
    if let Some(id) = identity(value) {
        if path.contains(&id) {
            out.push_str(if matches!(value, Value::List(_)) {
                "[...]"
            } else {
                "{...}"
            });
            return;
        }
        path.push(id);
    }
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Str(s) => quote_into(out, s),
        Value::List(l) => {
            out.push('[');
            write_items(out, &l.snapshot(), path);
            out.push(']');
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(out, items, path);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Dict(d) => {
            out.push('{');
            for (i, (key, val)) in d.items().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(out, key, path);
                out.push_str(": ");
                write_repr(out, val, path);
            }
            out.push('}');
        }
        Value::Function(f) => {
            let _ = write!(out, "<function {}>", f.name);
        }
        Value::Builtin(b) => {
            let _ = write!(out, "<built-in function {}>", b.name());
        }
        Value::Native(n) => out.push_str(&n.repr()),
    }
    if identity(value).is_some() {
        path.pop();
    }
}

fn write_items(out: &mut String, items: &[Value], path: &mut Vec<*const ()>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(out, item, path);
    }
}

/// Double-quoted string literal with escapes.
pub(crate) fn quote_into(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Floats always show a fractional part or an exponent: `1.0`, `1e+20`.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "+inf" } else { "-inf" }.to_string();
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{f:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}
