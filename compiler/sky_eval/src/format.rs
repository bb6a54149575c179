//! String formatting: the `%` operator and `str.format`.

use std::fmt::Write;

use crate::errors::{key_not_found, EvalError};
use crate::value::Value;
use crate::Arguments;

/// `template % args`.
///
/// A tuple supplies positional operands; a dict supplies `%(name)s`
/// operands; anything else is the single operand.
pub fn percent_format(template: &str, args: &Value) -> Result<String, EvalError> {
    let positional: Vec<Value> = match args {
        Value::Tuple(items) => items.to_vec(),
        Value::Dict(_) => Vec::new(),
        other => vec![other.clone()],
    };
    let mut next = positional.into_iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let operand = if chars.peek() == Some(&'(') {
            chars.next();
            let key: String = chars.by_ref().take_while(|&c| c != ')').collect();
            let Value::Dict(dict) = args else {
                return Err(EvalError::new("format requires a mapping"));
            };
            Some(
                dict.get(&Value::from(key.as_str()))?
                    .ok_or_else(|| key_not_found(&Value::from(key).repr()))?,
            )
        } else {
            None
        };
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            precision = digits.parse::<usize>().ok();
        }
        let Some(verb) = chars.next() else {
            return Err(EvalError::new("incomplete format"));
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let value = match operand {
            Some(value) => value,
            None => next
                .next()
                .ok_or_else(|| EvalError::new("not enough arguments for format string"))?,
        };
        format_verb(&mut out, verb, &value, precision)?;
    }
    if next.next().is_some() {
        return Err(EvalError::new("too many arguments for format string"));
    }
    Ok(out)
}

fn format_verb(
    out: &mut String,
    verb: char,
    value: &Value,
    precision: Option<usize>,
) -> Result<(), EvalError> {
    #[allow(clippy::cast_possible_truncation)]
    let as_int = |value: &Value| match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) => Ok(f.trunc() as i64),
        other => Err(EvalError::new(format!(
            "%{verb} format requires integer: {}",
            other.type_name()
        ))),
    };
    match verb {
        's' => out.push_str(&value.to_str()),
        'r' => out.push_str(&value.repr()),
        'd' | 'i' => {
            let _ = write!(out, "{}", as_int(value)?);
        }
        'x' => {
            let n = as_int(value)?;
            let _ = if n < 0 { write!(out, "-{:x}", n.unsigned_abs()) } else { write!(out, "{n:x}") };
        }
        'X' => {
            let n = as_int(value)?;
            let _ = if n < 0 { write!(out, "-{:X}", n.unsigned_abs()) } else { write!(out, "{n:X}") };
        }
        'o' => {
            let n = as_int(value)?;
            let _ = if n < 0 { write!(out, "-{:o}", n.unsigned_abs()) } else { write!(out, "{n:o}") };
        }
        'f' | 'F' | 'e' | 'g' => {
            let f = value.as_f64().ok_or_else(|| {
                EvalError::new(format!(
                    "%{verb} format requires float: {}",
                    value.type_name()
                ))
            })?;
            let precision = precision.unwrap_or(6);
            let _ = match verb {
                'e' => write!(out, "{f:.precision$e}"),
                'g' => write!(out, "{f}"),
                _ => write!(out, "{f:.precision$}"),
            };
        }
        other => {
            return Err(EvalError::new(format!(
                "unsupported format character '{other}'"
            )))
        }
    }
    Ok(())
}

/// `template.format(*args, **kwargs)`.
pub fn format_method(template: &str, args: &Arguments) -> Result<String, EvalError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut auto_index = 0usize;
    let mut manual = false;
    let mut auto = false;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(EvalError::new("single '}' encountered in format string")),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(EvalError::new("unmatched '{' in format string"));
                        }
                    }
                }
                let (name, conversion) = match field.split_once('!') {
                    Some((name, conv)) => (name.to_string(), Some(conv.to_string())),
                    None => (field, None),
                };
                let value = if name.is_empty() {
                    if manual {
                        return Err(EvalError::new(
                            "cannot switch from manual field specification to automatic field numbering",
                        ));
                    }
                    auto = true;
                    let value = positional_arg(args, auto_index)?;
                    auto_index += 1;
                    value
                } else if let Ok(index) = name.parse::<usize>() {
                    if auto {
                        return Err(EvalError::new(
                            "cannot switch from automatic field numbering to manual field specification",
                        ));
                    }
                    manual = true;
                    positional_arg(args, index)?
                } else {
                    args.named
                        .iter()
                        .find(|(k, _)| **k == *name)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| EvalError::new(format!("keyword {name} not found")))?
                };
                match conversion.as_deref() {
                    None | Some("s") => out.push_str(&value.to_str()),
                    Some("r") => out.push_str(&value.repr()),
                    Some(other) => {
                        return Err(EvalError::new(format!(
                            "unknown conversion {other:?}"
                        )))
                    }
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

fn positional_arg(args: &Arguments, index: usize) -> Result<Value, EvalError> {
    args.positional
        .get(index)
        .cloned()
        .ok_or_else(|| EvalError::new(format!("tuple index out of range ({index})")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn percent_verbs() {
        let args = Value::tuple(vec![Value::str("x"), Value::Int(255), Value::Float(1.5)]);
        assert_eq!(
            percent_format("%s=%x (%.2f) 100%%", &args).unwrap(),
            "x=ff (1.50) 100%"
        );
        assert_eq!(percent_format("%r", &Value::str("q")).unwrap(), "\"q\"");
    }

    #[test]
    fn percent_argument_count() {
        let err = percent_format("%s %s", &Value::Int(1)).unwrap_err();
        assert_eq!(err.message, "not enough arguments for format string");
        let err = percent_format("%s", &Value::tuple(vec![Value::Int(1), Value::Int(2)])).unwrap_err();
        assert_eq!(err.message, "too many arguments for format string");
    }

    #[test]
    fn format_fields() {
        let args = Arguments::new(
            vec![Value::str("a"), Value::Int(2)],
            vec![(Rc::from("name"), Value::str("n"))],
        );
        assert_eq!(
            format_method("{} {} {name!r} {{}}", &args).unwrap(),
            "a 2 \"n\" {}"
        );
        assert_eq!(format_method("{1}{0}", &args).unwrap(), "2a");
        assert!(format_method("{}{0}", &args).is_err());
    }
}
