//! Attribute access and builtin methods of strings, lists, and dicts.
//!
//! `x.name` on a builtin type yields a bound method: a builtin function
//! whose closure holds the receiver. Method names are kept in sorted tables
//! so `dir(x)` and attribute checks share one source.

mod dict;
mod list;
mod string;

pub(crate) use dict::update_pairs;

use std::rc::Rc;

use crate::errors::no_such_attribute;
use crate::value::Value;
use crate::{Arguments, EvalResult};

/// `receiver.name`.
pub fn get_attr(receiver: &Value, name: &str) -> EvalResult {
    let bound = match receiver {
        Value::Str(s) if string::METHODS.binary_search(&name).is_ok() => {
            let s = Rc::clone(s);
            bind(receiver, name, move |method, args| string::call(&s, method, args))
        }
        Value::List(l) if list::METHODS.binary_search(&name).is_ok() => {
            let l = Rc::clone(l);
            bind(receiver, name, move |method, args| list::call(&l, method, args))
        }
        Value::Dict(d) if dict::METHODS.binary_search(&name).is_ok() => {
            let d = Rc::clone(d);
            bind(receiver, name, move |method, args| dict::call(&d, method, args))
        }
        Value::Native(object) => object.get_attr(name)?,
        _ => None,
    };
    bound.ok_or_else(|| no_such_attribute(&receiver.type_name(), name))
}

/// Attribute names of a value, as listed by `dir(x)`.
pub fn attr_names(value: &Value) -> Vec<String> {
    let names: &[&str] = match value {
        Value::Str(_) => string::METHODS,
        Value::List(_) => list::METHODS,
        Value::Dict(_) => dict::METHODS,
        Value::Native(object) => {
            let mut names = object.attr_names();
            names.sort();
            return names;
        }
        _ => &[],
    };
    names.iter().map(|n| (*n).to_string()).collect()
}

fn bind(
    receiver: &Value,
    name: &str,
    call: impl Fn(&str, Arguments) -> EvalResult + 'static,
) -> Option<Value> {
    let qualified = format!("{}.{name}", receiver.type_name());
    let method = qualified.clone();
    Some(Value::builtin(&qualified, move |_, args| call(&method, args)))
}

/// Name of the method part of a qualified `type.method` name.
fn method_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
