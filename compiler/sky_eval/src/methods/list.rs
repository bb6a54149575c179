use std::rc::Rc;

use super::method_name;
use crate::args::{arg, int_or};
use crate::errors::{index_out_of_range, EvalError};
use crate::exec::normalize_index;
use crate::value::{ListValue, Value};
use crate::{Arguments, EvalResult};

pub(super) const METHODS: &[&str] = &["append", "clear", "extend", "index", "insert", "pop", "remove"];

pub(super) fn call(list: &Rc<ListValue>, qualified: &str, args: Arguments) -> EvalResult {
    let f = qualified;
    match method_name(qualified) {
        "append" => {
            let [x] = args.bind(f, ["x"])?;
            list.push(arg(x))?;
            Ok(Value::None)
        }
        "clear" => {
            args.no_args(f)?;
            list.clear()?;
            Ok(Value::None)
        }
        "extend" => {
            let [items] = args.bind(f, ["iterable"])?;
            list.extend(arg(items).iterate()?)?;
            Ok(Value::None)
        }
        "index" => {
            let [x] = args.bind(f, ["x"])?;
            let x = arg(x);
            for (i, item) in list.snapshot().iter().enumerate() {
                if item.equals(&x)? {
                    return Ok(Value::Int(i64::try_from(i).unwrap_or(i64::MAX)));
                }
            }
            Err(EvalError::new(format!("{f}: value not in list")))
        }
        "insert" => {
            let [index, x] = args.bind(f, ["index", "x"])?;
            let index = int_or(f, "index", index, 0)?;
            let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
            let at = if index < 0 { (index + len).max(0) } else { index };
            list.insert(usize::try_from(at).unwrap_or(usize::MAX), arg(x))?;
            Ok(Value::None)
        }
        "pop" => {
            let [index] = args.bind(f, ["index?"])?;
            let index = int_or(f, "index", index, -1)?;
            let len = list.len();
            let slot = normalize_index(index, len).ok_or_else(|| index_out_of_range(index, len))?;
            list.remove_at(slot)
        }
        "remove" => {
            let [x] = args.bind(f, ["x"])?;
            let x = arg(x);
            let position = list
                .snapshot()
                .iter()
                .map(|item| item.equals(&x))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .position(|eq| eq);
            match position {
                Some(slot) => {
                    list.remove_at(slot)?;
                    Ok(Value::None)
                }
                None => Err(EvalError::new(format!("{f}: element not found"))),
            }
        }
        other => Err(EvalError::new(format!("list has no .{other} method"))),
    }
}
