use std::cmp::Ordering;

use crate::args::{arg, bool_or, int_or};
use crate::errors::{invalid_argument, EvalError};
use crate::value::Value;
use crate::{Arguments, EvalResult, Interpreter};

/// Largest list `range` will materialize.
const MAX_RANGE_LEN: i64 = 1 << 24;

pub(super) fn len(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("len", ["x"])?;
    let x = arg(x);
    x.len()
        .map(|n| Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        .ok_or_else(|| EvalError::new(format!("len: value of type {} has no len", x.type_name())))
}

pub(super) fn all(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("all", ["iterable"])?;
    Ok(Value::Bool(arg(x).iterate()?.iter().all(Value::truthy)))
}

pub(super) fn any(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("any", ["iterable"])?;
    Ok(Value::Bool(arg(x).iterate()?.iter().any(Value::truthy)))
}

/// `range(stop)` / `range(start, stop, step?)`, materialized as a list.
pub(super) fn range(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [a, b, step] = args.bind("range", ["start_or_stop", "stop?", "step?"])?;
    let a = int_or("range", "start_or_stop", a, 0)?;
    let (start, stop) = match b {
        Some(b) => (a, int_or("range", "stop", Some(b), 0)?),
        None => (0, a),
    };
    let step = int_or("range", "step", step, 1)?;
    if step == 0 {
        return Err(EvalError::new("range: step argument must not be zero"));
    }
    let span = if step > 0 {
        stop.saturating_sub(start)
    } else {
        start.saturating_sub(stop)
    };
    let count = if span <= 0 {
        0
    } else {
        (span - 1) / step.saturating_abs() + 1
    };
    if count > MAX_RANGE_LEN {
        return Err(EvalError::new(format!("range: result has too many elements ({count})")));
    }
    let mut items = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
    let mut i = start;
    for _ in 0..count {
        items.push(Value::Int(i));
        i = i.saturating_add(step);
    }
    Ok(Value::list(items))
}

pub(super) fn enumerate(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x, start] = args.bind("enumerate", ["iterable", "start?"])?;
    let start = int_or("enumerate", "start", start, 0)?;
    let items = arg(x).iterate()?;
    let mut out = Vec::with_capacity(items.len());
    let mut i = start;
    for item in items {
        out.push(Value::tuple(vec![Value::Int(i), item]));
        i = i.saturating_add(1);
    }
    Ok(Value::list(out))
}

pub(super) fn zip(_: &mut Interpreter, args: Arguments) -> EvalResult {
    if !args.named.is_empty() {
        return Err(EvalError::new("zip: unexpected keyword arguments"));
    }
    let columns = args
        .positional
        .iter()
        .map(Value::iterate)
        .collect::<Result<Vec<_>, _>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    Ok(Value::list(
        (0..rows)
            .map(|i| Value::tuple(columns.iter().map(|c| c[i].clone()).collect()))
            .collect(),
    ))
}

pub(super) fn reversed(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("reversed", ["sequence"])?;
    let mut items = arg(x).iterate()?;
    items.reverse();
    Ok(Value::list(items))
}

/// `sorted(iterable, key=None, reverse=False)`: a stable sort.
pub(super) fn sorted(interp: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x, key, reverse] = args.bind("sorted", ["iterable", "key?", "reverse?"])?;
    let items = arg(x).iterate()?;
    let reverse = bool_or("sorted", "reverse", reverse, false)?;
    let keys = sort_keys(interp, "sorted", items.clone(), key)?;

    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut failure = None;
    order.sort_by(|&a, &b| match keys[a].compare(&keys[b]) {
        Ok(ordering) => ordering,
        Err(err) => {
            if failure.is_none() {
                failure = Some(err);
            }
            Ordering::Equal
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }
    if reverse {
        // Reverse while keeping equal elements in their original order.
        order.reverse();
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && keys[order[start]].equals(&keys[order[end]])? {
                end += 1;
            }
            order[start..end].reverse();
            start = end;
        }
    }
    Ok(Value::list(order.into_iter().map(|i| items[i].clone()).collect()))
}

fn sort_keys(
    interp: &mut Interpreter,
    function: &str,
    items: Vec<Value>,
    key: Option<Value>,
) -> Result<Vec<Value>, EvalError> {
    match key {
        None | Some(Value::None) => Ok(items),
        Some(key) if key.is_callable() => items
            .into_iter()
            .map(|item| interp.call_value(&key, Arguments::positional(vec![item]), None))
            .collect(),
        Some(other) => Err(invalid_argument(function, "key", &other.type_name(), "function")),
    }
}

pub(super) fn min(interp: &mut Interpreter, args: Arguments) -> EvalResult {
    extremum(interp, "min", args, Ordering::Less)
}

pub(super) fn max(interp: &mut Interpreter, args: Arguments) -> EvalResult {
    extremum(interp, "max", args, Ordering::Greater)
}

fn extremum(interp: &mut Interpreter, function: &str, args: Arguments, want: Ordering) -> EvalResult {
    let Arguments { positional, named } = args;
    let [key] = Arguments::new(Vec::new(), named).bind(function, ["key?"])?;
    let items = match <[Value; 1]>::try_from(positional) {
        Ok([single]) => single.iterate()?,
        Err(many) => many,
    };
    if items.is_empty() {
        return Err(EvalError::new(format!("{function}: argument is an empty sequence")));
    }
    let keys = sort_keys(interp, function, items.clone(), key)?;
    let mut best = 0;
    for i in 1..items.len() {
        if keys[i].compare(&keys[best])? == want {
            best = i;
        }
    }
    Ok(items[best].clone())
}
