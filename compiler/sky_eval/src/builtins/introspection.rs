use crate::args::{arg, expect_str};
use crate::methods::{attr_names, get_attr};
use crate::value::Value;
use crate::{Arguments, EvalResult, Interpreter};

pub(super) fn dir(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x] = args.bind("dir", ["x"])?;
    Ok(Value::list(attr_names(&arg(x)).into_iter().map(Value::from).collect()))
}

pub(super) fn getattr(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x, name, default] = args.bind("getattr", ["x", "name", "default?"])?;
    let name = expect_str("getattr", "name", &arg(name))?;
    match (get_attr(&arg(x), &name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default),
        (Err(err), None) => Err(err),
    }
}

pub(super) fn hasattr(_: &mut Interpreter, args: Arguments) -> EvalResult {
    let [x, name] = args.bind("hasattr", ["x", "name"])?;
    let name = expect_str("hasattr", "name", &arg(name))?;
    Ok(Value::Bool(get_attr(&arg(x), &name).is_ok()))
}

/// `print(*args, sep=" ")`: one line to the print handler, prefixed with
/// the position of the `print` call.
pub(super) fn print(interp: &mut Interpreter, args: Arguments) -> EvalResult {
    let Arguments { positional, named } = args;
    let [sep] = Arguments::new(Vec::new(), named).bind("print", ["sep?"])?;
    let sep = match arg(sep) {
        Value::None => " ".to_string(),
        other => expect_str("print", "sep", &other)?.to_string(),
    };
    let message = positional
        .iter()
        .map(Value::to_str)
        .collect::<Vec<_>>()
        .join(&sep);
    let line = match interp.current_call_site() {
        Some(position) => format!("[{position}] {message}"),
        None => message,
    };
    interp.print_handler().println(&line);
    Ok(Value::None)
}
