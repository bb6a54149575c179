use crate::args::{arg, expect_str};
use crate::errors::fail;
use crate::value::Value;
use crate::Arguments;

/// `fail(*args, sep=" ")`: abort execution with the joined message.
///
/// The traceback is attached by the interpreter when the error leaves the
/// `fail` call frame.
pub fn fail_builtin() -> Value {
    Value::builtin("fail", |_, args| {
        let Arguments { positional, named } = args;
        let [sep] = Arguments::new(Vec::new(), named).bind("fail", ["sep?"])?;
        let sep = match arg(sep) {
            Value::None => " ".into(),
            other => expect_str("fail", "sep", &other)?,
        };
        let parts: Vec<String> = positional.iter().map(Value::to_str).collect();
        Err(fail(parts.join(&*sep)))
    })
}
