//! The object passed to `main(ctx)` and to `test_*(ctx)`.

use std::any::Any;

use sky_eval::args::arg;
use sky_eval::errors::{fail, invalid_argument};
use sky_eval::{
    Arguments, DictValue, EvalError, EvalResult, ModuleValue, Namespace, NativeObject, Value,
};

/// `ctx.vars` and, for tests, `ctx.assert`.
pub struct ContextValue {
    vars: Value,
    assert: Option<Value>,
}

impl ContextValue {
    pub fn new(vars: &[(String, Value)]) -> Result<Self, EvalError> {
        let pairs = vars
            .iter()
            .map(|(name, value)| (Value::str(name), value.clone()))
            .collect();
        let vars = Value::dict(DictValue::from_pairs(pairs)?);
        vars.freeze();
        Ok(ContextValue { vars, assert: None })
    }

    #[must_use]
    pub fn with_assertions(mut self) -> Self {
        self.assert = Some(assert_module());
        self
    }
}

impl NativeObject for ContextValue {
    fn type_name(&self) -> String {
        "context".to_string()
    }

    fn repr(&self) -> String {
        "<context>".to_string()
    }

    fn get_attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(match name {
            "vars" => Some(self.vars.clone()),
            "assert" => self.assert.clone(),
            _ => None,
        })
    }

    fn attr_names(&self) -> Vec<String> {
        let mut names = vec!["vars".to_string()];
        if self.assert.is_some() {
            names.push("assert".to_string());
        }
        names
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `assert.eq`, `assert.ne`, `assert.true`, `assert.contains`.
///
/// Failures are `fail` errors so a test reports them with a traceback.
fn assert_module() -> Value {
    let mut members = Namespace::new();
    members.set(
        "eq",
        Value::builtin("assert.eq", |_, args| {
            let [a, b] = args.bind("assert.eq", ["a", "b"])?;
            let (a, b) = (arg(a), arg(b));
            if a.equals(&b)? {
                Ok(Value::None)
            } else {
                Err(fail(format!("assert.eq: {} != {}", a.repr(), b.repr())))
            }
        }),
    );
    members.set(
        "ne",
        Value::builtin("assert.ne", |_, args| {
            let [a, b] = args.bind("assert.ne", ["a", "b"])?;
            let (a, b) = (arg(a), arg(b));
            if a.equals(&b)? {
                Err(fail(format!("assert.ne: {} == {}", a.repr(), b.repr())))
            } else {
                Ok(Value::None)
            }
        }),
    );
    members.set(
        "true",
        Value::builtin("assert.true", |_, args| {
            let [cond, msg] = args.bind("assert.true", ["cond", "msg?"])?;
            let cond = arg(cond);
            if cond.truthy() {
                return Ok(Value::None);
            }
            Err(fail(match msg {
                Some(msg) => msg.to_string(),
                None => format!("assert.true: {} is not true", cond.repr()),
            }))
        }),
    );
    members.set("contains", Value::builtin("assert.contains", assert_contains));
    members.freeze();
    Value::native(ModuleValue::new("assert", members))
}

fn assert_contains(_: &mut sky_eval::Interpreter, args: Arguments) -> EvalResult {
    let [container, item] = args.bind("assert.contains", ["container", "item"])?;
    let (container, item) = (arg(container), arg(item));
    let found = match &container {
        Value::List(list) => contains(&list.snapshot(), &item)?,
        Value::Tuple(items) => contains(items, &item)?,
        Value::Dict(dict) => dict.contains_key(&item)?,
        Value::Str(text) => match &item {
            Value::Str(needle) => text.contains(&**needle),
            other => {
                return Err(invalid_argument(
                    "assert.contains",
                    "item",
                    &other.type_name(),
                    "string",
                ))
            }
        },
        other => {
            return Err(invalid_argument(
                "assert.contains",
                "container",
                &other.type_name(),
                "list, tuple, dict, or string",
            ))
        }
    };
    if found {
        Ok(Value::None)
    } else {
        Err(fail(format!(
            "assert.contains: {} does not contain {}",
            container.repr(),
            item.repr()
        )))
    }
}

fn contains(items: &[Value], item: &Value) -> Result<bool, EvalError> {
    for candidate in items {
        if candidate.equals(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}
