//! The `proto` capability namespace.

use std::sync::Arc;

use sky_eval::args::{arg, bool_or, expect_str};
use sky_eval::errors::invalid_argument;
use sky_eval::{Arguments, EvalError, ModuleValue, Namespace, Value};

use crate::encode;
use crate::package::{MessageType, PackageValue};
use crate::record::TypedRecord;
use crate::registry::TypeRegistry;

/// Build the `proto` module value over `registry`.
pub fn proto_module(registry: Arc<dyn TypeRegistry>) -> Value {
    let mut members = Namespace::new();
    members.set(
        "package",
        Value::builtin("proto.package", move |_, args| {
            let [name] = args.bind("proto.package", ["name"])?;
            let name = expect_str("proto.package", "name", &arg(name))?;
            Ok(Value::native(PackageValue::new(&name, Arc::clone(&registry))))
        }),
    );
    members.set(
        "clear",
        Value::builtin("proto.clear", |_, args| {
            let msg = single_record("proto.clear", args)?;
            expect_record("proto.clear", "msg", &msg)?.clear()?;
            Ok(msg)
        }),
    );
    members.set(
        "clone",
        Value::builtin("proto.clone", |_, args| {
            let msg = single_record("proto.clone", args)?;
            let copy = expect_record("proto.clone", "msg", &msg)?.deep_clone()?;
            Ok(Value::native(copy))
        }),
    );
    members.set(
        "merge",
        Value::builtin("proto.merge", |_, args| {
            let [dst, src] = args.bind("proto.merge", ["dst", "src"])?;
            let (dst, src) = (arg(dst), arg(src));
            let into = expect_record("proto.merge", "dst", &dst)?;
            let from = expect_record("proto.merge", "src", &src)?;
            if into.full_name() != from.full_name() {
                return Err(EvalError::new(format!(
                    "proto.merge: cannot merge {} into {}",
                    from.full_name(),
                    into.full_name()
                )));
            }
            into.merge_from(from)?;
            Ok(dst)
        }),
    );
    members.set(
        "set_defaults",
        Value::builtin("proto.set_defaults", |_, args| {
            let msg = single_record("proto.set_defaults", args)?;
            expect_record("proto.set_defaults", "msg", &msg)?.set_defaults()?;
            Ok(msg)
        }),
    );
    members.set(
        "to_json",
        Value::builtin("proto.to_json", |_, args| {
            let [msg, compact] = args.bind("proto.to_json", ["msg", "compact?"])?;
            let msg = arg(msg);
            let record = expect_record("proto.to_json", "msg", &msg)?;
            let compact = bool_or("proto.to_json", "compact", compact, true)?;
            Ok(Value::from(encode::to_json(record, compact)?))
        }),
    );
    members.set(
        "to_text",
        Value::builtin("proto.to_text", |_, args| {
            let [msg, compact] = args.bind("proto.to_text", ["msg", "compact?"])?;
            let msg = arg(msg);
            let record = expect_record("proto.to_text", "msg", &msg)?;
            let compact = bool_or("proto.to_text", "compact", compact, true)?;
            Ok(Value::from(encode::to_text(record, compact)))
        }),
    );
    members.set(
        "to_yaml",
        Value::builtin("proto.to_yaml", |_, args| {
            let msg = single_record("proto.to_yaml", args)?;
            let record = expect_record("proto.to_yaml", "msg", &msg)?;
            Ok(Value::from(encode::to_yaml(record)?))
        }),
    );
    members.set(
        "from_json",
        Value::builtin("proto.from_json", |_, args| {
            decode_with("proto.from_json", args, encode::from_json)
        }),
    );
    members.set(
        "from_yaml",
        Value::builtin("proto.from_yaml", |_, args| {
            decode_with("proto.from_yaml", args, encode::from_yaml)
        }),
    );
    members.freeze();
    Value::native(ModuleValue::new("proto", members))
}

fn single_record(function: &str, args: Arguments) -> Result<Value, EvalError> {
    let [msg] = args.bind(function, ["msg"])?;
    Ok(arg(msg))
}

fn expect_record<'a>(
    function: &str,
    param: &str,
    value: &'a Value,
) -> Result<&'a TypedRecord, EvalError> {
    value
        .downcast_native::<TypedRecord>()
        .ok_or_else(|| invalid_argument(function, param, &value.type_name(), "proto.Message"))
}

type Decoder = fn(
    Arc<crate::descriptor::MessageDescriptor>,
    Arc<dyn TypeRegistry>,
    &str,
) -> Result<TypedRecord, EvalError>;

fn decode_with(function: &str, args: Arguments, decode: Decoder) -> sky_eval::EvalResult {
    let [ty, text] = args.bind(function, ["type", "text"])?;
    let ty = arg(ty);
    let message_type = ty.downcast_native::<MessageType>().ok_or_else(|| {
        invalid_argument(function, "type", &ty.type_name(), "proto.MessageType")
    })?;
    let text = expect_str(function, "text", &arg(text))?;
    let record = decode(
        Arc::clone(message_type.descriptor()),
        Arc::clone(message_type.registry()),
        &text,
    )
    .map_err(|e| EvalError::new(format!("{function}: {}", e.message)))?;
    Ok(Value::native(record))
}
