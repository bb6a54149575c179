#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;

#[test]
fn repr_of_scalars_and_containers() {
    let dict = DictValue::new();
    dict.insert(Value::str("k"), Value::Float(1.0)).unwrap();
    dict.insert(Value::Int(2), Value::None).unwrap();
    let value = Value::list(vec![
        Value::Bool(true),
        Value::str("a\"b\n"),
        Value::tuple(vec![Value::Int(1)]),
        Value::dict(dict),
    ]);
    assert_eq!(
        value.repr(),
        r#"[True, "a\"b\n", (1,), {"k": 1.0, 2: None}]"#
    );
    assert_eq!(Value::str("plain").to_str(), "plain");
}

#[test]
fn float_rendering() {
    assert_eq!(Value::Float(0.5).repr(), "0.5");
    assert_eq!(Value::Float(-3.0).repr(), "-3.0");
    assert_eq!(Value::Float(1e20).repr(), "1e+20");
    assert_eq!(Value::Float(f64::INFINITY).repr(), "+inf");
}

#[test]
fn self_referential_list_repr_terminates() {
    let list = Rc::new(ListValue::new(vec![Value::Int(1)]));
    list.push(Value::List(Rc::clone(&list))).unwrap();
    assert_eq!(Value::List(list).repr(), "[1, [...]]");
}

#[test]
fn int_and_float_keys_collide() {
    let dict = DictValue::new();
    dict.insert(Value::Int(1), Value::str("int")).unwrap();
    dict.insert(Value::Float(1.0), Value::str("float")).unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get(&Value::Int(1)).unwrap().unwrap().to_str(), "float");
}

#[test]
fn dict_keeps_insertion_order_after_removal() {
    let dict = DictValue::from_pairs(vec![
        (Value::str("a"), Value::Int(1)),
        (Value::str("b"), Value::Int(2)),
        (Value::str("c"), Value::Int(3)),
    ])
    .unwrap();
    dict.remove(&Value::str("a")).unwrap();
    dict.insert(Value::str("a"), Value::Int(4)).unwrap();
    let keys: Vec<String> = dict.keys().iter().map(Value::to_str).collect();
    assert_eq!(keys, vec!["b", "c", "a"]);
    assert_eq!(dict.get(&Value::str("c")).unwrap().unwrap().as_int(), Some(3));
}

#[test]
fn unhashable_keys_are_rejected() {
    let dict = DictValue::new();
    let err = dict.insert(Value::list(vec![]), Value::None).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::Unhashable {
            type_name: "list".to_string()
        }
    );
}

#[test]
fn freeze_is_deep() {
    let inner = Value::list(vec![Value::Int(1)]);
    let dict = DictValue::new();
    dict.insert(Value::str("xs"), inner.clone()).unwrap();
    let outer = Value::dict(dict);
    outer.freeze();

    let Value::List(list) = &inner else {
        unreachable!()
    };
    let err = list.push(Value::Int(2)).unwrap_err();
    assert_eq!(err.message, "cannot mutate frozen list");
    assert_eq!(list.len(), 1);
    assert!(outer.is_frozen());
}

#[test]
fn mixed_numeric_equality_and_order() {
    assert!(Value::Int(2).equals(&Value::Float(2.0)).unwrap());
    assert_eq!(
        Value::Int(1).compare(&Value::Float(1.5)).unwrap(),
        std::cmp::Ordering::Less
    );
    assert!(Value::str("a").compare(&Value::Int(1)).is_err());
}

#[test]
fn guarded_list_rejects_bad_elements() {
    struct OnlyInts;
    impl ValueGuard for OnlyInts {
        fn admit(&self, value: Value) -> Result<Value, crate::EvalError> {
            match value {
                Value::Int(_) => Ok(value),
                other => Err(crate::errors::type_mismatch("int", &other.type_name())),
            }
        }
        fn describe(&self) -> String {
            "int".to_string()
        }
    }

    let list = ListValue::guarded(Rc::new(OnlyInts), vec![Value::Int(1)]).unwrap();
    assert!(list.push(Value::str("x")).is_err());
    assert!(list
        .extend(vec![Value::Int(2), Value::str("y")])
        .is_err());
    assert_eq!(list.len(), 1);
}

#[test]
fn namespace_rebinding_keeps_position() {
    let mut ns = Namespace::new();
    ns.set("a", Value::Int(1));
    ns.set("b", Value::Int(2));
    ns.set("a", Value::Int(3));
    let names: Vec<&str> = ns.names().collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(ns.get("a").and_then(Value::as_int), Some(3));
}
