use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::test_support::{eval, eval_err, eval_str};

#[test]
fn marshal_keeps_insertion_order_and_stringifies_int_keys() {
    assert_eq!(
        eval_str(r#"json.marshal({"a": 5, 13: 2, "k": {"k2": "v"}})"#),
        r#"{"a":5,"13":2,"k":{"k2":"v"}}"#
    );
}

#[test]
fn marshal_scalars_and_sequences() {
    assert_eq!(
        eval_str(r#"json.marshal([None, True, 1, 2.5, "s", (1, 2)])"#),
        r#"[null,true,1,2.5,"s",[1,2]]"#
    );
    assert_eq!(
        eval_str(r#"json.marshal(struct(b = 1, a = [2]))"#),
        r#"{"a":[2],"b":1}"#
    );
}

#[test]
fn marshal_rejects_unsupported_values() {
    assert_eq!(
        eval_err("json.marshal({True: 1})"),
        "json.marshal: unsupported dict key type bool"
    );
    assert_eq!(
        eval_err("json.marshal(len)"),
        "json.marshal: cannot marshal builtin_function_or_method value"
    );
}

#[test]
fn marshal_rejects_keys_that_collide_as_strings() {
    assert_eq!(
        eval_err(r#"json.marshal({13: 1, "13": 2})"#),
        "json.marshal: duplicate key \"13\" in dict"
    );
    assert_eq!(
        eval_err(r#"json.marshal([{"x": {"7": 1, 7: 1}}])"#),
        "json.marshal: duplicate key \"7\" in dict"
    );
}

#[test]
fn marshal_detects_cycles() {
    let err = eval_err("[json.marshal(l) for l in [[]] if l.append(l) == None][0]");
    assert_eq!(err, "json.marshal: value is nested too deeply (or cyclic)");
}

#[test]
fn unmarshal_builds_values() {
    assert_eq!(
        eval(r#"json.unmarshal('{"b": [1, 2.5, null], "a": {"t": true}}')"#),
        r#"{"b": [1, 2.5, None], "a": {"t": True}}"#
    );
    assert!(eval_err(r#"json.unmarshal("{")"#).starts_with("json.unmarshal: EOF while parsing"));
    assert_eq!(
        eval_err("json.unmarshal(1)"),
        "json.unmarshal: for parameter s: got int, want string"
    );
}

proptest! {
    #[test]
    fn int_lists_survive_marshal_and_unmarshal(items in proptest::collection::vec(-1_000_000_000_000i64..1_000_000_000_000, 0..8)) {
        let literal = format!(
            "[{}]",
            items.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
        );
        let expected = eval(&literal);
        prop_assert_eq!(eval(&format!("json.unmarshal(json.marshal({literal}))")), expected);
    }
}
