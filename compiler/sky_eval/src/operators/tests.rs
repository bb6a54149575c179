#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sky_ir::BinaryOp;

use super::*;
use crate::test_support::{eval, eval_err};

#[test]
fn string_and_sequence_operators() {
    assert_eq!(eval("\"ab\" + \"cd\""), "\"abcd\"");
    assert_eq!(eval("\"ab\" * 3"), "\"ababab\"");
    assert_eq!(eval("[1] + [2]"), "[1, 2]");
    assert_eq!(eval("2 * (0,)"), "(0, 0)");
    assert_eq!(eval("[1] * -1"), "[]");
    assert_eq!(eval("{\"a\": 1} | {\"b\": 2, \"a\": 3}"), "{\"a\": 3, \"b\": 2}");
}

#[test]
fn membership() {
    assert_eq!(eval("2 in [1, 2]"), "True");
    assert_eq!(eval("\"k\" not in {\"k\": 1}"), "False");
    assert_eq!(eval("\"ell\" in \"hello\""), "True");
    assert_eq!(
        eval_err("1 in \"abc\""),
        "'in <string>' requires string as left operand, not int"
    );
}

#[test]
fn mismatched_operands() {
    assert_eq!(eval_err("1 + \"a\""), "unknown binary op: int + string");
    assert_eq!(eval_err("[] < 1"), "unknown binary op: list < int");
    assert_eq!(eval_err("1 // 0"), "division by zero");
}

#[test]
fn percent_formatting_operator() {
    assert_eq!(eval("\"%s-%d\" % (\"a\", 3)"), "\"a-3\"");
    assert_eq!(eval("\"%(k)s\" % {\"k\": \"v\"}"), "\"v\"");
}

#[test]
fn shifts() {
    assert_eq!(evaluate_binary(BinaryOp::Shr, &Value::Int(-8), &Value::Int(3)).unwrap().repr(), "-1");
    assert!(evaluate_binary(BinaryOp::Shl, &Value::Int(1), &Value::Int(63)).is_err());
    assert!(evaluate_binary(BinaryOp::Shl, &Value::Int(1), &Value::Int(-1)).is_err());
}

proptest! {
    #[test]
    fn floor_division_identity(a in -10_000i64..10_000, b in -100i64..100) {
        prop_assume!(b != 0);
        let q = evaluate_binary(BinaryOp::FloorDiv, &Value::Int(a), &Value::Int(b)).unwrap();
        let r = evaluate_binary(BinaryOp::Mod, &Value::Int(a), &Value::Int(b)).unwrap();
        let (q, r) = (q.as_int().unwrap(), r.as_int().unwrap());
        prop_assert_eq!(q * b + r, a);
        prop_assert!(r == 0 || (r < 0) == (b < 0));
    }
}
