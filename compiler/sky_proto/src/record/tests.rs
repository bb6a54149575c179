#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::test_support::{new_record, run, run_err, run_err_with, try_run_with};

#[test]
fn constructor_sets_fields_and_unset_fields_read_zero() {
    let r = run(r#"
d = pb.Deployment(name = "web", replicas = 3)
name = d.name
replicas = d.replicas
ratio = d.ratio
paused = d.paused
policy = d.policy
strategy = d.strategy
kind = type(d)
"#);
    let got: Vec<String> = ["name", "replicas", "ratio", "paused", "policy", "strategy", "kind"]
        .iter()
        .map(|n| r.global(n).repr())
        .collect();
    assert_eq!(
        got,
        vec![
            "\"web\"",
            "3",
            "0.0",
            "False",
            "\"ALWAYS\"",
            "None",
            "\"example.v1.Deployment\"",
        ]
    );
}

#[test]
fn repeated_and_map_fields_are_live_containers() {
    let r = run(r#"
d = pb.Deployment(name = "web")
d.tags.append("a")
d.containers.append({"name": "c", "ports": [80]})
d.labels["app"] = "web"
d.containers[0].image = "nginx"
"#);
    assert_eq!(
        r.json("d"),
        r#"{"name":"web","labels":{"app":"web"},"containers":[{"name":"c","image":"nginx","ports":[80]}],"tags":["a"]}"#
    );
}

#[test]
fn scalar_kinds_are_checked() {
    let cases = [
        (
            "pb.Deployment(replicas = 3000000000)",
            "Deployment.replicas: value 3000000000 out of range for int32",
        ),
        (
            "pb.Deployment.Strategy(max_surge = -1)",
            "Strategy.max_surge: value -1 out of range for uint32",
        ),
        ("pb.Deployment(name = 1)", "Deployment.name: got int, want string"),
        ("pb.Deployment(paused = 1)", "Deployment.paused: got int, want bool"),
        ("pb.Deployment(ratio = \"x\")", "Deployment.ratio: got string, want double"),
        (
            "pb.Deployment(bogus = 1)",
            "example.v1.Deployment has no field \"bogus\"",
        ),
        (
            "pb.Deployment(\"web\")",
            "example.v1.Deployment: unexpected positional arguments",
        ),
    ];
    for (expr, want) in cases {
        let err = run_err(&format!("x = {expr}\n"));
        assert_eq!(err.message, want, "expr: {expr}");
    }
}

#[test]
fn floats_accept_ints() {
    let r = run("d = pb.Deployment(ratio = 2)\nr = d.ratio\n");
    assert_eq!(r.global("r").repr(), "2.0");
}

#[test]
fn enums_store_value_names() {
    let r = run(r#"
d = pb.Deployment(policy = pb.Policy.NEVER)
a = d.policy
d.policy = 0
b = d.policy
"#);
    assert_eq!(r.global("a").repr(), "\"NEVER\"");
    assert_eq!(r.global("b").repr(), "\"ALWAYS\"");

    let err = run_err("d = pb.Deployment(policy = \"SOMETIMES\")\n");
    assert_eq!(
        err.message,
        "Deployment.policy: \"SOMETIMES\" is not a value of example.v1.Policy"
    );
}

#[test]
fn message_fields_accept_dicts_and_same_type_records() {
    let r = run(r#"
d = pb.Deployment()
d.strategy = {"kind": "rolling"}
d.strategy.max_surge = 2
s = pb.Deployment.Strategy()
e = pb.Deployment(strategy = s)
s.kind = "recreate"
"#);
    assert_eq!(r.json("d"), r#"{"strategy":{"max_surge":2,"kind":"rolling"}}"#);
    assert_eq!(r.json("e"), r#"{"strategy":{"kind":"recreate"}}"#);

    let err = run_err("d = pb.Deployment(strategy = pb.Container())\n");
    assert_eq!(
        err.message,
        "Deployment.strategy: got example.v1.Container, want example.v1.Deployment.Strategy"
    );
}

#[test]
fn container_elements_are_checked() {
    let cases = [
        (
            "d.containers.append(1)",
            "Deployment.containers: got int, want example.v1.Container",
        ),
        ("d.tags = [\"a\", 2]", "Deployment.tags: got int, want string"),
        ("d.tags = \"a\"", "Deployment.tags: got string, want list"),
        ("d.labels[\"app\"] = 1", "Deployment.labels: got int, want string"),
        ("d.labels = {1: \"x\"}", "Deployment.labels: got int, want string"),
    ];
    for (stmt, want) in cases {
        let err = run_err(&format!("d = pb.Deployment()\n{stmt}\n"));
        assert_eq!(err.message, want, "stmt: {stmt}");
    }
}

#[test]
fn none_clears_a_field() {
    let r = run("d = pb.Deployment(name = \"web\", tags = [\"a\"])\nd.name = None\nd.tags = None\n");
    assert_eq!(r.json("d"), "{}");
}

#[test]
fn clone_of_merge_leaves_original_untouched() {
    let r = run(r#"
x = pb.Deployment(name = "x", tags = ["a", "b"], labels = {"k": "1"})
y = pb.Deployment(replicas = 5, tags = ["c"], labels = {"k": "2", "j": "3"})
m = proto.clone(proto.merge(proto.clone(x), y))
"#);
    assert_eq!(
        r.json("x"),
        r#"{"name":"x","labels":{"k":"1"},"tags":["a","b"]}"#
    );
    assert_eq!(
        r.json("m"),
        r#"{"name":"x","replicas":5,"labels":{"k":"2","j":"3"},"tags":["a","b","c"]}"#
    );
}

#[test]
fn merge_recurses_into_nested_records() {
    let r = run(r#"
a = pb.Deployment(strategy = {"kind": "rolling"})
b = pb.Deployment(strategy = {"max_surge": 3})
proto.merge(a, b)
b.strategy.max_surge = 4
"#);
    assert_eq!(
        r.json("a"),
        r#"{"strategy":{"max_surge":3,"kind":"rolling"}}"#
    );
}

fn frozen_strategy() -> TypedRecord {
    let strategy = new_record("Deployment.Strategy");
    strategy.set("max_surge", Value::Int(2)).unwrap();
    strategy.freeze();
    strategy
}

#[test]
fn frozen_records_are_copied_into_fields() {
    let shared = Value::native(frozen_strategy());
    let r = try_run_with(
        r#"
dst = pb.Deployment(name = "old", strategy = shared)
src = pb.Deployment(name = "new", strategy = {"kind": "rolling"})
proto.merge(dst, src)
dst.strategy.max_surge = 5
"#,
        &[("shared", shared.clone())],
    )
    .unwrap();
    assert_eq!(
        r.json("dst"),
        r#"{"name":"new","strategy":{"max_surge":5,"kind":"rolling"}}"#
    );
    let shared = shared.downcast_native::<TypedRecord>().unwrap();
    assert!(shared.is_frozen());
    assert_eq!(crate::encode::to_json(shared, true).unwrap(), r#"{"max_surge":2}"#);
}

#[test]
fn set_defaults_after_storing_a_frozen_record() {
    let d = new_record("Deployment");
    d.set("strategy", Value::native(frozen_strategy())).unwrap();
    d.set("replicas", Value::Int(0)).unwrap();
    d.set_defaults().unwrap();
    assert_eq!(
        crate::encode::to_json(&d, true).unwrap(),
        r#"{"replicas":1,"policy":"NEVER","strategy":{"max_surge":2}}"#
    );
}

#[test]
fn merge_requires_matching_types() {
    let err = run_err("proto.merge(pb.Deployment(), pb.Container())\n");
    assert_eq!(
        err.message,
        "proto.merge: cannot merge example.v1.Container into example.v1.Deployment"
    );
    let err = run_err("proto.merge(pb.Deployment(), {})\n");
    assert_eq!(
        err.message,
        "proto.merge: for parameter src: got dict, want proto.Message"
    );
}

#[test]
fn frozen_records_reject_every_mutation() {
    let r = run("d = pb.Deployment(name = \"web\", strategy = {\"kind\": \"a\"})\n");
    let d = r.global("d");
    d.freeze();
    let before = r.json("d");
    let extra = [("d", d.clone())];
    for stmt in [
        "proto.clear(d)",
        "proto.merge(d, pb.Deployment(name = \"x\"))",
        "proto.set_defaults(d)",
        "d.name = \"x\"",
        "d.strategy.kind = \"b\"",
    ] {
        let err = run_err_with(&format!("{stmt}\n"), &extra);
        assert!(
            err.message.starts_with("cannot mutate frozen example.v1.Deployment"),
            "{stmt}: {}",
            err.message
        );
    }
    let err = run_err_with("d.tags.append(\"x\")\n", &extra);
    assert_eq!(err.message, "cannot mutate frozen list");
    assert_eq!(r.json("d"), before);
}

#[test]
fn clones_of_frozen_records_are_mutable() {
    let r = run("d = pb.Deployment(tags = [\"a\"])\n");
    let d = r.global("d");
    d.freeze();
    let r2 = crate::test_support::try_run_with(
        "c = proto.clone(d)\nc.tags.append(\"b\")\nc.name = \"copy\"\n",
        &[("d", d)],
    )
    .unwrap();
    assert_eq!(r2.json("c"), r#"{"name":"copy","tags":["a","b"]}"#);
    assert_eq!(r.json("d"), r#"{"tags":["a"]}"#);
}

#[test]
fn set_defaults_fills_zero_values_and_recurses() {
    let r = run(r#"
d = pb.Deployment(replicas = 0, strategy = {})
proto.set_defaults(d)
e = pb.Deployment(replicas = 4)
proto.set_defaults(e)
"#);
    assert_eq!(
        r.json("d"),
        r#"{"replicas":1,"policy":"NEVER","strategy":{"max_surge":1}}"#
    );
    assert_eq!(r.json("e"), r#"{"replicas":4,"policy":"NEVER"}"#);
}

#[test]
fn clear_resets_fields() {
    let r = run("d = pb.Deployment(name = \"web\", tags = [\"a\"])\nproto.clear(d)\n");
    assert_eq!(r.json("d"), "{}");
}

#[test]
fn equality_is_structural() {
    let r = run(r#"
same = pb.Container(name = "a") == pb.Container(name = "a", ports = [])
different = pb.Container(name = "a") == pb.Container(name = "b")
other_type = pb.Container() == pb.Deployment()
"#);
    assert_eq!(r.global("same").repr(), "True");
    assert_eq!(r.global("different").repr(), "False");
    assert_eq!(r.global("other_type").repr(), "False");
}

#[test]
fn repr_uses_compact_text() {
    let r = run("s = repr(pb.Container(name = \"a\", ports = [80, 443]))\ne = repr(pb.Container())\n");
    assert_eq!(
        r.global("s").to_str(),
        "<example.v1.Container name:\"a\" ports:80 ports:443>"
    );
    assert_eq!(r.global("e").to_str(), "<example.v1.Container>");
}

#[test]
fn package_lookups_are_lazy() {
    let r = run("p = proto.package(\"not.a.package\")\n");
    assert_eq!(r.global("p").repr(), "<proto.Package \"not.a.package\">");
    let err = run_err("x = pb.Missing\n");
    assert_eq!(
        err.message,
        "proto.package: type \"example.v1.Missing\" not found"
    );
}

#[test]
fn reading_containers_of_frozen_record_does_not_store() {
    let record = new_record("Deployment");
    record.freeze();
    let tags = record.get("tags").unwrap();
    assert!(tags.is_frozen());
    assert!(record.set_fields().is_empty());
}

#[test]
fn rust_api_round_trip() {
    let record = new_record("Container");
    record.set("name", Value::str("api")).unwrap();
    record
        .set("ports", Value::list(vec![Value::Int(8080)]))
        .unwrap();
    let copy = record.deep_clone().unwrap();
    copy.set("name", Value::str("copy")).unwrap();
    assert_eq!(record.get("name").unwrap().repr(), "\"api\"");
    assert_eq!(copy.get("ports").unwrap().repr(), "[8080]");
    assert_eq!(
        record.get("missing").unwrap_err().message,
        "example.v1.Container has no field \"missing\""
    );
}

#[test]
fn clone_reports_guard_failures() {
    // Admits the initial items, then rejects everything.
    struct Closing(Cell<bool>);
    impl ValueGuard for Closing {
        fn admit(&self, value: Value) -> Result<Value, EvalError> {
            if self.0.replace(true) {
                Err(EvalError::new("guard closed"))
            } else {
                Ok(value)
            }
        }
        fn describe(&self) -> String {
            "closing".to_string()
        }
    }

    let list = ListValue::guarded(Rc::new(Closing(Cell::new(false))), vec![Value::Int(1)]).unwrap();
    let err = clone_value(&Value::List(Rc::new(list))).unwrap_err();
    assert_eq!(err.message, "guard closed");
}

proptest! {
    #[test]
    fn int32_fields_accept_exactly_the_int32_range(n in any::<i64>()) {
        let record = new_record("Deployment");
        let accepted = record.set("replicas", Value::Int(n)).is_ok();
        prop_assert_eq!(accepted, i32::try_from(n).is_ok());
    }

    #[test]
    fn merge_appends_repeated_values(
        a in proptest::collection::vec(any::<i32>(), 0..5),
        b in proptest::collection::vec(any::<i32>(), 0..5),
    ) {
        let ints = |v: &[i32]| Value::list(v.iter().map(|&n| Value::Int(i64::from(n))).collect());
        let dst = new_record("Container");
        let src = new_record("Container");
        dst.set("ports", ints(&a)).unwrap();
        src.set("ports", ints(&b)).unwrap();
        dst.merge_from(&src).unwrap();
        let all: Vec<i32> = a.iter().chain(&b).copied().collect();
        prop_assert_eq!(dst.get("ports").unwrap().repr(), ints(&all).repr());
    }
}
