//! `Config::main` and the records it returns.

use pretty_assertions::assert_eq;
use sky_eval::Value;
use sky_loader::{EntryPointError, LoadOptions};
use sky_proto::encode::to_json;

use crate::common::Workspace;

const SERVICES: &str = r#"
svc = proto.package("acme.v1")

def main(ctx):
    web = svc.Service(name = "web", hosts = ["a", "b"])
    web.env["region"] = ctx.vars["region"]
    return [web, svc.Job(name = "migrate")]
"#;

#[test]
fn main_returns_records() {
    let ws = Workspace::new().file("main.sky", SERVICES);
    let options = LoadOptions::builder().var("region", Value::str("eu"));
    let config = ws.load_with("main.sky", options).config();

    let records = config.main().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].full_name(), "acme.v1.Service");
    assert_eq!(
        to_json(&records[0], true).unwrap(),
        r#"{"name":"web","hosts":["a","b"],"env":{"region":"eu"}}"#
    );
    assert_eq!(to_json(&records[1], true).unwrap(), r#"{"name":"migrate"}"#);
}

#[test]
fn none_and_tuples_are_accepted() {
    let ws = Workspace::new()
        .file("none.sky", "def main(ctx):\n    pass\n")
        .file(
            "tuple.sky",
            "svc = proto.package(\"acme.v1\")\ndef main(ctx):\n    return tuple([svc.Job(name = \"a\")])\n",
        );
    assert!(ws.load("none.sky").config().main().unwrap().is_empty());
    assert_eq!(ws.load("tuple.sky").config().main().unwrap().len(), 1);
}

#[test]
fn missing_entry_point() {
    let ws = Workspace::new().file("main.sky", "x = 1\n");
    let err = ws.load("main.sky").config().main().unwrap_err();
    assert!(matches!(err, EntryPointError::Missing { .. }));
    assert!(err.to_string().contains("missing entry point"), "{err}");
}

#[test]
fn entry_point_must_be_callable() {
    let ws = Workspace::new().file("main.sky", "main = 3\n");
    let err = ws.load("main.sky").config().main().unwrap_err();
    assert!(
        matches!(&err, EntryPointError::NotCallable { got, .. } if got == "int"),
        "{err}"
    );
}

#[test]
fn bad_return_values() {
    let ws = Workspace::new()
        .file("scalar.sky", "def main(ctx):\n    return 5\n")
        .file(
            "mixed.sky",
            "svc = proto.package(\"acme.v1\")\ndef main(ctx):\n    return [svc.Job(), \"oops\"]\n",
        );

    let err = ws.load("scalar.sky").config().main().unwrap_err();
    assert!(matches!(
        &err,
        EntryPointError::BadReturn { index: None, got, .. } if got == "int"
    ));

    let err = ws.load("mixed.sky").config().main().unwrap_err();
    assert!(matches!(
        &err,
        EntryPointError::BadReturn { index: Some(1), got, .. } if got == "string"
    ));
    assert_eq!(
        err.to_string(),
        "main: element 1 of the result is string, want a proto message"
    );
}

#[test]
fn failures_carry_a_traceback() {
    let ws = Workspace::new().file(
        "main.sky",
        "def check(n):\n    if n < 0:\n        fail(\"negative\", n)\n\ndef main(ctx):\n    check(-1)\n",
    );
    let err = ws.load("main.sky").config().main().unwrap_err();
    let EntryPointError::Exec(eval) = &err else {
        panic!("expected an evaluation error, got {err}");
    };
    assert!(eval.is_fail());
    let text = err.to_string();
    assert!(text.contains("fail: negative -1"), "{text}");
    assert!(text.contains("Traceback (most recent call last):"), "{text}");
}

#[test]
fn returned_records_are_detached() {
    let ws = Workspace::new().file(
        "main.sky",
        "svc = proto.package(\"acme.v1\")\nbase = svc.Service(name = \"base\")\ndef main(ctx):\n    return [base]\n",
    );
    let config = ws.load("main.sky").config();

    let first = config.main().unwrap();
    assert!(!first[0].is_frozen());
    first[0].set("name", Value::str("changed")).unwrap();

    let second = config.main().unwrap();
    assert_eq!(
        second[0].get("name").unwrap().as_str(),
        Some("base"),
        "a returned record must not alias module state"
    );
}

#[test]
fn module_state_is_frozen_during_main() {
    let ws = Workspace::new().file(
        "main.sky",
        "svc = proto.package(\"acme.v1\")\nbase = svc.Service()\ndef main(ctx):\n    base.port = 1\n",
    );
    let err = ws.load("main.sky").config().main().unwrap_err();
    assert!(err.to_string().contains("cannot mutate frozen"), "{err}");
}

#[test]
fn context_vars_are_frozen() {
    let ws = Workspace::new().file("main.sky", "def main(ctx):\n    ctx.vars[\"x\"] = 1\n");
    let err = ws.load("main.sky").config().main().unwrap_err();
    assert!(err.to_string().contains("cannot mutate frozen dict"), "{err}");
}

#[test]
fn defaults_and_merge_through_proto() {
    let ws = Workspace::new().file(
        "main.sky",
        r#"
svc = proto.package("acme.v1")

def main(ctx):
    a = svc.Service(name = "a", hosts = ["h1", "h2"])
    b = proto.merge(proto.clone(a), svc.Service(hosts = ["h3"]))
    return [proto.set_defaults(svc.Service()), a, b]
"#,
    );
    let records = ws.load("main.sky").config().main().unwrap();
    let json: Vec<String> = records.iter().map(|r| to_json(r, true).unwrap()).collect();
    assert_eq!(
        json,
        vec![
            r#"{"port":80}"#.to_string(),
            r#"{"name":"a","hosts":["h1","h2"]}"#.to_string(),
            r#"{"name":"a","hosts":["h1","h2","h3"]}"#.to_string(),
        ]
    );
}
