//! `test_*` discovery and the `assert` namespace.

use pretty_assertions::assert_eq;
use sky_eval::Value;
use sky_loader::{LoadOptions, TestOutcome};

use crate::common::Workspace;

const SUITE: &str = r#"
svc = proto.package("acme.v1")

def make(name):
    return svc.Service(name = name, hosts = ["a"])

def test_name():
    pass

def test_fields(ctx):
    s = make(ctx.vars["name"])
    ctx.assert.eq(s.name, "api")
    ctx.assert.ne(s.port, 80)
    ctx.assert.contains(s.hosts, "a")
    ctx.assert.contains("service", "vic")
    ctx.assert.true(len(s.hosts) == 1)

def test_broken(ctx):
    ctx.assert.eq(make("x").name, "y")

helper_test = 1
test_value = 2
"#;

#[test]
fn discovers_test_functions_in_definition_order() {
    let ws = Workspace::new().file("suite.sky", SUITE);
    let config = ws.load("suite.sky").config();
    assert_eq!(config.tests(), vec!["test_name", "test_fields", "test_broken"]);
}

#[test]
fn runs_tests_and_reports_failures() {
    let ws = Workspace::new().file("suite.sky", SUITE);
    let options = LoadOptions::builder().var("name", Value::str("api"));
    let config = ws.load_with("suite.sky", options).config();
    let summary = config.run_tests();

    let outcomes: Vec<(&str, bool)> = summary
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.outcome.is_passed()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            // A test must accept the context argument.
            ("test_name", false),
            ("test_fields", true),
            ("test_broken", false),
        ]
    );
    assert_eq!(summary.exit_code(), 1);

    let TestOutcome::Failed(message) = &summary.results[2].outcome else {
        unreachable!();
    };
    assert!(message.contains("assert.eq: \"x\" != \"y\""), "{message}");
}

#[test]
fn assertion_messages() {
    let ws = Workspace::new().file(
        "suite.sky",
        r#"
def test_true(ctx):
    ctx.assert.true(0)

def test_true_message(ctx):
    ctx.assert.true([], "no hosts")

def test_contains(ctx):
    ctx.assert.contains({"a": 1}, "b")

def test_contains_type(ctx):
    ctx.assert.contains(3, 1)
"#,
    );
    let config = ws.load("suite.sky").config();
    let messages: Vec<String> = config
        .run_tests()
        .results
        .into_iter()
        .map(|r| match r.outcome {
            TestOutcome::Failed(message) => message,
            TestOutcome::Passed => panic!("{} passed", r.name),
        })
        .collect();

    assert!(messages[0].contains("fail: assert.true: 0 is not true"), "{}", messages[0]);
    assert!(messages[1].contains("fail: no hosts"), "{}", messages[1]);
    assert!(
        messages[2].contains("assert.contains: {\"a\": 1} does not contain \"b\""),
        "{}",
        messages[2]
    );
    assert!(
        messages[3].contains("assert.contains: for parameter container: got int"),
        "{}",
        messages[3]
    );
}

#[test]
fn no_tests_exit_code() {
    let ws = Workspace::new().file("main.sky", "def main(ctx):\n    pass\n");
    let config = ws.load("main.sky").config();
    assert!(config.tests().is_empty());
    assert_eq!(config.run_tests().exit_code(), 2);
}

#[test]
fn main_context_has_no_assert() {
    let ws = Workspace::new().file("main.sky", "def main(ctx):\n    ctx.assert.eq(1, 1)\n");
    let err = ws.load("main.sky").config().main().unwrap_err();
    assert!(err.to_string().contains("assert"), "{err}");
}
