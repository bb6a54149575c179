//! Resolution, caching, and failure propagation across module graphs.

use pretty_assertions::assert_eq;
use sky_eval::{buffer_handler, Value};
use sky_loader::{load, LoadError, LoadOptions, MemoryResolver, ModulePath, ResolveError};

use crate::common::Workspace;

#[test]
fn diamond_executes_each_module_once() {
    let ws = Workspace::new()
        .file(
            "a.sky",
            "load(\"b.sky\", \"b\")\nload(\"c.sky\", \"c\")\nprint(\"a\", b, c)\n",
        )
        .file("b.sky", "load(\"c.sky\", \"c\")\nprint(\"b\")\nb = c + 1\n")
        .file("c.sky", "print(\"c\")\nc = 1\n");

    let loaded = ws.load("a.sky");
    assert_eq!(loaded.messages(), vec!["c", "b", "a 2 1"]);

    let config = loaded.config();
    let order: Vec<&str> = config.modules().iter().map(ModulePath::as_str).collect();
    assert_eq!(
        order,
        vec![ws.module("a.sky"), ws.module("b.sky"), ws.module("c.sky")]
    );
}

#[test]
fn reimport_does_not_reorder_effects() {
    let ws = Workspace::new()
        .file(
            "main.sky",
            "load(\"one.sky\", \"one\")\nload(\"two.sky\", \"two\")\nload(\"one.sky\", again = \"one\")\n",
        )
        .file("one.sky", "print(\"one\")\none = 1\n")
        .file("two.sky", "load(\"one.sky\", \"one\")\nprint(\"two\")\ntwo = one + 1\n");

    let loaded = ws.load("main.sky");
    assert_eq!(loaded.messages(), vec!["one", "two"]);
    let config = loaded.config();
    assert_eq!(config.locals().get("again").and_then(Value::as_int), Some(1));
    assert_eq!(config.modules().len(), 3);
}

#[test]
fn cycle_stops_at_the_offending_load() {
    let ws = Workspace::new()
        .file("a.sky", "load(\"b.sky\", \"x\")\nprint(\"a end\")\n")
        .file(
            "b.sky",
            "print(\"b start\")\nload(\"a.sky\", \"y\")\nprint(\"b end\")\nx = 1\n",
        );

    let loaded = ws.load("a.sky");
    assert_eq!(loaded.messages(), vec!["b start"]);

    let err = loaded.error();
    let LoadError::Cycle { chain } = err.root() else {
        panic!("expected a cycle, got {err}");
    };
    let chain: Vec<&str> = chain.iter().map(ModulePath::as_str).collect();
    assert_eq!(
        chain,
        vec![ws.module("a.sky"), ws.module("b.sky"), ws.module("a.sky")]
    );
    assert!(err.to_string().contains("import cycle: "), "{err}");
}

#[test]
fn self_import_is_a_cycle() {
    let ws = Workspace::new().file("a.sky", "load(\"./a.sky\", \"x\")\nx = 1\n");
    let err = ws.load("a.sky").error();
    assert!(
        matches!(err.root(), LoadError::Cycle { chain } if chain.len() == 2),
        "{err}"
    );
}

#[test]
fn import_error_carries_the_load_position() {
    let ws = Workspace::new()
        .file("main.sky", "x = 1\nload(\"lib.sky\", \"y\")\n")
        .file("lib.sky", "y = 1\nz = y + \"s\"\n");

    let err = ws.load("main.sky").error();
    let LoadError::Import {
        importer,
        position,
        module,
        source,
    } = &err
    else {
        panic!("expected an import error, got {err}");
    };
    assert_eq!(importer.as_str(), ws.module("main.sky"));
    assert_eq!(position.line, 2);
    assert_eq!(module, "lib.sky");

    let LoadError::Exec { path, error } = source.as_ref() else {
        panic!("expected an execution error, got {source}");
    };
    assert_eq!(path.as_str(), ws.module("lib.sky"));
    assert_eq!(error.position.as_ref().map(|p| p.line), Some(2));
    assert!(source
        .to_string()
        .starts_with(&format!("{}:2:", ws.module("lib.sky"))));
}

#[test]
fn private_names_cannot_be_loaded() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"lib.sky\", \"_secret\")\n")
        .file("lib.sky", "_secret = 1\n");
    let err = ws.load("main.sky").error();
    assert!(matches!(err, LoadError::Exec { .. }), "{err}");
    assert!(err.to_string().contains("name _secret is private"), "{err}");
}

#[test]
fn missing_names_fail() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"lib.sky\", \"nope\")\n")
        .file("lib.sky", "yes = 1\n");
    let err = ws.load("main.sky").error();
    assert!(
        err.to_string().contains("name nope not found in module"),
        "{err}"
    );
}

#[test]
fn loaded_bindings_are_frozen() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"lib.sky\", \"items\")\nitems.append(2)\n")
        .file("lib.sky", "items = [1]\n");
    let err = ws.load("main.sky").error();
    assert!(
        err.to_string().contains("cannot mutate frozen list"),
        "{err}"
    );
}

#[test]
fn missing_module_is_a_read_error() {
    let ws = Workspace::new().file("main.sky", "load(\"gone.sky\", \"x\")\n");
    let err = ws.load("main.sky").error();
    let LoadError::Read { path, .. } = err.root() else {
        panic!("expected a read error, got {err}");
    };
    assert_eq!(path.as_str(), ws.module("gone.sky"));
}

#[test]
fn missing_entry_is_a_read_error() {
    let ws = Workspace::new();
    let err = ws.load("main.sky").error();
    assert!(matches!(err, LoadError::Read { .. }), "{err}");
}

#[test]
fn syntax_errors_in_imports() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"bad.sky\", \"x\")\n")
        .file("bad.sky", "x = (1,\n");
    let err = ws.load("main.sky").error();
    let LoadError::Parse { errors, .. } = err.root() else {
        panic!("expected a parse error, got {err}");
    };
    assert!(!errors.is_empty());
    assert_eq!(errors[0].position.file.as_ref(), ws.module("bad.sky"));
}

#[test]
fn backslashes_fail_resolution() {
    let ws = Workspace::new().file("main.sky", "load(\"lib\\\\x.sky\", \"x\")\n");
    let err = ws.load("main.sky").error();
    let LoadError::Resolve { from, .. } = err.root() else {
        panic!("expected a resolve error, got {err}");
    };
    assert_eq!(from.as_ref().map(ModulePath::as_str), Some(ws.module("main.sky").as_str()));
}

#[test]
fn nested_modules_resolve_against_the_entry_directory() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"apps/web.sky\", \"port\")\n")
        .file(
            "apps/web.sky",
            "load(\"lib/base.sky\", \"base\")\nload(\"//lib/extra.sky\", \"extra\")\nport = base + extra\n",
        )
        .file("lib/base.sky", "base = 8000\n")
        .file("lib/extra.sky", "extra = 80\n")
        .file("apps/lib/base.sky", "base = 1\n");

    let config = ws.load("main.sky").config();
    assert_eq!(config.locals().get("port").and_then(Value::as_int), Some(8080));
    assert!(!config
        .modules()
        .iter()
        .any(|m| m.as_str() == ws.module("apps/lib/base.sky")));
}

#[test]
fn loads_cannot_reach_outside_the_root() {
    let ws = Workspace::new()
        .file("app/main.sky", "load(\"../secret.sky\", \"token\")\n")
        .file("secret.sky", "token = 1\n")
        .file("app/abs.sky", "load(\"/etc/passwd\", \"root\")\n");

    let err = ws.load("app/main.sky").error();
    let LoadError::Resolve { name, reason, .. } = err.root() else {
        panic!("expected a resolve error, got {err}");
    };
    assert_eq!(name, "../secret.sky");
    assert_eq!(*reason, ResolveError::OutsideRoot("../secret.sky".to_string()));

    let err = ws.load("app/abs.sky").error();
    let LoadError::Resolve { reason, .. } = err.root() else {
        panic!("expected a resolve error, got {err}");
    };
    assert_eq!(*reason, ResolveError::Absolute("/etc/passwd".to_string()));
}

#[test]
fn capabilities_are_visible_in_every_module() {
    let ws = Workspace::new()
        .file("main.sky", "load(\"lib.sky\", \"doc\")\nout = json.marshal(doc)\n")
        .file("lib.sky", "doc = yaml.unmarshal(\"a: 1\\n\")\n");
    let config = ws.load("main.sky").config();
    assert_eq!(
        config.locals().get("out").and_then(Value::as_str),
        Some("{\"a\":1}")
    );
}

#[test]
fn caller_globals_override_capabilities() {
    let ws = Workspace::new().file("main.sky", "out = [hash, region]\n");
    let options = LoadOptions::builder()
        .global("hash", Value::str("shadowed"))
        .global("region", Value::str("eu-west-1"))
        .global("region", Value::str("us-east-1"));
    let config = ws.load_with("main.sky", options).config();
    assert_eq!(
        config.locals().get("out").map(Value::repr),
        Some("[\"shadowed\", \"us-east-1\"]".to_string())
    );
}

#[test]
fn caller_globals_are_frozen_by_load() {
    let ws = Workspace::new().file("main.sky", "n = len(regions)\n");
    let regions = Value::list(vec![Value::str("eu-west-1")]);
    let options = LoadOptions::builder().global("regions", regions.clone());
    let config = ws.load_with("main.sky", options).config();
    assert_eq!(config.locals().get("n").and_then(Value::as_int), Some(1));
    assert!(regions.is_frozen());
}

#[test]
fn memory_resolver_graph() {
    let resolver = MemoryResolver::new()
        .with_module("main.sky", "load(\"lib/util.sky\", \"double\")\nx = double(21)\n")
        .with_module("lib/util.sky", "def double(n):\n    return n * 2\n");
    let options = LoadOptions::builder()
        .resolver(resolver)
        .print_handler(buffer_handler())
        .build();

    let config = load("main.sky", options).unwrap();
    assert_eq!(config.entry().as_str(), "/main.sky");
    assert_eq!(config.locals().get("x").and_then(Value::as_int), Some(42));
}
