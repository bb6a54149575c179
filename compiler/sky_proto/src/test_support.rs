//! Fixtures shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;
use std::sync::Arc;

use sky_eval::{silent_handler, EvalError, Interpreter, ModuleEnv, Namespace, NoLoad, Value};

use crate::{proto_module, PackageValue, SchemaRegistry, TypeRegistry, TypedRecord};

pub(crate) const SCHEMA: &str = r#"
package: example.v1
messages:
  - name: Deployment
    fields:
      - { name: name, number: 1, type: string }
      - { name: replicas, number: 2, type: int32, default: 1 }
      - { name: labels, number: 3, type: map, key_type: string, value_type: string }
      - { name: containers, number: 4, type: Container, label: repeated }
      - { name: policy, number: 5, type: Policy, default: NEVER }
      - { name: strategy, number: 6, type: Strategy }
      - { name: memory_bytes, number: 7, type: int64 }
      - { name: ratio, number: 8, type: double }
      - { name: tags, number: 9, type: string, label: repeated }
      - { name: paused, number: 10, type: bool }
    messages:
      - name: Strategy
        fields:
          - { name: max_surge, number: 1, type: uint32, default: 1 }
          - { name: kind, number: 2, type: string }
  - name: Container
    fields:
      - { name: name, number: 1, type: string }
      - { name: image, number: 2, type: string }
      - { name: ports, number: 3, type: int32, label: repeated }
enums:
  - name: Policy
    values: [{ name: ALWAYS, number: 0 }, { name: NEVER, number: 1 }]
"#;

pub(crate) fn registry() -> Arc<dyn TypeRegistry> {
    Arc::new(SchemaRegistry::from_yaml(SCHEMA).expect("fixture schema is valid"))
}

/// An empty record of `example.v1.<name>`.
pub(crate) fn new_record(name: &str) -> TypedRecord {
    let registry = registry();
    let descriptor = registry
        .lookup_message(&format!("example.v1.{name}"))
        .unwrap();
    TypedRecord::new(descriptor, registry)
}

pub(crate) struct Run {
    pub env: Rc<ModuleEnv>,
}

impl Run {
    pub fn global(&self, name: &str) -> Value {
        self.env
            .global(name)
            .unwrap_or_else(|| panic!("global {name} not bound"))
    }

    /// Render a global record as compact JSON.
    pub fn json(&self, name: &str) -> String {
        let value = self.global(name);
        let record = value
            .downcast_native::<TypedRecord>()
            .unwrap_or_else(|| panic!("global {name} is not a record"));
        crate::encode::to_json(record, true).unwrap()
    }
}

/// Run `source` with `proto` and `pb` (the `example.v1` package) bound,
/// plus any extra predeclared values.
pub(crate) fn try_run_with(source: &str, extra: &[(&str, Value)]) -> Result<Run, EvalError> {
    let module = sky_parse::parse(source).expect("test source parses");
    let mut predeclared = Namespace::new();
    let registry = registry();
    predeclared.set("proto", proto_module(Arc::clone(&registry)));
    predeclared.set(
        "pb",
        Value::native(PackageValue::new("example.v1", registry)),
    );
    for (name, value) in extra {
        predeclared.set(name, value.clone());
    }
    let env = ModuleEnv::new(Arc::from("test.sky"), source, module, Rc::new(predeclared));
    let mut interp = Interpreter::builder()
        .print_handler(silent_handler())
        .build();
    interp.exec_module(&env, &mut NoLoad)?;
    Ok(Run { env })
}

pub(crate) fn run(source: &str) -> Run {
    try_run_with(source, &[]).unwrap_or_else(|e| panic!("execution failed: {e}"))
}

pub(crate) fn run_err(source: &str) -> EvalError {
    run_err_with(source, &[])
}

pub(crate) fn run_err_with(source: &str, extra: &[(&str, Value)]) -> EvalError {
    match try_run_with(source, extra) {
        Ok(_) => panic!("expected execution to fail"),
        Err(e) => e,
    }
}
