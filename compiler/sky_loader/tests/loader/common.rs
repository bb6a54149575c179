//! Shared fixtures: a temporary module tree and a schema registry.

use std::path::PathBuf;
use std::sync::Arc;

use sky_eval::{buffer_handler, SharedPrintHandler};
use sky_loader::{load, Config, LoadError, LoadOptions, LoadOptionsBuilder};
use sky_proto::{SchemaRegistry, TypeRegistry};
use tempfile::TempDir;

pub const SCHEMA: &str = r"
package: acme.v1
messages:
  - name: Service
    fields:
      - { name: name, number: 1, type: string }
      - { name: port, number: 2, type: int32, default: 80 }
      - { name: hosts, number: 3, type: string, label: repeated }
      - { name: env, number: 4, type: map, key_type: string, value_type: string }
  - name: Job
    fields:
      - { name: name, number: 1, type: string }
";

pub fn registry() -> Arc<dyn TypeRegistry> {
    Arc::new(SchemaRegistry::from_yaml(SCHEMA).unwrap())
}

/// A directory of `.sky` files that lives as long as the value.
pub struct Workspace {
    dir: TempDir,
}

/// Outcome of a load plus everything printed during it.
pub struct Loaded {
    pub result: Result<Config, LoadError>,
    pub output: SharedPrintHandler,
}

impl Loaded {
    pub fn config(self) -> Config {
        match self.result {
            Ok(config) => config,
            Err(err) => panic!("load failed: {err}"),
        }
    }

    pub fn error(self) -> LoadError {
        match self.result {
            Ok(_) => panic!("load unexpectedly succeeded"),
            Err(err) => err,
        }
    }

    /// Printed messages with their `[file:line:col] ` prefixes removed.
    pub fn messages(&self) -> Vec<String> {
        strip_positions(&self.output.get_output())
    }
}

pub fn strip_positions(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| match line.split_once("] ") {
            Some((_, message)) if line.starts_with('[') => message.to_string(),
            _ => line.to_string(),
        })
        .collect()
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn file(self, relative: &str, source: &str) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, source).unwrap();
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Canonical path string of a file in the workspace.
    pub fn module(&self, relative: &str) -> String {
        self.path(relative).to_string_lossy().into_owned()
    }

    pub fn load(&self, entry: &str) -> Loaded {
        self.load_with(entry, LoadOptions::builder())
    }

    pub fn load_with(&self, entry: &str, options: LoadOptionsBuilder) -> Loaded {
        let output = buffer_handler();
        let options = options
            .registry(registry())
            .print_handler(Arc::clone(&output))
            .build();
        let entry = self.module(entry);
        Loaded {
            result: load(&entry, options),
            output,
        }
    }
}
