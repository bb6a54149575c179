//! Subcommand implementations.

mod run;
mod test;

use std::path::PathBuf;
use std::sync::Arc;

use sky_eval::{EvalError, SharedPrintHandler, Value};
use sky_loader::{load, Config, EntryPointError, LoadError, LoadOptions};
use sky_proto::{SchemaError, SchemaRegistry};
use thiserror::Error;

pub use run::{render_records, run_file, RunArgs};
pub use test::{print_test_summary, run_tests, TestArgs};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),
    #[error("cannot encode output: {0}")]
    Encode(EvalError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Encoding of the records written by `run`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Text,
}

/// Arguments shared by every command that loads a script.
#[derive(Clone, Debug, clap::Args)]
pub struct LoadArgs {
    /// Entry module.
    pub file: PathBuf,

    /// Context variable exposed as `ctx.vars[KEY]` (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// YAML or JSON schema document describing record types (repeatable).
    #[arg(long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,
}

/// Parse `key=value`; the value may itself contain `=`.
pub fn parse_var(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid variable {text:?}: expected KEY=VALUE")),
    }
}

impl LoadArgs {
    /// Build the registry from `--schema` files and load the entry module.
    pub fn load(&self, print: SharedPrintHandler) -> Result<Config, CliError> {
        let mut registry = SchemaRegistry::builder();
        for schema in &self.schemas {
            registry = registry.add_file(schema)?;
        }
        let mut options = LoadOptions::builder()
            .registry(Arc::new(registry.build()?))
            .print_handler(print);
        for (key, value) in &self.vars {
            options = options.var(key, Value::str(value));
        }
        Ok(load(&self.file.to_string_lossy(), options.build())?)
    }
}
