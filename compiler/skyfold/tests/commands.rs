// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI command tests over scripts written to a temporary directory.

use clap::Parser;
use pretty_assertions::assert_eq;
use skyfold::commands::{print_test_summary, run_file, run_tests, RunArgs, TestArgs};
use skyfold::{CliError, OutputFormat};
use tempfile::TempDir;

const SCHEMA: &str = r"
package: shop.v1
messages:
  - name: Item
    fields:
      - { name: sku, number: 1, type: string }
      - { name: qty, number: 2, type: int32 }
      - { name: price_cents, number: 3, type: int64 }
";

const SCRIPT: &str = r#"
pb = proto.package("shop.v1")

def main(ctx):
    return [
        pb.Item(sku = ctx.vars["sku"], qty = 2),
        pb.Item(sku = "b-2", price_cents = 150),
    ]

def test_sku(ctx):
    ctx.assert.eq(pb.Item(sku = "x").sku, "x")
"#;

#[derive(Parser)]
struct RunCli {
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    test: TestArgs,
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shop.yaml"), SCHEMA).unwrap();
        std::fs::write(dir.path().join("main.sky"), SCRIPT).unwrap();
        Fixture { dir }
    }

    fn arg(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    fn run(&self, extra: &[&str]) -> Result<String, CliError> {
        let schema = self.arg("shop.yaml");
        let main = self.arg("main.sky");
        let mut argv = vec!["run", main.as_str(), "--schema", schema.as_str(), "--var", "sku=a-1"];
        argv.extend_from_slice(extra);
        let cli = RunCli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run_file(&cli.run, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }
}

#[test]
fn run_writes_compact_json_lines() {
    let out = Fixture::new().run(&[]).unwrap();
    assert_eq!(
        out,
        "{\"sku\":\"a-1\",\"qty\":2}\n{\"sku\":\"b-2\",\"price_cents\":\"150\"}\n"
    );
}

#[test]
fn run_writes_yaml_documents() {
    let out = Fixture::new().run(&["--output", "yaml"]).unwrap();
    assert_eq!(
        out,
        "---\nsku: a-1\nqty: 2\n---\nsku: b-2\nprice_cents: '150'\n"
    );
}

#[test]
fn run_writes_text_format() {
    let out = Fixture::new().run(&["--output", "text"]).unwrap();
    assert_eq!(out, "sku:\"a-1\" qty:2\nsku:\"b-2\" price_cents:150\n");
}

#[test]
fn output_flag_parses() {
    let fixture = Fixture::new();
    let main = fixture.arg("main.sky");
    let cli = RunCli::try_parse_from(["run", main.as_str(), "--output", "text", "--pretty"]).unwrap();
    assert_eq!(cli.run.output, OutputFormat::Text);
    assert!(cli.run.pretty);
    assert!(RunCli::try_parse_from(["run", main.as_str(), "--var", "nokey"]).is_err());
}

#[test]
fn unknown_type_without_schema_fails() {
    let fixture = Fixture::new();
    let main = fixture.arg("main.sky");
    let cli = RunCli::try_parse_from(["run", main.as_str(), "--var", "sku=x"]).unwrap();
    let err = run_file(&cli.run, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, CliError::EntryPoint(_)), "{err}");
    assert!(err.to_string().contains("shop.v1.Item"), "{err}");
}

#[test]
fn test_command_reports_summary() {
    let fixture = Fixture::new();
    let main = fixture.arg("main.sky");
    let schema = fixture.arg("shop.yaml");
    let cli = TestCli::try_parse_from(["test", main.as_str(), "--schema", schema.as_str(), "-v"])
        .unwrap();

    let summary = run_tests(&cli.test).unwrap();
    assert_eq!(summary.exit_code(), 0);

    let mut out = Vec::new();
    print_test_summary(&summary, cli.test.verbose, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("  PASS: test_sku"), "{out}");
    assert!(out.contains("1 passed, 0 failed (1 total)"), "{out}");
}
