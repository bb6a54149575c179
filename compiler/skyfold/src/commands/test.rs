//! The `test` command: run a script's `test_*` functions.

use std::io::Write;

use sky_eval::stderr_handler;
use sky_loader::{TestOutcome, TestSummary};

use super::{CliError, LoadArgs};

#[derive(Clone, Debug, clap::Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Also list passing tests.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run_tests(args: &TestArgs) -> Result<TestSummary, CliError> {
    let config = args.load.load(stderr_handler())?;
    Ok(config.run_tests())
}

/// Print per-test lines and a summary.
pub fn print_test_summary(
    summary: &TestSummary,
    verbose: bool,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    for result in &summary.results {
        match &result.outcome {
            TestOutcome::Passed if verbose => {
                writeln!(out, "  PASS: {} ({:.2?})", result.name, result.duration)?;
            }
            TestOutcome::Passed => {}
            TestOutcome::Failed(msg) => writeln!(out, "  FAIL: {} - {}", result.name, msg)?,
        }
    }

    writeln!(out)?;
    writeln!(out, "Test Summary:")?;
    writeln!(
        out,
        "  {} passed, {} failed ({} total)",
        summary.passed,
        summary.failed,
        summary.total()
    )?;
    writeln!(out, "  Completed in {:.2?}", summary.duration)?;
    if summary.has_failures() {
        writeln!(out)?;
        writeln!(out, "FAILED")?;
    } else if summary.total() == 0 {
        writeln!(out)?;
        writeln!(out, "NO TESTS FOUND")?;
    }
    Ok(())
}
