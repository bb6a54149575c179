//! skyfold CLI
//!
//! ```text
//! skyfold run <file> [--var k=v]... [--schema file]... [--output json|yaml|text] [--pretty]
//! skyfold test <file> [--var k=v]... [--schema file]... [--verbose]
//! ```

use std::process::ExitCode;

use clap::Parser;
use skyfold::commands::{print_test_summary, run_file, run_tests, RunArgs, TestArgs};
use skyfold::tracing_setup::init_tracing;

/// Configuration-as-code: run scripts that build typed records.
#[derive(Parser, Debug)]
#[command(name = "skyfold", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Load a script, call its `main(ctx)`, and print the records.
    Run(RunArgs),
    /// Run the script's `test_*` functions.
    Test(TestArgs),
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => match run_file(&args, &mut std::io::stdout().lock()) {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
        Commands::Test(args) => {
            let summary = match run_tests(&args) {
                Ok(summary) => summary,
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(err) = print_test_summary(&summary, args.verbose, &mut std::io::stdout()) {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
            let code = u8::try_from(summary.exit_code()).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
