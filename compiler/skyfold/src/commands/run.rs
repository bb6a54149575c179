//! The `run` command: load a script, call `main`, print the records.

use std::io::Write;

use sky_eval::stderr_handler;
use sky_proto::encode::{to_json, to_text, to_yaml};
use sky_proto::TypedRecord;

use super::{CliError, LoadArgs, OutputFormat};

#[derive(Clone, Debug, clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Indent JSON with tabs and text format with two spaces.
    #[arg(long)]
    pub pretty: bool,
}

/// Run the script and write its records to `out`. Script `print` output
/// goes to stderr.
///
/// Returns the number of records written.
pub fn run_file(args: &RunArgs, out: &mut dyn Write) -> Result<usize, CliError> {
    let config = args.load.load(stderr_handler())?;
    let records = config.main()?;
    tracing::debug!(records = records.len(), "writing output");
    out.write_all(render_records(&records, args.output, args.pretty)?.as_bytes())?;
    Ok(records.len())
}

/// Encode `records` as one stream.
///
/// - JSON: one document per line when compact, newline-terminated
///   documents when pretty
/// - YAML: `---`-separated documents
/// - text: one record per line when compact, blank-line separated when
///   pretty
pub fn render_records(
    records: &[TypedRecord],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        match format {
            OutputFormat::Json => {
                out.push_str(&to_json(record, !pretty).map_err(CliError::Encode)?);
                out.push('\n');
            }
            OutputFormat::Yaml => {
                out.push_str("---\n");
                out.push_str(&to_yaml(record).map_err(CliError::Encode)?);
            }
            OutputFormat::Text if pretty => {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&to_text(record, false));
            }
            OutputFormat::Text => {
                out.push_str(&to_text(record, true));
                out.push('\n');
            }
        }
    }
    Ok(out)
}
