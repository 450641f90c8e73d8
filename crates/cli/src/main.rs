mod error;
mod logging;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use usda_core::{BindingConfig, BindingTable};

use crate::error::CliError;

/// Output format for error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// How far to run the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StageArg {
    /// Lowered block records, attributes still attached
    Lowered,
    /// Normalized block and override records
    Normalized,
}

/// Convert USDA scene description to namespaced JSON records.
#[derive(Parser)]
#[command(
    name = "usda2json",
    version,
    about = "Convert USDA scene description to namespaced JSON records"
)]
struct Cli {
    /// Path to the .usda source file
    input: PathBuf,

    /// Where to write the JSON document (default: stdout)
    output: Option<PathBuf>,

    /// TOML file extending the built-in namespace bindings
    #[arg(long, value_name = "FILE")]
    bindings: Option<PathBuf>,

    /// Pipeline stage to emit
    #[arg(long, default_value = "normalized", value_enum)]
    stage: StageArg,

    /// Format of error reports on stderr
    #[arg(long, default_value = "text", value_enum)]
    error_format: OutputFormat,

    /// Check the output against the record schema before writing it
    #[arg(long)]
    validate: bool,

    /// Suppress text error reports (the exit status still signals failure)
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

static RECORDS_SCHEMA_STR: &str = include_str!("../../../schema/records-schema.json");

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        report_error(&e, cli.error_format, cli.quiet);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let src = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let filename = cli.input.display().to_string();

    let text = match cli.stage {
        StageArg::Lowered => {
            if cli.validate {
                warn!("--validate only applies to normalized output; skipping");
            }
            let blocks = usda_core::lower_source(&src, &filename)?;
            info!("lowered {} block records", blocks.len());
            usda_core::render(&blocks)?
        }
        StageArg::Normalized => {
            let table = load_bindings(cli.bindings.as_deref())?;
            let records = usda_core::convert(&src, &filename, &table)?;
            info!("converted into {} records", records.len());
            if cli.validate {
                validate_records(&serde_json::to_value(&records)?)?;
                info!("output conforms to the record schema");
            }
            usda_core::render(&records)?
        }
    };

    write_output(cli.output.as_deref(), &text)
}

/// The built-in table, extended by the bindings file if one is given.
fn load_bindings(path: Option<&Path>) -> Result<BindingTable, CliError> {
    let table = BindingTable::default();
    let Some(path) = path else {
        return Ok(table);
    };
    let src = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BindingConfig = toml::from_str(&src).map_err(|source| CliError::Bindings {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "loaded {} bindings and {} dropped keys from {}",
        config.bindings.len(),
        config.drop.len(),
        path.display()
    );
    Ok(table.with_config(config))
}

fn validate_records(doc: &serde_json::Value) -> Result<(), CliError> {
    let schema: serde_json::Value =
        serde_json::from_str(RECORDS_SCHEMA_STR).map_err(|e| CliError::Schema(e.to_string()))?;
    let validator =
        jsonschema::validator_for(&schema).map_err(|e| CliError::Schema(e.to_string()))?;
    let errors: Vec<String> = validator
        .iter_errors(doc)
        .map(|e| format!("{}", e))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::Invalid(errors))
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            fs::write(path, format!("{}\n", text)).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            info!("wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", text)
                .and_then(|()| out.flush())
                .map_err(|source| CliError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }
    Ok(())
}

fn report_error(e: &CliError, format: OutputFormat, quiet: bool) {
    match format {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"message\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
}
