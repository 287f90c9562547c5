//! annotated-csv - Convert annotated CSV to JSON or line protocol

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use annotated_csv::config::{Config, OutputFormat};
use annotated_csv::output::render;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Json,
    LineProtocol,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::LineProtocol => OutputFormat::LineProtocol,
        }
    }
}

/// Convert annotated CSV to a JSON document or to line protocol
#[derive(Parser, Debug)]
#[command(name = "annotated-csv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Annotated CSV input file (reads stdin when absent or "-")
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: CliOutputFormat,

    /// Write output to this file instead of stdout (removed again if
    /// conversion fails)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::new(cli.input)
        .with_output(cli.output)
        .with_output_format(cli.format.into())
        .with_compact(cli.compact);

    render(&config)
}
