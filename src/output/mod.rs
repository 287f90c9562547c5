//! Output encoders for decoded tables

mod json;
mod line_protocol;

use std::fs::{self, File};
use std::io::{BufWriter, Write};

use anyhow::Context;

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::model::Table;
use crate::parser;

pub use json::JsonOutput;
pub use line_protocol::{format_float, LineProtocolOutput};

/// Trait for table encoders
pub trait Encoder {
    /// Pull tables from `tables` and write their encoding to `writer`.
    ///
    /// The first decoding error ends encoding and is returned as is.
    fn encode(
        &self,
        tables: &mut dyn Iterator<Item = Result<Table>>,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Factory for creating encoders
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the configured output format
    pub fn create(config: &Config) -> Box<dyn Encoder> {
        match config.output_format {
            OutputFormat::Json if config.compact => Box::new(JsonOutput::compact()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::LineProtocol => Box::new(LineProtocolOutput::new()),
        }
    }
}

/// Decode the configured input and write it to the configured output.
///
/// An output file is removed again when encoding fails, so a failed run
/// leaves no truncated document behind. Output already written to stdout
/// stays written.
pub fn render(config: &Config) -> anyhow::Result<()> {
    let mut tables = parser::open(config.input.as_deref())?;
    let encoder = EncoderFactory::create(config);

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            if let Err(err) = write_file(encoder.as_ref(), &mut tables, file) {
                if let Err(remove_err) = fs::remove_file(path) {
                    log::warn!("could not remove {}: {}", path.display(), remove_err);
                }
                return Err(err.into());
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            encoder.encode(&mut tables, &mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn write_file(
    encoder: &dyn Encoder,
    tables: &mut dyn Iterator<Item = Result<Table>>,
    file: File,
) -> Result<()> {
    let mut writer = BufWriter::new(file);
    encoder.encode(tables, &mut writer)?;
    writer.flush()?;
    Ok(())
}
