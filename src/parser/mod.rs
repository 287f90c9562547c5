//! Parser layer for reading annotated CSV

pub mod convert;
mod decoder;
pub mod header;
pub mod reader;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

pub use self::convert::{convert, time_format, TimeFormat};
pub use self::decoder::AnnotatedCsvReader;
pub use self::header::read_header;
pub use self::reader::{PeekableReader, RowError};

/// Open an annotated CSV stream from a file, or from stdin for `None` or `-`
pub fn open(path: Option<&Path>) -> Result<AnnotatedCsvReader<Box<dyn Read>>> {
    let input: Box<dyn Read> = match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(std::io::stdin().lock()),
    };
    Ok(AnnotatedCsvReader::new(input))
}
