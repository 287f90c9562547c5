//! Table and stream decoding

use std::io::Read;

use log::debug;

use crate::error::{Error, Result};
use crate::model::{Column, Row, Table};

use super::convert::convert;
use super::header::{is_annotation, read_header};
use super::reader::{PeekableReader, RowError};

/// Decoder for a stream of annotated CSV tables.
///
/// Tables are read lazily, one at a time, either with
/// [`next_table`](Self::next_table) or by iterating. Iteration stops after
/// the first error.
pub struct AnnotatedCsvReader<R> {
    reader: PeekableReader<R>,
    done: bool,
}

impl<R: Read> AnnotatedCsvReader<R> {
    /// Create a decoder over raw CSV text
    pub fn new(reader: R) -> Self {
        Self::from_rows(PeekableReader::new(reader))
    }

    /// Create a decoder over an existing row source
    pub fn from_rows(reader: PeekableReader<R>) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Line number of the last row read
    pub fn line(&self) -> usize {
        self.reader.line()
    }

    /// Decode the next table, or `None` at end of input
    pub fn next_table(&mut self) -> Result<Option<Table>> {
        let Some(columns) = read_header(&mut self.reader)? else {
            return Ok(None);
        };
        let mut table = Table::new(columns);
        debug!(
            "table with {} columns, header ends at line {}",
            table.column_count(),
            self.reader.line()
        );

        loop {
            match self.reader.peek() {
                // The next table's annotations.
                Ok(row) if is_annotation(row) => break,
                Ok(_) => {}
                Err(RowError::EndOfInput) => break,
                Err(RowError::Malformed { line, source }) => return Err(Error::Csv { line, source }),
            }
            let Some(fields) = row_or_end(self.reader.read())? else {
                break;
            };
            let row = decode_row(&table.schema, fields, self.reader.line())?;
            table.add_row(row);
        }

        debug!("table ended at line {} with {} rows", self.reader.line(), table.row_count());
        Ok(Some(table))
    }

    /// Decode every remaining table
    pub fn read_all(self) -> Result<Vec<Table>> {
        self.collect()
    }
}

impl<R: Read> Iterator for AnnotatedCsvReader<R> {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_table() {
            Ok(Some(table)) => Some(Ok(table)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// End of input becomes `None`; other read failures are errors
fn row_or_end(result: std::result::Result<Vec<String>, RowError>) -> Result<Option<Vec<String>>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(err) => match err.into_error() {
            Some(err) => Err(err),
            None => Ok(None),
        },
    }
}

/// Decode the raw fields of one data row against the table's columns
fn decode_row(schema: &[Column], fields: Vec<String>, line: usize) -> Result<Row> {
    if fields.len() != schema.len() {
        return Err(Error::RowMismatch {
            line,
            got: fields.len(),
            want: schema.len(),
        });
    }

    let mut row = Row::new(line);
    for (col, text) in schema.iter().zip(fields) {
        if text.is_empty() {
            if let Some(default) = &col.default {
                row.insert(col.name.clone(), default.clone());
                continue;
            }
        }
        if col.is_ignored() {
            continue;
        }
        let value = convert(&text, &col.data_type).map_err(|source| Error::Conversion {
            text,
            data_type: col.data_type.clone(),
            line,
            source,
        })?;
        row.insert(col.name.clone(), value);
    }
    Ok(row)
}
