//! Table header parsing: annotation rows followed by the column names row

use std::io::Read;

use log::warn;

use crate::error::{Error, Result};
use crate::model::Column;

use super::convert::convert;
use super::reader::PeekableReader;

/// First-field prefix of annotation rows
pub const ANNOTATION_PREFIX: char = '#';

/// Whether a row is an annotation row (and so starts a table header)
pub fn is_annotation(row: &[String]) -> bool {
    row.first()
        .is_some_and(|first| first.starts_with(ANNOTATION_PREFIX))
}

/// Read one table header and return its columns.
///
/// Consumes any `#datatype`, `#group` and `#default` rows followed by the
/// row of column names. Returns `Ok(None)` when the input ends before a
/// column names row is found.
pub fn read_header<R: Read>(reader: &mut PeekableReader<R>) -> Result<Option<Vec<Column>>> {
    let mut cols: Vec<Column> = Vec::new();
    let mut defaults: Option<(Vec<String>, usize)> = None;

    loop {
        let row = match reader.read() {
            Ok(row) => row,
            Err(err) => {
                if let Some(err) = err.into_error() {
                    return Err(err);
                }
                if !cols.is_empty() {
                    warn!(
                        "input ended at line {} before the header row; annotations discarded",
                        reader.line()
                    );
                }
                return Ok(None);
            }
        };
        let line = reader.line();

        if cols.is_empty() {
            if row.is_empty() {
                return Err(Error::MissingHeader { line });
            }
            cols = (0..row.len()).map(|i| Column::new("", i)).collect();
        } else if row.len() != cols.len() {
            return Err(Error::HeaderMismatch {
                line,
                got: row.len(),
                want: cols.len(),
            });
        }

        if !is_annotation(&row) {
            for (col, name) in cols.iter_mut().zip(row) {
                col.name = name;
            }
            break;
        }

        match row[0].as_str() {
            "#datatype" => {
                for (col, data_type) in cols.iter_mut().zip(&row).skip(1) {
                    col.data_type = data_type.clone();
                }
            }
            "#group" => {
                for (col, group) in cols.iter_mut().zip(&row).skip(1) {
                    col.group = group == "true";
                }
            }
            "#default" => defaults = Some((row.clone(), line)),
            key => warn!("unknown column annotation {:?} at line {}", key, line),
        }
    }

    // Defaults can only be converted once every column's type is known.
    if let Some((defaults, line)) = defaults {
        for (col, text) in cols.iter_mut().zip(defaults).skip(1) {
            if text.is_empty() {
                continue;
            }
            let value = convert(&text, &col.data_type).map_err(|source| Error::Default {
                text,
                data_type: col.data_type.clone(),
                line,
                source,
            })?;
            col.default = Some(value);
        }
    }

    Ok(Some(cols))
}
