//! JSON document output format

use std::cell::RefCell;
use std::io::Write;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::model::{Column, Table, Value};

use super::Encoder;

/// JSON document encoder
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of one table
#[derive(Serialize)]
struct JsonTable<'a> {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    columns: IndexMap<&'a str, &'a Column>,
    rows: Vec<&'a IndexMap<String, Value>>,
}

impl<'a> JsonTable<'a> {
    fn new(table: &'a Table) -> Self {
        let mut columns = IndexMap::new();
        for col in &table.schema {
            if col.is_ignored() {
                continue;
            }
            columns.insert(col.name.as_str(), col);
        }
        Self {
            columns,
            rows: table.rows.iter().map(|row| &row.values).collect(),
        }
    }
}

/// Serializes tables as a JSON array while pulling them from the decoder,
/// so only one table is held at a time.
struct TableStream<'a> {
    tables: RefCell<&'a mut dyn Iterator<Item = Result<Table>>>,
    failure: RefCell<Option<Error>>,
}

impl Serialize for TableStream<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        let mut tables = self.tables.borrow_mut();
        while let Some(table) = tables.next() {
            match table {
                Ok(table) => seq.serialize_element(&JsonTable::new(&table))?,
                Err(err) => {
                    *self.failure.borrow_mut() = Some(err);
                    return Err(S::Error::custom("table decoding failed"));
                }
            }
        }
        seq.end()
    }
}

impl Encoder for JsonOutput {
    fn encode(
        &self,
        tables: &mut dyn Iterator<Item = Result<Table>>,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let stream = TableStream {
            tables: RefCell::new(tables),
            failure: RefCell::new(None),
        };

        let result = if self.pretty {
            let formatter = PrettyFormatter::with_indent(b"\t");
            let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
            stream.serialize(&mut serializer)
        } else {
            let mut serializer = serde_json::Serializer::new(&mut *writer);
            stream.serialize(&mut serializer)
        };

        if let Err(err) = result {
            // A decoding error surfaces as a serializer error; report the original.
            return Err(stream.failure.into_inner().unwrap_or(Error::Json(err)));
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}
