//! Table, Row, and Value data structures

use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use super::schema::Column;

/// A typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    String(String),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Borrow the timestamp payload, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }
}

/// RFC 3339 text with nanosecond precision, trailing fraction zeros
/// trimmed and `Z` for UTC
pub(crate) fn format_rfc3339_nano(t: &DateTime<FixedOffset>) -> String {
    let text = t.to_rfc3339_opts(SecondsFormat::Nanos, true);
    // The fraction always sits between the seconds and the offset.
    let Some(dot) = text.find('.') else {
        return text;
    };
    let offset = text[dot..]
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .map_or(text.len(), |i| dot + i);
    let fraction = text[dot + 1..offset].trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{}", &text[..dot], &text[offset..])
    } else {
        format!("{}.{}{}", &text[..dot], fraction, &text[offset..])
    }
}

/// JSON number text in plain decimal, switching to exponent form (`1e-7`,
/// `1e+21`) below 1e-6 or from 1e21 on
fn json_number(x: f64) -> String {
    let abs = x.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let sci = format!("{:e}", x);
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => sci,
        }
    } else {
        x.to_string()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::UInt64(u) => serializer.serialize_u64(*u),
            Value::Float64(f) => {
                // Non-finite numbers have no JSON form and fail here.
                let number = RawValue::from_string(json_number(*f)).map_err(S::Error::custom)?;
                number.serialize(serializer)
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Timestamp(t) => serializer.serialize_str(&format_rfc3339_nano(t)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int64(i) => write!(f, "{}", i),
            Value::UInt64(u) => write!(f, "{}", u),
            Value::Float64(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Timestamp(t) => f.write_str(&format_rfc3339_nano(t)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt64(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(t)
    }
}

/// A decoded data row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Values keyed by column name, in column order
    pub values: IndexMap<String, Value>,
    /// Line number of the row in the input (1-indexed)
    pub source_line: usize,
}

impl Row {
    /// Create an empty row read from the given line
    pub fn new(source_line: usize) -> Self {
        Self {
            values: IndexMap::new(),
            source_line,
        }
    }

    /// Get a value by column name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a value, replacing any earlier value for the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Number of values in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One table of an annotated CSV stream
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Columns in header order
    pub schema: Vec<Column>,
    /// Columns keyed by name. A later column with the same name replaces
    /// an earlier one here; `schema` keeps both.
    pub columns: IndexMap<String, Column>,
    /// Data rows in input order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table from positional column definitions
    pub fn new(schema: Vec<Column>) -> Self {
        let mut columns = IndexMap::with_capacity(schema.len());
        for col in &schema {
            columns.insert(col.name.clone(), col.clone());
        }
        Self {
            schema,
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a decoded row
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the header, duplicates included
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }
}
