//! Error types for decoding and encoding

use std::sync::Arc;

use thiserror::Error;

/// Failure converting a single field to its declared type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("invalid boolean syntax")]
    InvalidBool,
    #[error(transparent)]
    InvalidInt(#[from] std::num::ParseIntError),
    #[error(transparent)]
    InvalidFloat(#[from] std::num::ParseFloatError),
    #[error("unknown time format {0:?}")]
    UnknownTimeFormat(String),
    #[error(transparent)]
    InvalidTime(#[from] chrono::ParseError),
}

/// Errors produced while decoding annotated CSV or encoding its tables
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed CSV at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: Arc<csv::Error>,
    },

    #[error("no columns in table header at line {line}")]
    MissingHeader { line: usize },

    #[error("inconsistent table header at line {line} (got {got} items want {want})")]
    HeaderMismatch { line: usize, got: usize, want: usize },

    #[error("inconsistent number of columns at line {line} (got {got} want {want})")]
    RowMismatch { line: usize, got: usize, want: usize },

    #[error("cannot parse {text:?} as type {data_type:?} at line {line}: {source}")]
    Conversion {
        text: String,
        data_type: String,
        line: usize,
        #[source]
        source: ConvertError,
    },

    #[error("cannot convert default value {text:?} to type {data_type:?} at line {line}: {source}")]
    Default {
        text: String,
        data_type: String,
        line: usize,
        #[source]
        source: ConvertError,
    },

    #[error("no {0} column found in table")]
    MissingColumn(&'static str),

    #[error("{column} column has wrong type, got {got:?} want {want:?}")]
    WrongColumnType {
        column: &'static str,
        got: String,
        want: &'static str,
    },

    #[error("unexpected value type in {column}: {kind}")]
    UnexpectedValue {
        column: &'static str,
        kind: &'static str,
    },

    #[error("row has no value for column {column}")]
    MissingValue { column: String },

    #[error("timestamp {0} cannot be represented in nanoseconds")]
    TimestampOutOfRange(String),

    #[error("cannot write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
