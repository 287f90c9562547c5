//! annotated-csv - Streaming decoder for annotated CSV
//!
//! Reads the multi-table CSV dialect whose leading `#datatype`, `#group` and
//! `#default` rows describe each table's columns, and renders the decoded
//! tables either as a JSON document or as line protocol.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::Config;
pub use error::{ConvertError, Error, Result};
pub use model::{Column, Row, Table, Value};
pub use parser::AnnotatedCsvReader;
