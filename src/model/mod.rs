//! Data model for decoded annotated CSV tables

mod schema;
mod table;

pub use schema::{Column, DATE_TIME_PREFIX};
pub use table::{Row, Table, Value};

pub(crate) use table::format_rfc3339_nano;
