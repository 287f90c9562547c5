//! Column metadata declared by annotation rows

use serde::Serialize;

use super::table::Value;

/// Prefix of the `dateTime:<format>` family of type tags
pub const DATE_TIME_PREFIX: &str = "dateTime:";

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Column index (0-based position in the header row)
    pub index: usize,
    /// Column name from the header row; empty for anonymous columns
    pub name: String,
    /// Value of the `#group` annotation
    #[serde(skip_serializing_if = "is_false")]
    pub group: bool,
    /// Converted value of the `#default` annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Raw type tag from the `#datatype` annotation
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub data_type: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Column {
    /// Create an untyped column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            index,
            name: name.into(),
            group: false,
            default: None,
            data_type: String::new(),
        }
    }

    /// Create a column with a declared type tag
    pub fn with_type(name: impl Into<String>, index: usize, data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            ..Self::new(name, index)
        }
    }

    /// Anonymous columns without a default never contribute to rows
    pub fn is_ignored(&self) -> bool {
        self.name.is_empty() && self.default.is_none()
    }

    /// Whether the declared type is one of the `dateTime:` tags
    pub fn is_date_time(&self) -> bool {
        self.data_type.starts_with(DATE_TIME_PREFIX)
    }
}
