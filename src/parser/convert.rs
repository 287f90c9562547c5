//! Conversion of raw CSV fields to typed values

use chrono::{DateTime, FixedOffset, ParseResult, SecondsFormat};
use log::warn;

use crate::error::ConvertError;
use crate::model::{format_rfc3339_nano, Value, DATE_TIME_PREFIX};

/// A named timestamp layout usable as `dateTime:<name>`
pub struct TimeFormat {
    pub name: &'static str,
    parse: fn(&str) -> ParseResult<DateTime<FixedOffset>>,
    format: fn(&DateTime<FixedOffset>) -> String,
}

impl TimeFormat {
    /// Parse text laid out in this format
    pub fn parse(&self, text: &str) -> ParseResult<DateTime<FixedOffset>> {
        (self.parse)(text)
    }

    /// Render a timestamp in this format
    pub fn format(&self, t: &DateTime<FixedOffset>) -> String {
        (self.format)(t)
    }
}

/// Registry of the timestamp layouts understood by `dateTime:` columns
static TIME_FORMATS: &[TimeFormat] = &[
    TimeFormat {
        name: "RFC3339",
        parse: parse_rfc3339,
        format: format_rfc3339,
    },
    TimeFormat {
        name: "RFC3339Nano",
        parse: parse_rfc3339,
        format: format_rfc3339_nano,
    },
];

// Both layouts accept an optional fractional second when parsing.
fn parse_rfc3339(text: &str) -> ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
}

fn format_rfc3339(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Look up a timestamp layout by name
pub fn time_format(name: &str) -> Option<&'static TimeFormat> {
    TIME_FORMATS.iter().find(|f| f.name == name)
}

/// Convert `text` to the type named by the `#datatype` tag `data_type`.
///
/// Unknown type tags are not an error: the text is kept as a string and a
/// warning is logged.
pub fn convert(text: &str, data_type: &str) -> Result<Value, ConvertError> {
    match data_type {
        "boolean" => parse_bool(text).map(Value::Bool),
        "long" => Ok(Value::Int64(text.parse()?)),
        "unsignedLong" => Ok(Value::UInt64(text.parse()?)),
        "double" => {
            let x: f64 = text.parse()?;
            if x.is_finite() {
                Ok(Value::Float64(x))
            } else {
                Ok(Value::String(text.to_string()))
            }
        }
        "string" | "tag" | "" => Ok(Value::String(text.to_string())),
        _ => match data_type.strip_prefix(DATE_TIME_PREFIX) {
            Some(name) => {
                let format = time_format(name)
                    .ok_or_else(|| ConvertError::UnknownTimeFormat(data_type.to_string()))?;
                Ok(Value::Timestamp(format.parse(text)?))
            }
            None => {
                warn!("unknown datatype {:?}", data_type);
                Ok(Value::String(text.to_string()))
            }
        },
    }
}

fn parse_bool(text: &str) -> Result<bool, ConvertError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConvertError::InvalidBool),
    }
}
