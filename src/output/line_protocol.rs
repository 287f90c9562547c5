//! Line protocol output format
//!
//! Each table must carry `_measurement`, `_field`, `_value` and `_time`
//! columns; every other named column becomes a tag. One line is written
//! per data row:
//!
//! ```text
//! measurement[,tag=value]* field=value timestamp
//! ```

use std::io::{BufWriter, Write};

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Result};
use crate::model::{format_rfc3339_nano, Row, Table, Value};

use super::Encoder;

const MEASUREMENT: &str = "_measurement";
const FIELD: &str = "_field";
const VALUE: &str = "_value";
const TIME: &str = "_time";

/// Line protocol encoder
#[derive(Default)]
pub struct LineProtocolOutput;

impl LineProtocolOutput {
    pub fn new() -> Self {
        Self
    }
}

/// Tag columns of a table, resolved once per table
#[derive(Debug)]
struct TableLayout<'a> {
    /// (tag key, source column name) in column order
    tags: Vec<(&'a str, &'a str)>,
}

impl<'a> TableLayout<'a> {
    fn for_table(table: &'a Table) -> Result<Self> {
        let mut found = [false; 4];
        let mut tags = Vec::new();

        for col in &table.schema {
            match col.name.as_str() {
                MEASUREMENT => {
                    found[0] = true;
                    expect_type(MEASUREMENT, &col.data_type, "string")?;
                }
                FIELD => {
                    found[1] = true;
                    expect_type(FIELD, &col.data_type, "string")?;
                }
                VALUE => found[2] = true,
                TIME => {
                    found[3] = true;
                    if !col.is_date_time() {
                        return Err(Error::WrongColumnType {
                            column: TIME,
                            got: col.data_type.clone(),
                            want: "dateTime:*",
                        });
                    }
                }
                "" => {}
                name => tags.push((name.strip_prefix('_').unwrap_or(name), name)),
            }
        }

        for (present, column) in found.iter().zip([MEASUREMENT, FIELD, VALUE, TIME]) {
            if !present {
                return Err(Error::MissingColumn(column));
            }
        }
        Ok(Self { tags })
    }
}

fn expect_type(column: &'static str, got: &str, want: &'static str) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(Error::WrongColumnType {
            column,
            got: got.to_string(),
            want,
        })
    }
}

impl Encoder for LineProtocolOutput {
    fn encode(
        &self,
        tables: &mut dyn Iterator<Item = Result<Table>>,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let mut output = BufWriter::new(writer);
        let mut line = String::new();

        for table in tables {
            let table = table?;
            let layout = TableLayout::for_table(&table)?;
            for row in &table.rows {
                line.clear();
                encode_row(&layout, row, &mut line)?;
                output.write_all(line.as_bytes())?;
            }
        }

        output.flush()?;
        Ok(())
    }
}

fn encode_row(layout: &TableLayout<'_>, row: &Row, line: &mut String) -> Result<()> {
    push_key_value(line, required(row, MEASUREMENT)?, false)?;
    for (key, column) in &layout.tags {
        line.push(',');
        push_escaped(line, key, true);
        line.push('=');
        push_key_value(line, required(row, column)?, true)?;
    }

    line.push(' ');
    push_key_value(line, required(row, FIELD)?, true)?;
    line.push('=');
    push_field_value(line, required(row, VALUE)?)?;

    let time = required(row, TIME)?;
    let time = time.as_timestamp().ok_or(Error::UnexpectedValue {
        column: TIME,
        kind: time.kind(),
    })?;
    line.push(' ');
    line.push_str(&unix_nanos(time)?.to_string());
    line.push('\n');
    Ok(())
}

fn required<'r>(row: &'r Row, column: &str) -> Result<&'r Value> {
    row.get(column).ok_or_else(|| Error::MissingValue {
        column: column.to_string(),
    })
}

fn unix_nanos(t: &DateTime<FixedOffset>) -> Result<i64> {
    t.timestamp_nanos_opt()
        .ok_or_else(|| Error::TimestampOutOfRange(format_rfc3339_nano(t)))
}

/// Escape a measurement, tag key, tag value or field key.
/// `=` is escaped everywhere except in measurements.
fn push_escaped(out: &mut String, s: &str, escape_equals: bool) {
    for c in s.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0c' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            ',' => out.push_str("\\,"),
            ' ' => out.push_str("\\ "),
            '=' if escape_equals => out.push_str("\\="),
            c => out.push(c),
        }
    }
}

/// Render a measurement, tag value or field key. Non-string values are
/// written in their typed form.
fn push_key_value(out: &mut String, value: &Value, escape_equals: bool) -> Result<()> {
    match value {
        Value::String(s) => push_escaped(out, s, escape_equals),
        Value::Int64(i) => {
            out.push_str(&i.to_string());
            out.push('i');
        }
        Value::UInt64(u) => {
            out.push_str(&u.to_string());
            out.push('u');
        }
        Value::Float64(f) => out.push_str(&format_float(*f)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Timestamp(t) => {
            out.push_str(&unix_nanos(t)?.to_string());
            out.push('i');
        }
    }
    Ok(())
}

fn push_field_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Int64(i) => {
            out.push_str(&i.to_string());
            out.push('i');
        }
        Value::UInt64(u) => {
            out.push_str(&u.to_string());
            out.push('u');
        }
        Value::Float64(f) => out.push_str(&format_float(*f)),
        Value::String(s) => {
            out.push('"');
            for c in s.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Timestamp(t) => out.push_str(&unix_nanos(t)?.to_string()),
    }
    Ok(())
}

/// Shortest text that round-trips `x`, switching to exponent form
/// (`1e+06`, `1e-05`) when the decimal exponent is below -4 or at least 6.
pub fn format_float(x: f64) -> String {
    let sci = format!("{:e}", x);
    let parts = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));
    match parts {
        Some((mantissa, exp)) if !(-4..6).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        _ => x.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::parser::AnnotatedCsvReader;

    fn encode(input: &str) -> Result<String> {
        let mut tables = AnnotatedCsvReader::new(input.as_bytes());
        let mut buf = Vec::new();
        LineProtocolOutput::new().encode(&mut tables, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    const HEADER: &str = "#datatype,string,string,double,dateTime:RFC3339,string\n\
                          ,_measurement,_field,_value,_time,host\n";

    #[test]
    fn test_basic_line() {
        let out = encode(&format!("{}{}", HEADER, ",cpu,temp,1.5,2023-01-01T00:00:00Z,a\n")).unwrap();
        assert_eq!(out, "cpu,host=a temp=1.5 1672531200000000000\n");
    }

    #[test]
    fn test_flux_style_table() {
        let input = "#datatype,string,long,dateTime:RFC3339,dateTime:RFC3339,dateTime:RFC3339Nano,long,string,string,string\n\
                     #group,false,false,true,true,false,false,true,true,true\n\
                     #default,_result,,,,,,,,\n\
                     ,result,table,_start,_stop,_time,_value,_field,_measurement,host\n\
                     ,,0,2023-01-01T00:00:00Z,2023-01-01T00:01:00Z,2023-01-01T00:00:30.5Z,42,count,events,h1\n";
        let out = encode(input).unwrap();
        assert_eq!(
            out,
            "events,result=_result,table=0i,start=1672531200000000000i,\
             stop=1672531260000000000i,host=h1 count=42i 1672531230500000000\n"
        );
    }

    #[test]
    fn test_field_value_kinds() {
        let cases = [
            ("long", "-7", "-7i"),
            ("unsignedLong", "7", "7u"),
            ("double", "100", "100"),
            ("double", "1e21", "1e+21"),
            ("double", "1500000", "1.5e+06"),
            ("double", "NaN", "\"NaN\""),
            ("boolean", "true", "true"),
            ("string", "\"say \"\"hi\"\" \\o/\"", "\"say \\\"hi\\\" \\\\o/\""),
            ("dateTime:RFC3339", "1970-01-01T00:00:01Z", "1000000000"),
        ];
        for (data_type, text, expected) in cases {
            let input = format!(
                "#datatype,string,string,{},dateTime:RFC3339\n\
                 ,_measurement,_field,_value,_time\n\
                 ,m,f,{},1970-01-01T00:00:00Z\n",
                data_type, text
            );
            let out = encode(&input).unwrap();
            assert_eq!(out, format!("m f={} 0\n", expected), "type {}", data_type);
        }
    }

    #[test]
    fn test_escaping() {
        let input = format!(
            "{}{}",
            HEADER, ",\"my cpu,x=1\",\"f=1 2\",0.5,2023-01-01T00:00:00Z,\"a b=c\tz\"\n"
        );
        let out = encode(&input).unwrap();
        assert_eq!(
            out,
            "my\\ cpu\\,x=1,host=a\\ b\\=c\\tz f\\=1\\ 2=0.5 1672531200000000000\n"
        );
    }

    #[test]
    fn test_missing_required_column() {
        let err = encode("#datatype,string,string,double\n,_measurement,_field,_value\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn("_time")));

        let err = encode("#datatype,string,double,dateTime:RFC3339\n,_field,_value,_time\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn("_measurement")));
    }

    #[test]
    fn test_wrong_column_types() {
        let err = encode(
            "#datatype,long,string,double,dateTime:RFC3339\n,_measurement,_field,_value,_time\n",
        )
        .unwrap_err();
        match err {
            Error::WrongColumnType { column, got, want } => {
                assert_eq!(column, "_measurement");
                assert_eq!(got, "long");
                assert_eq!(want, "string");
            }
            other => panic!("unexpected error: {}", other),
        }

        let err = encode(
            "#datatype,string,string,double,long\n,_measurement,_field,_value,_time\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::WrongColumnType {
                column: "_time",
                ..
            }
        ));
    }

    #[test]
    fn test_multiple_tables_concatenate() {
        let input = format!(
            "{h}{r1}{h}{r2}",
            h = HEADER,
            r1 = ",cpu,a,1,2023-01-01T00:00:00Z,x\n",
            r2 = ",mem,b,2,2023-01-01T00:00:01Z,y\n"
        );
        let out = encode(&input).unwrap();
        assert_eq!(
            out,
            "cpu,host=x a=1 1672531200000000000\nmem,host=y b=2 1672531201000000000\n"
        );
    }

    #[test]
    fn test_non_timestamp_time_value() {
        let mut table = Table::new(vec![
            Column::with_type("_measurement", 0, "string"),
            Column::with_type("_field", 1, "string"),
            Column::with_type("_value", 2, "long"),
            Column::with_type("_time", 3, "dateTime:RFC3339"),
        ]);
        let mut row = Row::new(1);
        row.insert("_measurement", Value::from("m"));
        row.insert("_field", Value::from("f"));
        row.insert("_value", Value::Int64(1));
        row.insert("_time", Value::from("later"));
        table.add_row(row);

        let mut tables = std::iter::once(Ok::<_, Error>(table));
        let err = LineProtocolOutput::new()
            .encode(&mut tables, &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedValue {
                column: "_time",
                kind: "string"
            }
        ));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(100.0), "100");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(1e6), "1e+06");
        assert_eq!(format_float(1234567.0), "1.234567e+06");
        assert_eq!(format_float(-2.5e7), "-2.5e+07");
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1.25e21), "1.25e+21");
        assert_eq!(format_float(1e100), "1e+100");
        assert_eq!(format_float(0.0), "0");
    }
}
