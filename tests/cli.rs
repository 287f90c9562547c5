use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const LINE_PROTOCOL_INPUT: &str = "#datatype,string,string,double,dateTime:RFC3339,string\n\
                                   ,_measurement,_field,_value,_time,host\n\
                                   ,cpu,temp,1.5,2023-01-01T00:00:00Z,a\n";

fn cmd() -> Command {
    Command::cargo_bin("annotated-csv").unwrap()
}

#[test]
fn json_from_stdin() {
    cmd()
        .arg("--compact")
        .write_stdin("#datatype,string,long\n,,value\n,m,1\n,m,2\n")
        .assert()
        .success()
        .stdout(
            "[{\"columns\":{\"value\":{\"index\":2,\"name\":\"value\",\"type\":\"long\"}},\
             \"rows\":[{\"value\":1},{\"value\":2}]}]\n",
        );
}

#[test]
fn line_protocol_from_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("cpu.csv");
    fs::write(&input, LINE_PROTOCOL_INPUT).unwrap();

    cmd()
        .args(["--format", "line-protocol"])
        .arg(&input)
        .assert()
        .success()
        .stdout("cpu,host=a temp=1.5 1672531200000000000\n");
}

#[test]
fn writes_output_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.lp");

    cmd()
        .args(["-f", "line-protocol", "-o"])
        .arg(&output)
        .write_stdin(LINE_PROTOCOL_INPUT)
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "cpu,host=a temp=1.5 1672531200000000000\n"
    );
}

#[test]
fn decode_error_exits_with_failure() {
    cmd()
        .write_stdin("#datatype,string,long\n,,v\n,,1\n,,2,3\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("inconsistent number of columns at line 4"));
}

#[test]
fn failed_conversion_leaves_no_output_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.json");

    cmd()
        .arg("-o")
        .arg(&output)
        .write_stdin("#datatype,string,long\n,,v\n,,1\n#datatype,string,long\n,,w\n,,x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse \"x\" as type \"long\" at line 6"));

    assert!(!output.exists());
}

#[test]
fn missing_column_is_reported() {
    cmd()
        .args(["--format", "line-protocol"])
        .write_stdin("#datatype,string,string\n,_measurement,_field\n,m,f\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no _value column found in table"));
}

#[test]
fn unknown_annotation_warns_and_continues() {
    cmd()
        .arg("--compact")
        .write_stdin("#datatype,string,long\n#unit,,ms\n,,v\n,,1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows\":[{\"v\":1}]"))
        .stderr(predicate::str::contains("unknown column annotation"));
}

#[test]
fn missing_input_file() {
    cmd()
        .arg("does-not-exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open file"));
}
