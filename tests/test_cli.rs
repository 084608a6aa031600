mod fixtures;

use fixtures::*;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

// RT_VERSION, RT_MESSAGETABLE, RT_MANIFEST, in the order the sample lists them.
const EXPECTED_TYPES: [u16; 3] = [16, 11, 24];

#[test]
fn it_writes_every_section_to_the_output_file() {
    let d = tempdir().unwrap();
    let out = d.path().join("app.res");

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.args([
        "-o",
        &out.to_string_lossy(),
        regular_sample().to_str().unwrap(),
    ]);
    cmd.assert().success();

    let entries = read_res_entries(&fs::read(&out).unwrap());
    let types: Vec<u16> = entries.iter().map(|(kind, ..)| *kind).collect();
    assert_eq!(types.as_slice(), &EXPECTED_TYPES);
    assert!(entries.iter().all(|(_, id, language, _)| *id == 1 && *language == 0x0409));

    let manifest = &entries[2].3;
    assert_eq!(manifest, &fs::read(sample_manifest()).unwrap());
}

#[test]
fn test_it_defaults_output_next_to_the_input() {
    let d = tempdir().unwrap();
    let input = d.path().join("app.json");
    fs::copy(regular_sample(), &input).unwrap();
    fs::copy(sample_manifest(), d.path().join("app.manifest")).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.arg(&input);
    cmd.assert().success();

    assert!(d.path().join("app.res").is_file());
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.args([
        "-o",
        &d.path().to_string_lossy(),
        regular_sample().to_str().unwrap(),
    ]);

    cmd.assert().failure().code(1);
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let out = d.path().join("app.res");
    fs::write(&out, b"I'm a file!").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.args([
        "-o",
        &out.to_string_lossy(),
        "--no-confirm-overwrite",
        regular_sample().to_str().unwrap(),
    ]);
    cmd.assert().success();

    let entries = read_res_entries(&fs::read(&out).unwrap());
    assert_eq!(entries.len(), EXPECTED_TYPES.len());
}

#[test]
fn test_invalid_field_is_reported_and_nothing_is_written() {
    let d = tempdir().unwrap();
    let out = d.path().join("bad.res");

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.args([
        "-o",
        &out.to_string_lossy(),
        sample_with_an_invalid_severity().to_str().unwrap(),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("messageTable[0].severity"))
        .stderr(predicate::str::contains("Fatal"));
    assert!(!out.exists());
}

#[test]
fn test_summary_prints_one_line_per_resource() {
    let d = tempdir().unwrap();
    let out = d.path().join("app.res");

    let mut cmd = Command::new(assert_cmd::cargo_bin!("rcjson"));
    cmd.args([
        "-o",
        &out.to_string_lossy(),
        "--summary",
        regular_sample().to_str().unwrap(),
    ]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["RT_VERSION", "RT_MESSAGETABLE", "RT_MANIFEST"]);
    assert_eq!(lines[0]["language"], 0x0409);
}
