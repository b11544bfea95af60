//! Tests for the `omexml` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("spw")
        .join(name)
}

fn omexml() -> Command {
    Command::new(env!("CARGO_BIN_EXE_omexml"))
}

const UNRESOLVED: &str = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2010-04">
  <Screen xmlns="http://www.openmicroscopy.org/Schemas/SPW/2010-04" ID="Screen:1">
    <PlateRef ID="Plate:404"/>
  </Screen>
</OME>"#;

#[test]
fn test_convert_to_stdout() {
    omexml()
        .arg("convert")
        .arg(fixture("plate_screen.xml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains(r#"<ReagentRef ID="Reagent:1"/>"#))
        .stdout(predicate::str::contains("<Value>384</Value>"));
}

#[test]
fn test_convert_to_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.xml");

    omexml()
        .arg("convert")
        .arg(fixture("plate_screen.xml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let written = fs::read_to_string(&output).unwrap();
    let parsed = omexml::parse_document(&written, omexml::Schema::v2010_04()).unwrap();
    assert_eq!(parsed.graph.summary().entities, 19);
}

#[test]
fn test_convert_reports_unresolved_references() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("unresolved.xml");
    fs::write(&input, UNRESOLVED).unwrap();

    omexml()
        .arg("convert")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Plate:404"))
        .stdout(predicate::str::contains("<Screen"));

    omexml()
        .arg("convert")
        .arg(&input)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be resolved"));
}

#[test]
fn test_inspect_json() {
    let output = omexml()
        .arg("inspect")
        .arg(fixture("plate_screen.xml"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["entities"], 19);
    assert_eq!(report["references"], 10);
    assert_eq!(report["kinds"]["Well"], 2);
    assert_eq!(report["unresolved"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_inspect_text() {
    omexml()
        .arg("inspect")
        .arg(fixture("plate_screen.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Entities: 19"))
        .stdout(predicate::str::contains("References: 10"));
}

#[test]
fn test_missing_input_file() {
    omexml()
        .arg("inspect")
        .arg("does-not-exist.xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: IO error"));
}
