use assert_cmd::Command;
use predicates::prelude::*;

mod common;

use common::{I07_2021_FIXTURE, I07_2022_FIXTURE, I10_FIXTURE};

fn nxmeta() -> Command {
    let mut cmd = Command::cargo_bin("nxmeta").unwrap();
    cmd.env_remove("NXMETA_BEAMLINE");
    cmd.env_remove("NXMETA_SEARCH_ROOTS");
    cmd
}

#[test]
fn runs() {
    nxmeta()
        .assert()
        .success()
        .stdout(predicate::str::contains("nxmeta 0.1.0"));
}

#[test]
fn outputs_tool_name() {
    let mut cmd = nxmeta();
    cmd.arg("-V");
    cmd.assert().success().stdout("nxmeta 0.1.0\n");
}

// Inspect subcommand tests

#[test]
fn inspect_text_report() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", I07_2022_FIXTURE, "--no-data-file"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Probe energy"))
        .stdout(predicate::str::contains("12.5"))
        .stdout(predicate::str::contains("exr"))
        .stdout(predicate::str::contains("x 1050..1074, y 58..70 (288 px)"))
        .stdout(predicate::str::contains("unavailable").not());
}

#[test]
fn inspect_finds_data_file_next_to_nexus_file() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", I07_2022_FIXTURE]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "tests/fixtures/excalibur-446263.h5",
        ));
}

#[test]
fn inspect_json_report() {
    let mut cmd = nxmeta();
    cmd.args([
        "inspect",
        I07_2021_FIXTURE,
        "--no-data-file",
        "--output",
        "json",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(report["beamline"], "I07");
    assert_eq!(report["detector"]["value"], "excroi");
    assert_eq!(report["default_axis_type"]["value"], "tth");
    assert_eq!(report["transmission"]["value"], 0.0013);
    assert_eq!(
        report["signal_regions"]["value"][0],
        serde_json::json!({"x_start": 100, "x_end": 150, "y_start": 200, "y_end": 220})
    );
    assert!(report.get("local_data_path").is_none());
}

#[test]
fn inspect_reads_beamline_from_env() {
    let mut cmd = nxmeta();
    cmd.env("NXMETA_BEAMLINE", "i10");
    cmd.args(["inspect", I10_FIXTURE, "--no-data-file"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Beamline:   I10"))
        .stdout(predicate::str::contains("field(s) unavailable"));
}

#[test]
fn inspect_strict_fails_on_unavailable_fields() {
    let mut cmd = nxmeta();
    cmd.args([
        "inspect",
        I10_FIXTURE,
        "--beamline",
        "i10",
        "--no-data-file",
        "--strict",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("field(s) unavailable"));
}

#[test]
fn inspect_strict_passes_when_everything_is_read() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", I07_2022_FIXTURE, "--strict"]);
    cmd.assert().success();
}

#[test]
fn inspect_rejects_unknown_beamline() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", I07_2022_FIXTURE, "--beamline", "i16"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("supported: i07, i10"));
}

#[test]
fn inspect_rejects_unknown_output_format() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", I07_2022_FIXTURE, "--output", "yaml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("supported: text, json"));
}

#[test]
fn inspect_missing_input_fails() {
    let mut cmd = nxmeta();
    cmd.args(["inspect", "tests/fixtures/nope.nxs.json"]);
    cmd.assert().failure().stderr(predicate::str::contains("Error:"));
}

// Locate subcommand tests

#[test]
fn locate_existing_file() {
    let mut cmd = nxmeta();
    cmd.args(["locate", "Cargo.toml"]);
    cmd.assert().success().stdout("Cargo.toml\n");
}

#[test]
fn locate_under_search_root() {
    let mut cmd = nxmeta();
    cmd.args([
        "locate",
        "/dls/i07/data/2022/si32333-1/i07_excalibur_2022.nxs.json",
        "--search-root",
        "tests/fixtures",
    ]);
    cmd.assert()
        .success()
        .stdout("tests/fixtures/i07_excalibur_2022.nxs.json\n");
}

#[test]
fn locate_missing_file_fails() {
    let mut cmd = nxmeta();
    cmd.args(["locate", "/dls/i07/data/2022/si00000-1/excalibur-1.h5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("could not be found"));
}
