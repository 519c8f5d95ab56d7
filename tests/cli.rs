use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_markup(width_range: &str) -> NamedTempFile {
    let markup = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
  <body>
    <label>Width <input type="range" id="width" {width_range}/></label>
    <span id="widthValue">2</span>
    <label>Height <input type="range" id="height" min="2" max="6" step="0.1" value="5"/></label>
    <span id="heightValue">5</span>
    <canvas id="scene"></canvas>
  </body>
</html>
"#
    );
    let mut tmp = NamedTempFile::new().expect("temp markup");
    tmp.write_all(markup.as_bytes()).expect("write markup");
    tmp
}

#[test]
fn summary_describes_the_default_door() {
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Door 2 x 4 (panel 1.80 x 3.80)"))
        .stdout(contains(
            " - handle cylinder r=0.05 l=0.20 at (0.80, 0.00, 0.05)",
        ))
        .stdout(contains("floor contact y=-2.00"));
}

#[test]
fn width_flag_rebuilds_the_door() {
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.args(["--summary-only", "--width", "3"])
        .assert()
        .success()
        .stdout(contains("Door 3 x 4 (panel 2.80 x 3.80)"))
        .stdout(contains("floor contact y=-2.00"));
}

#[test]
fn markup_sets_the_initial_values() {
    let markup = write_markup(r#"min="1" max="4" step="0.5" value="1.5""#);
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.arg("--summary-only")
        .arg("--markup")
        .arg(markup.path())
        .assert()
        .success()
        .stdout(contains("Door 1.5 x 5 (panel 1.30 x 4.80)"))
        .stdout(contains("floor contact y=-2.00"));
}

#[test]
fn markup_without_inputs_is_rejected() {
    let mut tmp = NamedTempFile::new().expect("temp markup");
    tmp.write_all(b"<html><body><canvas id=\"scene\"/></body></html>")
        .expect("write markup");
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.arg("--summary-only")
        .arg("--markup")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(contains(r#"<input id="width"> is missing"#));
}

#[test]
fn invalid_width_fails_with_a_dimension_error() {
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.args(["--summary-only", "--width", "0.1"])
        .assert()
        .failure()
        .stderr(contains("invalid door width 0.1"));
}

#[test]
fn unknown_arguments_print_usage() {
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.arg("--run-scripts")
        .assert()
        .failure()
        .stderr(contains("Usage: door-configurator"));
}

#[test]
fn config_file_sets_the_initial_door() {
    let mut config = NamedTempFile::new().expect("temp config");
    config
        .write_all(
            br#"{
  "controls": {
    "width": { "min": 1, "max": 4, "step": 0.1, "value": 2.5 },
    "height": { "min": 2, "max": 6, "step": 0.1, "value": 3 }
  }
}"#,
        )
        .expect("write config");
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.arg("--summary-only")
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(contains("Door 2.5 x 3 (panel 2.30 x 2.80)"));
}

#[test]
fn width_flag_overrides_the_config_file() {
    let mut config = NamedTempFile::new().expect("temp config");
    config
        .write_all(br#"{ "window": { "title": "Showroom" } }"#)
        .expect("write config");
    let mut cmd = Command::cargo_bin("door-configurator").expect("binary exists");
    cmd.args(["--summary-only", "--width", "3.5", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(contains("Door 3.5 x 4 (panel 3.30 x 3.80)"));
}
