//! CLI integration tests for `usda2json`.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to fixtures resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `usda2json` binary, rooted at workspace.
fn usda2json() -> Command {
    let mut cmd = cargo_bin_cmd!("usda2json");
    cmd.current_dir(workspace_root()).env_remove("RUST_LOG");
    cmd
}

fn expected(name: &str) -> String {
    fs::read_to_string(workspace_root().join("fixtures/positive").join(name)).unwrap()
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    usda2json()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Convert USDA scene description to namespaced JSON records",
        ))
        .stdout(predicate::str::contains("--bindings"));
}

#[test]
fn version_exits_0() {
    usda2json()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("usda2json"));
}

#[test]
fn missing_input_argument_is_a_usage_error() {
    usda2json().assert().failure().code(2);
}

// ──────────────────────────────────────────────
// 2. Conversion
// ──────────────────────────────────────────────

#[test]
fn converts_fixture_to_stdout() {
    usda2json()
        .arg("fixtures/positive/wall.usda")
        .assert()
        .success()
        .stdout(expected("wall.expected.json"));
}

#[test]
fn writes_output_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("curves.json");
    usda2json()
        .arg("fixtures/positive/curves.usda")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, expected("curves.expected.json"));
    assert!(written.ends_with("]\n"));
}

#[test]
fn lowered_stage_keeps_attributes_on_blocks() {
    let output = usda2json()
        .args(["fixtures/positive/door.usda", "--stage", "lowered"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = doc.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["name"], "Door");
    assert_eq!(records[1]["attributes"]["ifc5:properties:Finish"], "oak");
    assert_eq!(records[1]["attributes"]["ifc5:properties:Width"], 2);
}

#[test]
fn validate_flag_accepts_normalized_output() {
    usda2json()
        .args(["fixtures/positive/wall.usda", "--validate"])
        .assert()
        .success()
        .stdout(expected("wall.expected.json"));
}

// ──────────────────────────────────────────────
// 3. Binding configuration
// ──────────────────────────────────────────────

#[test]
fn bindings_file_extends_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("beam.usda");
    fs::write(
        &input,
        "#usda 1.0\ndef Cube \"Beam\" {\n    double size = 2\n    token purpose = \"render\"\n    double length = 6\n}\n",
    )
    .unwrap();
    let bindings = dir.path().join("bindings.toml");
    fs::write(
        &bindings,
        "fallback_namespace = \"misc\"\ndrop = [\"purpose\"]\n\n[bindings]\nCube = \"UsdGeom:Cube\"\nsize = \"UsdGeom:Cube\"\n",
    )
    .unwrap();

    let output = usda2json()
        .arg(&input)
        .arg("--bindings")
        .arg(&bindings)
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        doc,
        serde_json::json!([
            {"def": "def", "type": "UsdGeom:Cube", "name": "Beam"},
            {"def": "over", "name": "Beam", "attributes": {"UsdGeom:Cube": {"size": 2}}},
            {"def": "over", "name": "Beam", "attributes": {"misc": {"length": 6}}}
        ])
    );
}

#[test]
fn malformed_bindings_file_exits_1() {
    let dir = TempDir::new().unwrap();
    let bindings = dir.path().join("bindings.toml");
    fs::write(&bindings, "namespaces = [\"UsdGeom\"]\n").unwrap();
    usda2json()
        .arg("fixtures/positive/wall.usda")
        .arg("--bindings")
        .arg(&bindings)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid bindings file"));
}

// ──────────────────────────────────────────────
// 4. Errors
// ──────────────────────────────────────────────

#[test]
fn missing_input_file_exits_1() {
    usda2json()
        .arg("fixtures/positive/does_not_exist.usda")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading"));
}

#[test]
fn syntax_error_is_reported_with_position() {
    usda2json()
        .arg("fixtures/negative/unterminated_string.usda")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "error: fixtures/negative/unterminated_string.usda:3:19: syntax error: unterminated string literal",
        ));
}

#[test]
fn structural_error_names_prim_and_key() {
    usda2json()
        .arg("fixtures/negative/nested_multiple_inherits.usda")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("structure error"))
        .stderr(predicate::str::contains("[prim 'Jamb'] [key 'inherits']"));
}

#[test]
fn json_error_format_is_machine_readable() {
    let output = usda2json()
        .args([
            "fixtures/negative/valueless_attribute.usda",
            "--error-format",
            "json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["stage"], "normalization");
    assert_eq!(err["prim"], "Slab");
    assert_eq!(err["key"], "extent");
    assert_eq!(err["line"], 2);
}

#[test]
fn quiet_suppresses_text_errors() {
    usda2json()
        .args(["fixtures/negative/top_level_attribute.usda", "--quiet"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}

#[test]
fn failed_conversion_does_not_create_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.json");
    usda2json()
        .arg("fixtures/negative/unknown_value.usda")
        .arg(&out)
        .assert()
        .failure()
        .code(1);
    assert!(!out.exists());
}

// ──────────────────────────────────────────────
// 5. Logging
// ──────────────────────────────────────────────

#[test]
fn verbose_logs_go_to_stderr() {
    usda2json()
        .args(["fixtures/positive/door.usda", "-vv"])
        .assert()
        .success()
        .stdout(expected("door.expected.json"))
        .stderr(predicate::str::contains("normalized into 2 blocks and 1 overrides"));
}

#[test]
fn default_run_logs_nothing() {
    usda2json()
        .arg("fixtures/positive/door.usda")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
