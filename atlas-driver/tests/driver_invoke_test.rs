// SPDX-License-Identifier: Apache-2.0

//! Tests that invoke the `atlas-driver` binary.

use std::io::Write;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn driver(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_atlas-driver"))
        .args(args)
        .current_dir(env!("CARGO_TARGET_TMPDIR"))
        .output()
        .unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_run_prints_table_matching_reference() {
    let _ = env_logger::builder().is_test(true).try_init();
    let output = driver(&["run", "A1F3", "--k", "2"]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "X=A1F3  N=4  K=2");
    assert_eq!(lines[1], "bin : hw  ref");
    let mut total = 0u64;
    for line in &lines[2..18] {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // "NN", ":", hw, ref
        assert_eq!(fields.len(), 4, "line: {}", line);
        assert_eq!(fields[2], fields[3], "line: {}", line);
        total += fields[2].parse::<u64>().unwrap();
    }
    assert_eq!(total, 60);
    assert!(lines[18].starts_with("steps: "));
}

#[test]
fn test_run_json_report() {
    let output = driver(&["run", "A1F3", "--k", "3", "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["n"], 4);
    assert_eq!(value["k"], 3);
    assert_eq!(value["report"]["subsets"], 4);
    assert_eq!(value["report"]["events"], 400);
    assert_eq!(value["report"]["histogram"], value["reference"]);
    let total: u64 = value["report"]["histogram"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 400);
}

#[test]
fn test_bad_hex_reports_error() {
    let output = driver(&["run", "A1G3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("atlas-driver: run: "), "stderr: {}", stderr);
    assert!(stderr.contains("invalid hex digit"), "stderr: {}", stderr);
}

#[test]
fn test_timeout_reports_error() {
    let output = driver(&["run", "A1F3", "--max-steps", "5"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timed out"), "stderr: {}", stderr);
}

#[test]
fn test_config_file_supplies_k() {
    let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(temp_file, "[atlas]\nk = 3\n").unwrap();
    let temp_path = temp_file.into_temp_path();

    let output = driver(&[
        "--config",
        temp_path.to_str().unwrap(),
        "reference",
        "A1F3",
        "--json",
    ]);
    assert_success(&output);
    let bins: Vec<u64> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bins.len(), 16);
    assert_eq!(bins.iter().sum::<u64>(), 400);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let output = driver(&["--config", "/nonexistent/atlas.toml", "reference", "A1F3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file does not exist"), "stderr: {}", stderr);
}

#[test]
fn test_sweep_summary() {
    let output = driver(&[
        "sweep", "--k", "3", "--min-n", "3", "--max-n", "6", "--samples", "5", "--seed", "11",
        "--json",
    ]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["k"], 3);
    assert_eq!(value["seed"], 11);
    assert_eq!(value["samples"], 5);
}

#[test]
fn test_sweep_rejects_bad_range() {
    let output = driver(&["sweep", "--min-n", "9", "--max-n", "4"]);
    assert!(!output.status.success());
}
