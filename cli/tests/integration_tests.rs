use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::json;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("scout_demo_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn scout_demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scout-demo"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run scout-demo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ---------------------------------------------------------------------------
// Invocation and exit codes
// ---------------------------------------------------------------------------

#[test]
fn default_task_runs_without_name() {
    let output = scout_demo(&["--count", "3"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "xxx\n");
    assert!(stderr(&output).is_empty());
}

#[test]
fn named_task_with_all_flags() {
    let output = scout_demo(&["count", "--count", "3", "--label", "ab"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "ababab\n");
}

#[test]
fn zero_count_prints_empty_line() {
    let output = scout_demo(&["count", "--count", "0"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "\n");
}

#[test]
fn missing_required_flag_is_usage_error() {
    let output = scout_demo(&["count"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("--count"), "stderr: {}", stderr(&output));
}

#[test]
fn bad_integer_is_usage_error() {
    let output = scout_demo(&["count", "--count", "three"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("three"));
}

#[test]
fn unknown_flag_is_usage_error() {
    let output = scout_demo(&["count", "--count", "1", "--colour"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_task_exits_2() {
    let output = scout_demo(&["nope"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "[scout.task] Unknown task 'nope'\n");
}

#[test]
fn task_failure_exits_1_with_tagged_message() {
    let output = scout_demo(&["fail"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert_eq!(stderr(&output), "[scout.task] Error: boom\n");

    let output = scout_demo(&["fail", "--message", "disk full"]);
    assert_eq!(stderr(&output), "[scout.task] Error: disk full\n");
}

#[test]
fn negative_count_fails_inside_task() {
    let output = scout_demo(&["count", "--count", "-1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("[scout.task] Error:"));
}

// ---------------------------------------------------------------------------
// Help and metadata
// ---------------------------------------------------------------------------

#[test]
fn help_lists_flags_and_exits_0() {
    let output = scout_demo(&["count", "--help"]);
    assert_eq!(output.status.code(), Some(0));
    let help = stdout(&output);
    assert!(help.contains("scout-demo count"), "{help}");
    assert!(help.contains("Computes."));
    assert!(help.contains("number of items"));
    assert!(help.contains("--scout-output"));
    assert!(help.contains("--scout-metadata"));
}

#[test]
fn help_shows_negation_flag() {
    let output = scout_demo(&["inspect", "-h"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--no-color"));
}

#[test]
fn metadata_for_named_task() {
    let output = scout_demo(&["count", "--scout-metadata"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output),
        json!({
            "name": "count",
            "description": "Computes.",
            "returns": "string",
            "params": [
                {"name": "count", "type": "integer", "required": true, "default": null, "help": "number of items"},
                {"name": "label", "type": "string", "required": false, "default": "x", "help": ""}
            ]
        })
    );
}

#[test]
fn metadata_ignores_other_flags() {
    let output = scout_demo(&["fail", "--scout-metadata", "--bogus"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["name"], "fail");
}

#[test]
fn metadata_for_all_tasks_is_an_array() {
    let output = scout_demo(&["--scout-metadata"]);
    assert_eq!(output.status.code(), Some(0));
    let names: Vec<String> = stdout_json(&output)
        .as_array()
        .expect("array of schemas")
        .iter()
        .map(|schema| schema["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, ["inspect", "items", "blob", "stats", "fail", "count"]);
}

#[test]
fn metadata_reports_kinds_and_defaults() {
    let output = scout_demo(&["inspect", "--scout-metadata"]);
    let meta = stdout_json(&output);
    let params = meta["params"].as_array().expect("params");
    let kind = |name: &str| {
        params
            .iter()
            .find(|p| p["name"] == name)
            .map(|p| (p["type"].clone(), p["required"].clone()))
    };
    assert_eq!(kind("path"), Some((json!("path"), json!(true))));
    assert_eq!(kind("tags"), Some((json!("list[string]"), json!(false))));
    assert_eq!(kind("nums"), Some((json!("list[integer]"), json!(false))));
    assert_eq!(kind("payload"), Some((json!("binary"), json!(false))));
    assert_eq!(params[0]["help"], "file or directory to look at");
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[test]
fn inspect_reports_parsed_values() {
    let output = scout_demo(&["inspect", "--path", "./a//b/", "--no-color", "--tags", "x", "y"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_json(&output),
        json!({
            "color": false,
            "nums": [1, 2],
            "path": "a/b",
            "payload": null,
            "ratio": 1.5,
            "tags": ["x", "y"],
            "verbose": false
        })
    );
}

#[test]
fn negation_last_one_wins() {
    let output = scout_demo(&["inspect", "--path", "p", "--no-color", "--color"]);
    assert_eq!(stdout_json(&output)["color"], true);
    let output = scout_demo(&["inspect", "--path", "p", "--color", "--no-color"]);
    assert_eq!(stdout_json(&output)["color"], false);
}

#[test]
fn list_values_keep_order() {
    let output = scout_demo(&["inspect", "--path", "p", "--nums", "3", "-1", "2", "--verbose"]);
    let report = stdout_json(&output);
    assert_eq!(report["nums"], json!([3, -1, 2]));
    assert_eq!(report["verbose"], true);
}

// ---------------------------------------------------------------------------
// Result serialization
// ---------------------------------------------------------------------------

#[test]
fn sequence_prints_one_line_per_element() {
    let output = scout_demo(&["items", "--n", "3"]);
    assert_eq!(stdout(&output), "item-0\nitem-1\nitem-2\n");
    let output = scout_demo(&["items", "--n", "0"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn binary_goes_to_stdout_raw() {
    let output = scout_demo(&["blob", "--size", "3"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, vec![0u8, 1, 2]);
}

#[test]
fn structured_prints_compact_json() {
    let output = scout_demo(&["stats", "--values", "1", "2", "3"]);
    assert_eq!(stdout(&output), "{\"count\":3,\"sum\":6.0,\"mean\":2.0}\n");
}

#[test]
fn output_file_receives_exact_bytes() {
    let dir = TempDir::new("binary_output");
    let path = dir.join("nested/dir/out.bin");
    let output = scout_demo(&["blob", "--size", "300", "--scout-output", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let expected: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
    assert_eq!(fs::read(&path).unwrap(), expected);
}

#[test]
fn output_file_receives_text_form() {
    let dir = TempDir::new("text_output");
    let text = dir.join("count.txt");
    let output = scout_demo(&["--count", "2", "--scout-output", text.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(&text).unwrap(), "xx");

    let lines = dir.join("items.txt");
    scout_demo(&["items", "--n", "2", "--scout-output", lines.to_str().unwrap()]);
    assert_eq!(fs::read_to_string(&lines).unwrap(), "item-0\nitem-1\n");
}

#[test]
fn output_file_failure_exits_1() {
    let dir = TempDir::new("output_failure");
    let blocker = dir.join("file");
    fs::write(&blocker, "").unwrap();
    let target = blocker.join("out.txt");
    let output = scout_demo(&["--count", "1", "--scout-output", target.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("[scout.task] Error: failed to write output file"));
}
