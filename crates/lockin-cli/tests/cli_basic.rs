//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway home directory and
//! verify its outputs.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lockin-cli"));
    cmd.env("HOME", home.path())
        .env("LOCKIN_ENV", "dev")
        .env("RUST_LOG", "warn");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");
    split(output)
}

/// Run a CLI command feeding `input` on stdin.
fn run_cli_with_input(home: &TempDir, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = cli(home)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    split(child.wait_with_output().unwrap())
}

fn split(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

fn event_types(events: &[Value]) -> Vec<&str> {
    events.iter().map(|e| e["type"].as_str().unwrap()).collect()
}

#[test]
fn test_focus_options() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["focus", "options"]);
    assert_eq!(code, 0, "focus options failed");

    let options: Value = serde_json::from_str(&stdout).unwrap();
    let options = options.as_array().unwrap();
    assert_eq!(options.len(), 5);
    assert_eq!(options[0]["label"], "15 min");
    assert_eq!(options[0]["clock"], "15:00");
    assert_eq!(options[3]["minutes"], 60);
    assert_eq!(options[4]["clock"], "90:00");
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "focus.default_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "focus.default_minutes", "45"]);
    assert_eq!(code, 0, "config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(&home, &["config", "get", "focus.default_minutes"]);
    assert_eq!(stdout.trim(), "45");

    let (stdout, _, code) = run_cli(&home, &["config", "show"]);
    assert_eq!(code, 0);
    let config: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["focus"]["default_minutes"], 45);
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&home, &["config", "get", "focus.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: unknown key"));

    let (_, stderr, code) = run_cli(&home, &["config", "set", "focus.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_focus_run_completes() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["focus", "run", "--minutes", "1", "--tick-ms", "1"]);
    assert_eq!(code, 0, "focus run failed");

    let events = json_lines(&stdout);
    assert_eq!(
        event_types(&events),
        vec!["duration_selected", "session_started", "session_completed", "state_snapshot"]
    );
    assert_eq!(events[0]["duration_secs"], 60);
    let last = events.last().unwrap();
    assert_eq!(last["phase"], "completed");
    assert_eq!(last["remaining_secs"], 0);
}

#[test]
fn test_focus_run_fails_on_background() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        &home,
        &["focus", "run", "--minutes", "15", "--tick-ms", "1000"],
        "background\n",
    );
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    let failed = events
        .iter()
        .find(|e| e["type"] == "session_failed")
        .expect("no failure event");
    assert_eq!(failed["source"], "app_background");
    assert_eq!(events.last().unwrap()["phase"], "failed");
}

#[test]
fn test_focus_run_fails_on_blur() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, _) = run_cli_with_input(
        &home,
        &["focus", "run", "--tick-ms", "1000"],
        "blur\n",
    );
    let events = json_lines(&stdout);
    let failed = events
        .iter()
        .find(|e| e["type"] == "session_failed")
        .expect("no failure event");
    assert_eq!(failed["source"], "screen_blur");
}

#[test]
fn test_focus_give_up_returns_to_setup() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        &home,
        &["focus", "run", "--tick-ms", "1000"],
        "give-up\n",
    );
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    assert_eq!(
        event_types(&events),
        vec!["session_started", "session_abandoned", "state_snapshot"]
    );
    let last = events.last().unwrap();
    assert_eq!(last["phase"], "setup");
    assert_eq!(last["remaining_secs"], 30 * 60);
}

#[test]
fn test_session_show_when_logged_out() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&home, &["session", "show"]);
    assert_eq!(code, 0, "session show failed");
    let session: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(session["user_id"].is_null());
    assert!(session["user"].is_null());

    let (stdout, _, code) = run_cli(&home, &["session", "clear"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");
}

#[test]
fn test_query_rejects_bad_params() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&home, &["query", "select-posts", "--params", "[1, 2"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not valid JSON"));

    let (_, stderr, code) = run_cli(&home, &["query", "select-posts", "--params", "[]"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("must be a JSON object"));
}

#[test]
fn test_login_validates_input() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        &home,
        &["session", "login", "--email", "nobody", "--password", "hunter2"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}
