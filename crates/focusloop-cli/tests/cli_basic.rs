//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify exit codes and outputs. The data directory is
//! shared state, so tests serialize on a lock.

use std::process::Command;
use std::sync::Mutex;

static DATA_DIR_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> std::sync::MutexGuard<'static, ()> {
    DATA_DIR_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusloop-cli", "--"])
        .args(args)
        .env("FOCUSLOOP_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_timer_status() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("status should print JSON");
    assert_eq!(parsed["type"], "StateSnapshot");
}

#[test]
fn test_timer_start_then_pause() {
    let _guard = lock();
    let (_, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed");

    let (stdout, _, code) = run_cli(&["timer", "start"]);
    assert_eq!(code, 0, "timer start failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["type"], "TimerStarted");

    let (stdout, _, code) = run_cli(&["timer", "pause"]);
    assert_eq!(code, 0, "timer pause failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["type"], "TimerPaused");
}

#[test]
fn test_timer_skip_transitions() {
    let _guard = lock();
    let (_, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed");

    let (stdout, _, code) = run_cli(&["timer", "skip"]);
    assert_eq!(code, 0, "timer skip failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("skip should print JSON");
    assert_eq!(parsed["type"], "PhaseSkipped");
    assert_eq!(parsed["from"], "focus");
    assert_eq!(parsed["to"], "short_break");
}

#[test]
fn test_timer_reset_clears_cycles() {
    let _guard = lock();
    let (_, _, code) = run_cli(&["timer", "skip"]);
    assert_eq!(code, 0);

    let (_, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed");

    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["completed_focus_cycles"], 0);
    assert_eq!(parsed["phase"], "focus");
}

#[test]
fn test_config_get() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["config", "get", "cycle.focus_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let _guard = lock();
    let (_, _, code) = run_cli(&["config", "get", "cycle.no_such_key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["config", "set", "notifications.bell", "true"]);
    assert_eq!(code, 0, "config set failed");
    assert_eq!(stdout.trim(), "ok");
}

#[test]
fn test_config_set_rejects_zero_duration() {
    let _guard = lock();
    let (_, stderr, code) = run_cli(&["config", "set", "cycle.focus_minutes", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid configuration value"));
}

#[test]
fn test_config_list() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("cycle"));
}

#[test]
fn test_stats_today() {
    let _guard = lock();
    let (_, _, code) = run_cli(&["stats", "today"]);
    assert_eq!(code, 0, "stats today failed");
}

#[test]
fn test_stats_all() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["stats", "all"]);
    assert_eq!(code, 0, "stats all failed");
    assert!(stdout.contains("total_sessions"));
}

#[test]
fn test_completions_bash() {
    let _guard = lock();
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed");
    assert!(stdout.contains("focusloop-cli"));
}
