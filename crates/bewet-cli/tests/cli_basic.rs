//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They run
//! against the dev data directory so a developer's real tracker data is
//! never touched.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "bewet-cli", "--"])
        .args(args)
        .env("BEWET_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_water_add_and_today() {
    let (_, _, code) = run_cli(&["water", "add", "250"]);
    assert_eq!(code, 0, "water add failed");

    let (stdout, _, code) = run_cli(&["water", "today"]);
    assert_eq!(code, 0, "water today failed");
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(summary["total"].as_u64().unwrap() >= 250);
    assert!(summary["goal"].as_u64().unwrap() > 0);
}

#[test]
fn test_water_week_has_seven_days() {
    let (stdout, _, code) = run_cli(&["water", "week"]);
    assert_eq!(code, 0, "water week failed");
    let week: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(week.as_array().unwrap().len(), 7);
}

#[test]
fn test_settings_show_and_set() {
    let (stdout, _, code) = run_cli(&["settings", "show"]);
    assert_eq!(code, 0, "settings show failed");
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(settings["dailyGoal"].as_u64().unwrap() > 0);

    let (stdout, _, code) = run_cli(&["settings", "set", "--goal", "2200"]);
    assert_eq!(code, 0, "settings set failed");
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(settings["dailyGoal"], 2200);
}

#[test]
fn test_settings_rejects_zero_goal() {
    let (_, stderr, code) = run_cli(&["settings", "set", "--goal", "0"]);
    assert_ne!(code, 0, "zero goal unexpectedly accepted");
    assert!(stderr.contains("error"));
}

#[test]
fn test_streak_show() {
    let (stdout, _, code) = run_cli(&["streak", "show"]);
    assert_eq!(code, 0, "streak show failed");
    let streak: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(streak["currentStreak"].is_number());
    assert!(streak["emoji"].is_string());
}

#[test]
fn test_achievements_list_is_complete() {
    let (stdout, _, code) = run_cli(&["achievements", "list"]);
    assert_eq!(code, 0, "achievements list failed");
    let list: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 9);
}

#[test]
fn test_reminder_check() {
    let (stdout, _, code) = run_cli(&["reminder", "check"]);
    assert_eq!(code, 0, "reminder check failed");
    let check: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(check["due"].is_boolean());
}

#[test]
fn test_data_export_parses() {
    let (stdout, _, code) = run_cli(&["data", "export"]);
    assert_eq!(code, 0, "data export failed");
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["version"], "1.0.0");
    assert!(doc["entries"].is_array());
}
