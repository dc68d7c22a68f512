//! Integration tests for the `timetable` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to run the expand, conflicts and
//! slots subcommands through the actual binary, covering file and stdin input,
//! JSON output and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn timetable() -> Command {
    Command::cargo_bin("timetable").unwrap()
}

/// Run the binary and parse its stdout as JSON.
fn run_json(args: &[&str]) -> serde_json::Value {
    let output = timetable().args(args).output().expect("binary must run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// expand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn expand_month_from_file() {
    let path = fixture("timetable.json");
    let value = run_json(&["expand", "-i", &path, "--date", "2024-03-18", "--view", "month"]);

    let instances = value.as_array().expect("array of instances");
    // 4 Mondays of c1, 7 Tue/Thu meetings of c2 (Mar 14 excluded), 1 task.
    assert_eq!(instances.len(), 12);

    let c1: Vec<&serde_json::Value> = instances
        .iter()
        .filter(|e| e["id"].as_str().unwrap().starts_with("c1_"))
        .collect();
    assert_eq!(c1.len(), 4);
    assert_eq!(c1[0]["start"], "2024-03-04T09:00:00");
    assert_eq!(c1[3]["end"], "2024-03-25T10:00:00");
    assert!(instances
        .iter()
        .all(|e| e["start"].as_str().unwrap() != "2024-03-14T13:00:00"));
}

#[test]
fn expand_week_from_stdin() {
    let events = std::fs::read_to_string(fixture("timetable.json")).unwrap();

    let output = timetable()
        .args(["expand", "--date", "2024-03-18"])
        .write_stdin(events)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 4);
    assert!(ids[0].starts_with("c1_"));
    assert!(ids[1].starts_with("c2_"));
    assert_eq!(ids[2], "t1");
    assert!(ids[3].starts_with("c2_"));
}

#[test]
fn expand_grouped_by_day() {
    let path = fixture("timetable.json");
    let value = run_json(&[
        "expand", "-i", &path, "--date", "2024-03-18", "--view", "week", "--group",
    ]);

    let days = value.as_object().expect("object keyed by date");
    assert_eq!(days.len(), 4);
    assert_eq!(days["2024-03-20"][0]["title"], "Problem set 3");
}

#[test]
fn expand_rejects_unknown_view() {
    let path = fixture("timetable.json");
    timetable()
        .args(["expand", "-i", path.as_str(), "--date", "2024-03-18", "--view", "year"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown calendar view"));
}

#[test]
fn expand_reports_missing_file() {
    timetable()
        .args(["expand", "-i", "/nonexistent/events.json", "--date", "2024-03-18"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: Failed to read file"));
}

#[test]
fn expand_reports_bad_rows() {
    timetable()
        .args(["expand", "--date", "2024-03-18"])
        .write_stdin(r#"[{"id":"x","type":"meeting","start":"2024-03-18","end":"2024-03-18"}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse events"))
        .stderr(predicate::str::contains("Unknown event kind: meeting"));
}

// ─────────────────────────────────────────────────────────────────────────────
// conflicts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflicts_lists_colliding_class() {
    let value = run_json(&[
        "conflicts",
        "-i",
        &fixture("timetable.json"),
        "--candidate",
        &fixture("exam_monday.json"),
    ]);

    assert_eq!(value["conflict"], true);
    let conflicts = value["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["id"], "c1");
    assert_eq!(conflicts[0]["title"], "Calculus I");
}

#[test]
fn conflicts_clear_on_free_day() {
    let value = run_json(&[
        "conflicts",
        "-i",
        &fixture("timetable.json"),
        "--candidate",
        &fixture("exam_friday.json"),
    ]);

    assert_eq!(value["conflict"], false);
    assert!(value["conflicts"].as_array().unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_avoid_busy_mornings() {
    let value = run_json(&[
        "slots",
        "-i",
        &fixture("busy.json"),
        "--duration",
        "60",
        "--days",
        "1,2",
        "--prefer",
        "morning",
        "--today",
        "2024-03-18",
        "--limit",
        "3",
    ]);

    let suggestions = value.as_array().unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0]["days"], serde_json::json!([1]));
    assert_eq!(suggestions[0]["startTime"], "09:00");
    assert_eq!(suggestions[0]["endTime"], "10:00");
    assert_eq!(suggestions[2]["startTime"], "10:00");
    assert_eq!(suggestions[0]["busyCount"], 0);
    assert_eq!(suggestions[0]["totalDuration"], 60);
}

#[test]
fn slots_two_sessions_on_empty_week() {
    let value = run_json(&[
        "slots",
        "-i",
        &fixture("empty.json"),
        "--duration",
        "90",
        "--days",
        "1,2,3,4,5",
        "--sessions",
        "2",
        "--today",
        "2024-03-18",
    ]);

    let suggestions = value.as_array().unwrap();
    assert_eq!(suggestions.len(), 5);
    assert_eq!(suggestions[0]["days"], serde_json::json!([1, 2]));
    assert_eq!(suggestions[0]["totalDuration"], 180);
}

#[test]
fn slots_reject_bad_weekday() {
    timetable()
        .args(["slots", "--duration", "60", "--days", "1,9", "--today", "2024-03-18"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid weekday index 9"));
}

#[test]
fn help_lists_subcommands() {
    timetable()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("expand"))
        .stdout(predicate::str::contains("conflicts"))
        .stdout(predicate::str::contains("slots"));
}
