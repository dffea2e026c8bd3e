//! Integration tests for headless mode.
//!
//! Runs the sqlchat binary with scripted events and a stub agent.

use std::process::Command;

fn run_headless(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlchat"))
        .args(args)
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_headless_basic_execution() {
    let (code, stdout, _) = run_headless(&["--headless", "--mock-agent", "--events", "key:esc"]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(
        stdout.contains("Events: 1 executed"),
        "Should show events executed"
    );
}

#[test]
fn test_headless_type_event() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "type:hello world",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains(r#""input_text": "hello world""#));
}

#[test]
fn test_headless_question_renders_answer_and_trace() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "type:Who has the highest sugar level?,key:enter",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Alice has the highest sugar level."));
    assert!(stdout.contains("Step 1: tool sql_db_query"));
    assert!(stdout.contains("SELECT name"));
    assert!(stdout.contains("Alice,180"));
}

#[test]
fn test_headless_empty_submit_is_noop() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "key:enter",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    // Only the welcome message is present
    assert!(stdout.contains(r#""message_count": 1"#));
}

#[test]
fn test_headless_quit_command() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "type:/quit,key:enter",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains(r#""running": false"#));
}

#[test]
fn test_headless_custom_size() {
    let (code, stdout, _) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "key:esc",
        "--size",
        "120x40",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains("screen_lines"));
}

#[test]
fn test_headless_requires_events() {
    let (code, _, stderr) = run_headless(&["--headless", "--mock-agent"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("requires --events or --script"));
}

#[test]
fn test_headless_invalid_event_fails() {
    let (code, _, stderr) = run_headless(&[
        "--headless",
        "--mock-agent",
        "--events",
        "click:button",
    ]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown event"));
}

#[test]
fn test_missing_database_is_a_config_error() {
    let (code, _, stderr) = run_headless(&["--headless", "--events", "key:esc"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("No database specified"));
}
