//! Tests for the `open` CLI command against an in-process listener

use std::fs;
use std::time::Duration;

use super::CliEnv;
use crate::common::{free_port, Harness, HostCall};

#[test]
fn test_open_relative_file() {
    let env = CliEnv::new();
    let harness = Harness::running();
    let port = harness.addr().port().to_string();

    env.run_cli_success(&["open", "--port", &port, "notes.txt"]);

    let calls = harness.wait_for_calls(1, Duration::from_secs(10));
    assert_eq!(
        calls,
        vec![HostCall::OpenFile {
            path: fs::canonicalize(env.path()).unwrap().join("notes.txt"),
            create: true
        }]
    );
}

#[test]
fn test_open_compare() {
    let env = CliEnv::new();
    fs::write(env.path().join("a.txt"), "a").unwrap();
    fs::write(env.path().join("b.txt"), "b").unwrap();
    let harness = Harness::running();
    let port = harness.addr().port().to_string();

    env.run_cli_success(&["open", "--port", &port, "-c", "a.txt", "b.txt"]);

    let calls = harness.wait_for_calls(1, Duration::from_secs(10));
    let cwd = fs::canonicalize(env.path()).unwrap();
    assert_eq!(
        calls,
        vec![HostCall::Compare {
            left: cwd.join("a.txt"),
            right: cwd.join("b.txt"),
        }]
    );
}

#[test]
fn test_open_compare_with_space_is_refused() {
    let env = CliEnv::new();
    let (code, stderr) = env.run_cli_failure(&["open", "-c", "my file.txt", "b.txt"]);
    assert_eq!(code, Some(4));
    assert!(stderr.contains("may not contain spaces"), "{}", stderr);
}

#[test]
fn test_open_without_listener_fails() {
    let env = CliEnv::new();
    let port = free_port().to_string();
    let (code, stderr) = env.run_cli_failure(&["open", "--port", &port, "x.txt"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("No steb listener reachable"), "{}", stderr);
}
