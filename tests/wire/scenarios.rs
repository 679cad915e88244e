//! Tests for request handling over the wire

use std::fs;

use tempfile::tempdir;

use crate::common::{send_line, Harness, HostCall};

// ============================================================================
// OPEN FILE
// ============================================================================

#[test]
fn test_missing_file_is_opened_with_create() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("foo.txt");
    let harness = Harness::running();

    send_line(harness.addr(), &format!("{}\n", path.display()));

    assert_eq!(
        harness.calls(),
        vec![HostCall::OpenFile {
            path: path.clone(),
            create: true
        }]
    );
    // Creating the file is the host's job
    assert!(!path.exists());
}

#[test]
fn test_directory_as_file_is_dropped() {
    let dir = tempdir().unwrap();
    let harness = Harness::running();

    send_line(harness.addr(), &format!("{}\n", dir.path().display()));

    assert!(harness.calls().is_empty());
}

#[test]
fn test_crlf_line_is_trimmed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    let harness = Harness::running();

    send_line(harness.addr(), &format!("{}\r\n", path.display()));

    assert_eq!(
        harness.calls(),
        vec![HostCall::OpenFile { path, create: true }]
    );
}

// ============================================================================
// OPEN PROJECT
// ============================================================================

#[test]
fn test_project_on_existing_file_is_dropped() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir.txt");
    fs::write(&file, "x").unwrap();
    let harness = Harness::running();

    send_line(harness.addr(), &format!("-p {}\n", file.display()));

    assert!(harness.calls().is_empty());
}

#[test]
fn test_project_on_missing_directory_is_created() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("new-project");
    let harness = Harness::running();

    send_line(harness.addr(), &format!("-p {}\n", project.display()));

    assert_eq!(
        harness.calls(),
        vec![HostCall::OpenProject {
            path: project,
            create: true
        }]
    );
}

// ============================================================================
// COMPARE
// ============================================================================

#[test]
fn test_compare_keeps_argument_order() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("a.txt");
    let right = dir.path().join("b.txt");
    fs::write(&left, "a").unwrap();
    fs::write(&right, "b").unwrap();
    let harness = Harness::running();

    send_line(
        harness.addr(),
        &format!("-c {} {}\n", left.display(), right.display()),
    );

    assert_eq!(harness.calls(), vec![HostCall::Compare { left, right }]);
}

#[test]
fn test_compare_with_missing_side_is_dropped() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("a.txt");
    fs::write(&left, "a").unwrap();
    let harness = Harness::running();

    send_line(
        harness.addr(),
        &format!("-c {} {}\n", left.display(), dir.path().join("b.txt").display()),
    );

    assert!(harness.calls().is_empty());
}

#[test]
fn test_compare_with_wrong_arity_is_dropped() {
    let harness = Harness::running();
    send_line(harness.addr(), "-c /tmp/only-one\n");
    send_line(harness.addr(), "-c /tmp/a /tmp/b /tmp/c\n");
    assert!(harness.calls().is_empty());
}

// ============================================================================
// CONNECTION HANDLING
// ============================================================================

#[test]
fn test_empty_line_is_ignored_and_listener_keeps_serving() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("after.txt");
    let harness = Harness::running();

    send_line(harness.addr(), "\n");
    send_line(harness.addr(), "");
    assert!(harness.calls().is_empty());

    send_line(harness.addr(), &format!("{}\n", path.display()));
    assert_eq!(harness.calls().len(), 1);
}

#[test]
fn test_only_first_line_is_processed() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    let harness = Harness::running();

    send_line(
        harness.addr(),
        &format!("{}\n{}\n", first.display(), second.display()),
    );

    assert_eq!(
        harness.calls(),
        vec![HostCall::OpenFile {
            path: first,
            create: true
        }]
    );
}

#[test]
fn test_connections_are_handled_in_order() {
    let dir = tempdir().unwrap();
    let harness = Harness::running();
    let paths: Vec<_> = (0..5).map(|i| dir.path().join(format!("{}.txt", i))).collect();

    for path in &paths {
        send_line(harness.addr(), &format!("{}\n", path.display()));
    }

    let expected: Vec<_> = paths
        .into_iter()
        .map(|path| HostCall::OpenFile { path, create: true })
        .collect();
    assert_eq!(harness.calls(), expected);
}
