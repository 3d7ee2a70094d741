//! Tests for the `sql-batcher` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sql-batcher"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run sql-batcher")
}

fn workspace(input: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.sql"), input).unwrap();
    dir
}

#[test]
fn test_batches_file() {
    let dir = workspace(
        "INSERT INTO xy values (0,'0');\nINSERT INTO xy values (1,'1');\nINSERT INTO xy values (2,'2');\n",
    );
    let output = run(&["--test", "in.sql", "--out", "out.sql", "-b", "2"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read_to_string(dir.path().join("out.sql")).unwrap(),
        "insert into xy values (0, '0'), (1, '1');\ninsert into xy values (2, '2');\n"
    );
}

#[test]
fn test_single_dash_flags_and_default_batch_size() {
    let dir = workspace("INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);\n");
    let output = run(&["-test", "in.sql", "-out", "out.sql"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read_to_string(dir.path().join("out.sql")).unwrap(),
        "insert into t values (1), (2);\n"
    );
}

#[test]
fn test_overwrites_existing_output() {
    let dir = workspace("select 1;");
    fs::write(dir.path().join("out.sql"), "stale contents that are longer\n").unwrap();
    let output = run(&["--test", "in.sql", "--out", "out.sql"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        fs::read_to_string(dir.path().join("out.sql")).unwrap(),
        "select 1;\n"
    );
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = workspace("INSERT INTO t VALUES (1);");
    let output = run(&["--test", "in.sql", "--out", "out.sql", "-v"], dir.path());
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("writing batch"), "{stderr}");
}

#[test]
fn test_parse_failure_exits_with_error() {
    let dir = workspace("INSERT INTO t VALUES (1);\nINSERT INTO t VALUES ('oops);\n");
    let output = run(&["--test", "in.sql", "--out", "out.sql"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to batch statements"), "{stderr}");
    assert!(stderr.contains("at byte 25"), "{stderr}");
}

#[test]
fn test_missing_input_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["--test", "missing.sql", "--out", "out.sql"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read missing.sql"), "{stderr}");
    assert!(!dir.path().join("out.sql").exists());
}

#[test]
fn test_zero_batch_size_is_rejected() {
    let dir = workspace("select 1;");
    let output = run(&["--test", "in.sql", "--out", "out.sql", "-b", "0"], dir.path());
    assert!(!output.status.success());
    assert!(!dir.path().join("out.sql").exists());
}
