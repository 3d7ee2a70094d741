//! Property checks shared by the fuzz harness and the regression tests.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`check_render_fixed_point`]: printing a parsed statement, parsing the text and printing it again gives the same text
//! - [`check_batching`]: batching keeps the rows of each table in order, and passthrough statements in order
//! - [`check_batch`]: both of the above, with the fuzzer's `(String, u8)` input
//! - [`run_crash_dir_regression`]: replay every crash file of a honggfuzz workspace

extern crate std;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::signature::Signature;
use crate::sql::{Parser, Row, RowSource, Statement, parse_one};
use crate::{BatchConfig, batch_queries, walk_statements};

type IndexMap<K, V> = indexmap::IndexMap<K, V, hashbrown::DefaultHashBuilder>;

/// Statements of a script, split into the parts batching must preserve.
#[derive(Debug, Default, PartialEq)]
struct Summary {
    /// Printed non-batchable statements, in order.
    passthrough: Vec<String>,
    /// Printed rows of each signature, in order.
    rows: IndexMap<Signature, Vec<String>>,
}

fn render_row(row: &Row) -> String {
    row.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize(sql: &str) -> Summary {
    let mut summary = Summary::default();
    walk_statements(sql, |statement| {
        match &statement {
            Statement::Insert(insert) => match &insert.source {
                RowSource::Values(rows) => {
                    summary
                        .rows
                        .entry(Signature::of(insert)?)
                        .or_default()
                        .extend(rows.iter().map(render_row));
                }
                RowSource::Query(_) => summary.passthrough.push(statement.to_string()),
            },
            _ => summary.passthrough.push(statement.to_string()),
        }
        Ok(())
    })
    .expect("Script must parse");
    summary.rows.retain(|_, rows| !rows.is_empty());
    summary
}

/// Check that every statement of `sql` prints to a fixed point.
///
/// Inputs that fail to parse are ignored.
///
/// # Panics
///
/// Panics if a printed statement fails to parse, or prints differently the
/// second time.
pub fn check_render_fixed_point(sql: &str) {
    let Ok(statements) = Parser::new(sql).parse_all() else {
        return;
    };
    for statement in statements {
        let once = statement.to_string();
        let (reparsed, _) = parse_one(&once)
            .unwrap_or_else(|err| panic!("Printed statement {once:?} fails to parse: {err}"));
        assert_eq!(reparsed.to_string(), once, "Printing is not a fixed point");
    }
}

/// Check that batching `sql` keeps every row and every passthrough statement.
///
/// For each signature, the rows of the output must be the rows of the input
/// in the same order; passthrough statements must appear in the same order.
/// Inputs that fail to batch are ignored.
///
/// # Panics
///
/// Panics if the batched output fails to parse or breaks either property.
pub fn check_batching(sql: &str, batch_size: NonZeroUsize) {
    let Ok(output) = batch_queries(sql, BatchConfig::new(batch_size)) else {
        return;
    };
    let before = summarize(sql);
    let after = summarize(&output.sql);
    assert_eq!(before.passthrough, after.passthrough, "Passthrough order changed");
    assert_eq!(before.rows, after.rows, "Rows lost, duplicated or reordered");
    assert_eq!(
        output.stats.rows,
        before.rows.values().map(Vec::len).sum::<usize>()
    );
}

/// Run every check on a fuzzer input. A zero batch size is skipped.
///
/// # Panics
///
/// Panics if any of the checks fails.
pub fn check_batch(sql: &str, batch_size: u8) {
    let Some(batch_size) = NonZeroUsize::new(usize::from(batch_size)) else {
        return;
    };
    check_render_fixed_point(sql);
    check_batching(sql, batch_size);
}

fn fuzz_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "fuzz"))
        .collect();
    files.sort();
    files
}

/// Replay every `.fuzz` file in `crash_dir` through `check`.
///
/// New crash files found in the honggfuzz `workspace_dir` are first copied
/// into `crash_dir`, so they stay in the regression set once the workspace is
/// cleaned.
///
/// # Panics
///
/// Panics if a file cannot be copied or read, if `check` panics, or if one
/// input takes longer than `time_limit`.
pub fn run_crash_dir_regression(
    crash_dir: &str,
    workspace_dir: &str,
    time_limit: Duration,
    check: impl Fn(&[u8]),
) {
    let crash_dir = Path::new(crash_dir);
    for source in fuzz_files(Path::new(workspace_dir)) {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = crash_dir.join(name);
        if !target.exists() {
            std::fs::create_dir_all(crash_dir).expect("Failed to create crash directory");
            std::fs::copy(&source, &target).expect("Failed to copy crash file");
        }
    }

    for path in fuzz_files(crash_dir) {
        let data = std::fs::read(&path).expect("Failed to read crash file");
        let start = Instant::now();
        check(&data);
        let elapsed = start.elapsed();
        assert!(
            elapsed <= time_limit,
            "{} took {elapsed:?}, over the {time_limit:?} limit",
            path.display()
        );
    }
}
