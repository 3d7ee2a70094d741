//! Groups INSERT rows by table signature and writes them out in batches.
//!
//! Every `INSERT ... VALUES` statement is absorbed into the group of its
//! [`Signature`]. A group is written out as one multi-row INSERT when it holds
//! more rows than the configured batch size, and again at the final flush.
//! Every other statement is written out as soon as it is seen.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::num::NonZeroUsize;

use crate::errors::Error;
use crate::signature::Signature;
use crate::sql::{InsertStatement, Row, RowSource, Statement};

type IndexMap<K, V> = indexmap::IndexMap<K, V, hashbrown::DefaultHashBuilder>;

/// Batching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of rows written per batch when a group overflows.
    pub batch_size: NonZeroUsize,
}

impl BatchConfig {
    /// Batch size used when none is configured.
    pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(500) {
        Some(size) => size,
        None => unreachable!(),
    };

    /// Create a configuration with the given batch size.
    #[must_use]
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BATCH_SIZE)
    }
}

/// Counters collected over a batching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Statements handed to the batcher.
    pub statements: usize,
    /// Statements written through unchanged.
    pub passthrough: usize,
    /// `INSERT ... VALUES` statements absorbed into a group.
    pub inserts: usize,
    /// Rows carried by the absorbed INSERT statements.
    pub rows: usize,
    /// Batched INSERT statements written.
    pub batches: usize,
    /// Distinct signatures seen.
    pub groups: usize,
}

/// Result of a completed batching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    /// The rewritten SQL, one `;\n`-terminated statement after another.
    pub sql: String,
    /// Counters for the run.
    pub stats: BatchStats,
}

/// Pending rows of one signature.
#[derive(Debug)]
struct Group {
    /// First INSERT seen for the signature, with its rows taken out.
    template: InsertStatement,
    rows: Vec<Row>,
}

impl Group {
    /// Write the first `size` pending rows as one INSERT.
    fn flush(&mut self, size: usize, out: &mut String) {
        tracing::debug!(
            table = %self.template.table,
            rows = size,
            pending = self.rows.len(),
            "writing batch"
        );
        out.push_str(&self.template.with_rows(&self.rows[..size]).to_string());
        out.push_str(";\n");
        self.rows.drain(..size);
    }
}

/// Accumulates statements and produces the batched SQL text.
///
/// # Examples
///
/// ```
/// use core::num::NonZeroUsize;
/// use sql_batcher::{BatchConfig, Batcher, parse_one};
///
/// let mut batcher = Batcher::new(BatchConfig::new(NonZeroUsize::new(2).unwrap()));
/// for sql in ["insert into t values (1)", "select 1", "insert into t values (2)"] {
///     let (statement, _) = parse_one(sql).unwrap();
///     batcher.add(statement).unwrap();
/// }
/// assert_eq!(batcher.output(), "select 1;\n");
///
/// let output = batcher.flush_batches();
/// assert_eq!(output.sql, "select 1;\ninsert into t values (1), (2);\n");
/// assert_eq!(output.stats.batches, 1);
/// ```
#[derive(Debug)]
pub struct Batcher {
    config: BatchConfig,
    groups: IndexMap<Signature, Group>,
    out: String,
    stats: BatchStats,
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

impl Batcher {
    /// Create an empty batcher.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            groups: IndexMap::default(),
            out: String::new(),
            stats: BatchStats::default(),
        }
    }

    /// Hand one statement to the batcher.
    ///
    /// `INSERT ... VALUES` rows are appended to the group of the statement's
    /// signature; if the group then holds more than `batch_size` rows, exactly
    /// `batch_size` of them are written as one INSERT. At most one batch is
    /// written per call, so a single large statement can leave more than
    /// `batch_size` rows pending. Any other statement is written immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] if the statement's signature cannot be
    /// computed.
    pub fn add(&mut self, statement: Statement) -> Result<(), Error> {
        self.stats.statements += 1;

        let (template, rows) = match statement {
            Statement::Insert(InsertStatement {
                table,
                columns,
                source: RowSource::Values(rows),
            }) => (
                InsertStatement {
                    table,
                    columns,
                    source: RowSource::Values(Vec::new()),
                },
                rows,
            ),
            other => {
                self.write_statement(&other);
                return Ok(());
            }
        };

        let signature = Signature::of(&template)?;
        self.stats.inserts += 1;
        self.stats.rows += rows.len();

        let group = self.groups.entry(signature).or_insert_with(|| {
            tracing::debug!(table = %template.table, "new insert group");
            Group {
                template,
                rows: Vec::new(),
            }
        });
        group.rows.extend(rows);

        let batch_size = self.config.batch_size.get();
        if group.rows.len() > batch_size {
            group.flush(batch_size, &mut self.out);
            self.stats.batches += 1;
        }
        Ok(())
    }

    fn write_statement(&mut self, statement: &Statement) {
        tracing::trace!("passing statement through");
        self.stats.passthrough += 1;
        self.out.push_str(&statement.to_string());
        self.out.push_str(";\n");
    }

    /// Text written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Counters so far. `groups` is only filled in by [`Self::flush_batches`].
    #[must_use]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Write every group's pending rows, in order of group creation, and
    /// return the finished output. Groups with no pending rows write nothing.
    #[must_use]
    pub fn flush_batches(mut self) -> BatchOutput {
        for group in self.groups.values_mut() {
            if !group.rows.is_empty() {
                let size = group.rows.len();
                group.flush(size, &mut self.out);
                self.stats.batches += 1;
            }
        }
        self.stats.groups = self.groups.len();
        tracing::debug!(
            statements = self.stats.statements,
            batches = self.stats.batches,
            groups = self.stats.groups,
            "flushed all batches"
        );
        BatchOutput {
            sql: self.out,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parse_one;

    fn batcher(batch_size: usize) -> Batcher {
        Batcher::new(BatchConfig::new(NonZeroUsize::new(batch_size).unwrap()))
    }

    fn add(batcher: &mut Batcher, sql: &str) {
        batcher.add(parse_one(sql).unwrap().0).unwrap();
    }

    #[test]
    fn test_default_batch_size() {
        assert_eq!(BatchConfig::default().batch_size.get(), 500);
    }

    #[test]
    fn test_flush_only_above_batch_size() {
        let mut batcher = batcher(2);
        add(&mut batcher, "insert into t values (1)");
        add(&mut batcher, "insert into t values (2)");
        assert_eq!(batcher.output(), "");

        add(&mut batcher, "insert into t values (3)");
        assert_eq!(batcher.output(), "insert into t values (1), (2);\n");

        let output = batcher.flush_batches();
        assert_eq!(
            output.sql,
            "insert into t values (1), (2);\ninsert into t values (3);\n"
        );
    }

    #[test]
    fn test_one_flush_per_add() {
        let mut batcher = batcher(2);
        add(&mut batcher, "insert into t values (1), (2), (3), (4), (5)");
        assert_eq!(batcher.output(), "insert into t values (1), (2);\n");
        assert_eq!(batcher.stats().batches, 1);

        let output = batcher.flush_batches();
        assert_eq!(
            output.sql,
            "insert into t values (1), (2);\ninsert into t values (3), (4), (5);\n"
        );
        assert_eq!(output.stats.batches, 2);
    }

    #[test]
    fn test_passthrough_is_immediate() {
        let mut batcher = batcher(10);
        add(&mut batcher, "insert into t values (1)");
        add(&mut batcher, "CREATE INDEX i ON t (a)");
        add(&mut batcher, "insert into t select 1");
        assert_eq!(
            batcher.output(),
            "create index i on t(a);\ninsert into t select 1;\n"
        );
        let output = batcher.flush_batches();
        assert!(output.sql.ends_with("insert into t values (1);\n"));
        assert_eq!(output.stats.passthrough, 2);
    }

    #[test]
    fn test_zero_row_insert_writes_nothing() {
        let mut batcher = batcher(1);
        add(&mut batcher, "insert into t values");
        let output = batcher.flush_batches();
        assert_eq!(output.sql, "");
        assert_eq!(output.stats.inserts, 1);
        assert_eq!(output.stats.rows, 0);
        assert_eq!(output.stats.groups, 1);
        assert_eq!(output.stats.batches, 0);
    }

    #[test]
    fn test_template_is_first_statement() {
        let mut batcher = batcher(10);
        add(&mut batcher, "insert into `t` (`a`) values (1)");
        add(&mut batcher, "insert into t (a) values (2)");
        assert_eq!(
            batcher.flush_batches().sql,
            "insert into `t`(`a`) values (1), (2);\n"
        );
    }

    #[test]
    fn test_groups_flush_in_creation_order() {
        let mut batcher = batcher(10);
        add(&mut batcher, "insert into b values (1)");
        add(&mut batcher, "insert into a values (1)");
        add(&mut batcher, "insert into b (x) values (2)");
        add(&mut batcher, "insert into b values (3)");
        let output = batcher.flush_batches();
        assert_eq!(
            output.sql,
            "insert into b values (1), (3);\ninsert into a values (1);\ninsert into b(x) values (2);\n"
        );
        assert_eq!(
            output.stats,
            BatchStats {
                statements: 4,
                passthrough: 0,
                inserts: 4,
                rows: 4,
                batches: 3,
                groups: 3,
            }
        );
    }

    #[test]
    fn test_batch_size_one() {
        let mut batcher = batcher(1);
        add(&mut batcher, "insert into t values (1)");
        add(&mut batcher, "insert into t values (2)");
        add(&mut batcher, "insert into t values (3)");
        assert_eq!(
            batcher.flush_batches().sql,
            "insert into t values (1);\ninsert into t values (2);\ninsert into t values (3);\n"
        );
    }
}
