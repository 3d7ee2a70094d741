#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;

pub mod batcher;
pub mod errors;
pub mod signature;
pub mod sql;
#[cfg(feature = "testing")]
pub mod testing;
pub mod walker;

pub use batcher::{BatchConfig, BatchOutput, BatchStats, Batcher};
pub use errors::Error;
pub use signature::Signature;
pub use sql::{ParseError, Statement, parse_one};
pub use walker::walk_statements;

/// Rewrite a SQL script, merging its `INSERT ... VALUES` statements into
/// multi-row batches of at most `config.batch_size` rows, except for the final
/// flush of a group.
///
/// Non-INSERT statements keep their relative order and are written as soon as
/// they are read, so they can end up ahead of rows that preceded them in the
/// input. Every statement is written in canonical form followed by `;\n`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a statement cannot be parsed. No partial output
/// is returned.
pub fn batch_queries(input: &str, config: BatchConfig) -> Result<BatchOutput, Error> {
    let mut batcher = Batcher::new(config);
    walk_statements(input, |statement| batcher.add(statement))?;
    Ok(batcher.flush_batches())
}
