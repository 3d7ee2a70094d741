//! Submodule defining the errors used across the crate.

use crate::sql::ParseError;

/// Errors that can abort a batching run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The statement starting at `offset` could not be parsed.
    #[error("Failed to parse statement at byte {offset}: {source}")]
    Parse {
        /// Byte offset in the input where parsing of the statement began.
        offset: usize,
        /// The parser error, with positions relative to `offset`.
        source: ParseError,
    },
    /// Serializing a table signature into its digest failed.
    #[error("Failed to compute table signature")]
    Signature(#[from] core::fmt::Error),
}
