//! Grouping key for batchable INSERT statements.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};
use core::hash::{Hash, Hasher};

use xxhash_rust::xxh64::Xxh64;

use crate::errors::Error;
use crate::sql::InsertStatement;

/// `fmt::Write` sink feeding an xxh64 digest.
struct DigestWriter(Xxh64);

impl Write for DigestWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.update(s.as_bytes());
        Ok(())
    }
}

/// Identity of an INSERT target: table name plus explicit column list.
///
/// Two INSERT statements share a signature iff they name the same table and
/// the same column list, in the same order. A statement without a column
/// list has its own signature, distinct from any explicit list. Quoting is
/// not part of the identity.
///
/// Hashing uses only the 64-bit digest, while equality also compares the
/// table and columns, so a digest collision never merges two signatures.
#[derive(Debug, Clone, Eq)]
pub struct Signature {
    digest: u64,
    table: String,
    columns: Option<Vec<String>>,
}

impl Signature {
    /// Compute the signature of an INSERT statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] if serializing the key into the digest
    /// fails.
    pub fn of(insert: &InsertStatement) -> Result<Self, Error> {
        let table = insert.table.unquoted();
        let columns = insert.columns.as_ref().map(|columns| {
            columns
                .iter()
                .map(|column| column.value.clone())
                .collect::<Vec<_>>()
        });

        let mut writer = DigestWriter(Xxh64::new(0));
        write!(writer, "{table:?},")?;
        write!(writer, "{columns:?},")?;

        Ok(Self {
            digest: writer.0.digest(),
            table,
            columns,
        })
    }

    /// The 64-bit digest of the table name and column list.
    #[must_use]
    pub fn digest(&self) -> u64 {
        self.digest
    }

    /// The unquoted table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The unquoted column list, if the statement had one.
    #[must_use]
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.table == other.table && self.columns == other.columns
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.digest);
    }
}
