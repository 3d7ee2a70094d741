//! Splits SQL text into statements, one parser call at a time.

use crate::errors::Error;
use crate::sql::{ParseError, Statement, parse_one};

/// Parse `input` statement by statement, handing each to `callback` in
/// source order.
///
/// The walk ends cleanly when the parser reports end of input or when the
/// remaining text is a single newline. Consumed slices that hold nothing but
/// whitespace and a `;` are skipped without calling `callback`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for the first statement that fails to parse, or
/// the first error returned by `callback`. Either aborts the walk.
pub fn walk_statements<F>(input: &str, mut callback: F) -> Result<(), Error>
where
    F: FnMut(Statement) -> Result<(), Error>,
{
    let mut offset = 0;
    while offset < input.len() {
        let remainder = &input[offset..];
        if remainder == "\n" {
            break;
        }

        let (statement, consumed) = match parse_one(remainder) {
            Ok(parsed) => parsed,
            Err(ParseError::Eof) => break,
            Err(source) => return Err(Error::Parse { offset, source }),
        };

        let parsed = remainder[..consumed].trim();
        let parsed = parsed.strip_suffix(';').unwrap_or(parsed);
        offset += consumed;
        if parsed.is_empty() {
            continue;
        }

        callback(statement)?;
    }
    Ok(())
}
