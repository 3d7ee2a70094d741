//! Lightweight SQL parser and printer for statement batching.
//!
//! This module provides a parser that only understands as much SQL as the
//! batcher needs:
//! - `INSERT INTO` statements, with their table, column list and row source
//! - `CREATE TABLE` statements, for canonical multi-line printing
//!
//! Every other statement is kept as a token list. This is intentionally
//! limited compared to a full SQL parser like `sqlparser`: statements are
//! never validated, only split, classified and printed back.

mod format;
mod lexer;
mod parser;

pub use format::InsertWithRows;
pub use lexer::{Keyword, Lexer, LexerError, Token, TokenKind, Word};
pub use parser::{
    ColumnDef, CreateTable, DataType, Expr, Ident, InsertStatement, ObjectName, ParseError,
    Parser, Row, RowSource, Statement, TableElement, parse_one,
};
