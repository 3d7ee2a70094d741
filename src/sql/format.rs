//! SQL output formatting.
//!
//! Every node prints in one canonical form: lowercase keywords, single
//! spaces between tokens, `, ` between list items. Printing, parsing the
//! result and printing again gives the same text.

use core::fmt::{self, Display};

use super::lexer::{Keyword, Token, TokenKind, Word};
use super::parser::{
    ColumnDef, CreateTable, DataType, Expr, Ident, InsertStatement, ObjectName, Row, RowSource,
    Statement, TableElement,
};

/// Token sequence printed with canonical spacing.
struct TokenList<'a>(&'a [Token]);

impl Display for TokenList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<&TokenKind> = None;
        let mut prev_unary = false;
        for (i, token) in self.0.iter().enumerate() {
            let kind = &token.kind;
            let next = self.0.get(i + 1).map(|token| &token.kind);
            if let Some(prev) = prev {
                if needs_space(prev, prev_unary, kind) {
                    f.write_str(" ")?;
                }
            }
            prev_unary = matches!(kind, TokenKind::Op("-" | "+" | "~"))
                && prev.is_none_or(|prev| {
                    matches!(prev, TokenKind::LParen | TokenKind::Comma | TokenKind::Op(_))
                        || prev.keyword().is_some()
                });
            match kind {
                TokenKind::Word(word) if names_object(word, prev, next) => {
                    f.write_str(&word.value)?;
                }
                _ => kind.fmt(f)?,
            }
            prev = Some(kind);
        }
        Ok(())
    }
}

/// Whether a non-reserved keyword stands where a table or column name is
/// expected, in which case it keeps its spelling.
fn names_object(word: &Word, prev: Option<&TokenKind>, next: Option<&TokenKind>) -> bool {
    if word.keyword.is_none_or(Keyword::is_reserved) {
        return false;
    }
    matches!(prev, Some(TokenKind::Period))
        || matches!(next, Some(TokenKind::Period))
        || prev.and_then(TokenKind::keyword).is_some_and(|keyword| {
            matches!(
                keyword,
                Keyword::Database
                    | Keyword::Exists
                    | Keyword::From
                    | Keyword::Into
                    | Keyword::Join
                    | Keyword::Table
                    | Keyword::Tables
                    | Keyword::Update
                    | Keyword::Use
                    | Keyword::View
            )
        })
}

fn needs_space(prev: &TokenKind, prev_unary: bool, next: &TokenKind) -> bool {
    // Two minus signs never print as `--`
    if prev_unary {
        return matches!(next, TokenKind::Op(_));
    }
    match (prev, next) {
        // `1 .x` and `t. 5` would lex back as `1.` and `.5`
        (TokenKind::Number(_), TokenKind::Period) | (TokenKind::Period, TokenKind::Number(_)) => {
            true
        }
        (_, TokenKind::Comma | TokenKind::RParen | TokenKind::Semicolon | TokenKind::Period)
        | (TokenKind::LParen | TokenKind::Period, _) => false,
        (TokenKind::Word(word), TokenKind::LParen) => {
            word.keyword.is_some_and(|keyword| !keyword.is_function_like())
        }
        _ => true,
    }
}

/// Write `items` separated by `, `.
fn comma_separated<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

impl Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(quote) = self.quote else {
            return f.write_str(&self.value);
        };
        write!(f, "{quote}")?;
        for c in self.value.chars() {
            if c == quote {
                write!(f, "{quote}{quote}")?;
            } else {
                write!(f, "{c}")?;
            }
        }
        write!(f, "{quote}")
    }
}

impl Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            part.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        TokenList(&self.0).fmt(f)
    }
}

/// An INSERT printed with a replacement row list.
///
/// Created by [`InsertStatement::with_rows`].
pub struct InsertWithRows<'a> {
    insert: &'a InsertStatement,
    rows: &'a [Row],
}

impl InsertStatement {
    /// Print this statement with `rows` as its values list, whatever its own
    /// row source is.
    #[must_use]
    pub fn with_rows<'a>(&'a self, rows: &'a [Row]) -> InsertWithRows<'a> {
        InsertWithRows { insert: self, rows }
    }

    fn fmt_target(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert into {}", self.table)?;
        if let Some(columns) = &self.columns {
            f.write_str("(")?;
            comma_separated(f, columns)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl Display for InsertWithRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.insert.fmt_target(f)?;
        f.write_str(" values")?;
        for (i, row) in self.rows.iter().enumerate() {
            f.write_str(if i > 0 { ", (" } else { " (" })?;
            comma_separated(f, row)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            RowSource::Values(rows) => self.with_rows(rows).fmt(f),
            RowSource::Query(tokens) => {
                self.fmt_target(f)?;
                write!(f, " {}", TokenList(tokens))
            }
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.name.chars() {
            write!(f, "{}", c.to_ascii_lowercase())?;
        }
        if let Some(args) = &self.args {
            write!(f, "({})", TokenList(args))?;
        }
        Ok(())
    }
}

impl Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if let Some(data_type) = &self.data_type {
            write!(f, " {data_type}")?;
        }
        if !self.options.is_empty() {
            write!(f, " {}", TokenList(&self.options))?;
        }
        Ok(())
    }
}

impl Display for TableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableElement::Column(column) => column.fmt(f),
            TableElement::Constraint(tokens) => TokenList(tokens).fmt(f),
        }
    }
}

impl Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("create table ")?;
        if self.if_not_exists {
            f.write_str("if not exists ")?;
        }
        writeln!(f, "{} (", self.name)?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            write!(f, "\t{element}")?;
        }
        f.write_str("\n)")?;
        if !self.options.is_empty() {
            write!(f, " {}", TokenList(&self.options))?;
        }
        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable(create) => create.fmt(f),
            Statement::Insert(insert) => insert.fmt(f),
            Statement::Other(tokens) => TokenList(tokens).fmt(f),
        }
    }
}
