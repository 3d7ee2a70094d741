//! SQL parser producing one statement at a time.
//!
//! Only the statements the batcher needs to look inside get a structured
//! form: `INSERT INTO` and `CREATE TABLE`. Everything else is kept as the
//! token list it was written as, which is enough to print it back in
//! canonical form.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::lexer::{Keyword, Lexer, LexerError, Token, TokenKind, Word};

/// An identifier, possibly quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    /// The identifier without quotes.
    pub value: String,
    /// Quote character, if the identifier was quoted.
    pub quote: Option<char>,
}

impl From<&Word> for Ident {
    fn from(word: &Word) -> Self {
        Self {
            value: word.value.clone(),
            quote: word.quote,
        }
    }
}

/// A possibly schema-qualified name such as `db.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(pub Vec<Ident>);

impl ObjectName {
    /// The name with quoting removed, parts joined by `.`.
    #[must_use]
    pub fn unquoted(&self) -> String {
        let mut name = String::new();
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                name.push('.');
            }
            name.push_str(&part.value);
        }
        name
    }
}

/// One value expression inside a row, kept as tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr(pub Vec<Token>);

/// A parenthesized value tuple.
pub type Row = Vec<Expr>;

/// Where an INSERT takes its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSource {
    /// A literal `VALUES (...), (...)` list with nothing after it.
    Values(Vec<Row>),
    /// Anything else (`SELECT ...`, `SET ...`, or values followed by more
    /// clauses), kept as tokens.
    Query(Vec<Token>),
}

/// An `INSERT INTO` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: ObjectName,
    /// Explicit column list; `None` when the statement has none.
    pub columns: Option<Vec<Ident>>,
    /// Row source.
    pub source: RowSource,
}

/// A column type such as `int` or `varchar(255)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    /// Type name as written.
    pub name: String,
    /// Tokens inside the type's parentheses.
    pub args: Option<Vec<Token>>,
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: Ident,
    /// Column type, absent for typeless columns.
    pub data_type: Option<DataType>,
    /// Constraints and options following the type (`not null`, `default 0`, ...).
    pub options: Vec<Token>,
}

/// One comma-separated item of a CREATE TABLE body.
#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    /// A column definition.
    Column(ColumnDef),
    /// A table constraint or index definition, kept as tokens.
    Constraint(Vec<Token>),
}

/// A CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Whether `IF NOT EXISTS` was given.
    pub if_not_exists: bool,
    /// Table name.
    pub name: ObjectName,
    /// Columns and constraints, in order.
    pub elements: Vec<TableElement>,
    /// Table options after the closing parenthesis.
    pub options: Vec<Token>,
}

/// A parsed SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement.
    CreateTable(CreateTable),
    /// INSERT INTO statement.
    Insert(InsertStatement),
    /// Any other statement, kept as tokens.
    Other(Vec<Token>),
}

/// SQL parser errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// No statement left in the input.
    #[error("End of input")]
    Eof,
    /// Lexer error.
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),
    /// Unexpected token.
    #[error("Unexpected token `{found}` at position {pos}, expected {expected}")]
    UnexpectedToken {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: String,
        /// Position in input.
        pos: usize,
    },
    /// Statement ended too early.
    #[error("Unexpected end of statement, expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: &'static str,
    },
    /// Parenthesis without a partner.
    #[error("Unbalanced parenthesis at position {pos}")]
    UnbalancedParens {
        /// Position in input.
        pos: usize,
    },
    /// Empty column list.
    #[error("Empty column list in CREATE TABLE")]
    EmptyColumnList,
}

/// Parse the first statement of `input`.
///
/// Returns the statement and the number of bytes consumed, including the
/// terminating `;` and any empty statements before it.
///
/// # Errors
///
/// Returns [`ParseError::Eof`] when nothing but whitespace, comments and `;`
/// remain, or any other [`ParseError`] when the statement is malformed.
pub fn parse_one(input: &str) -> Result<(Statement, usize), ParseError> {
    let mut parser = Parser::new(input);
    let statement = parser.parse_statement()?;
    Ok((statement, parser.position()))
}

/// SQL parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Byte offset just past the last parsed statement.
    #[must_use]
    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    /// Parse all statements from the input.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn parse_all(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(ParseError::Eof) => return Ok(statements),
                Err(err) => return Err(err),
            }
        }
    }

    /// Parse the next statement, consuming its terminating `;`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Eof`] once the input is exhausted.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        // Skip empty statements
        while self.lexer.peek()?.kind == TokenKind::Semicolon {
            self.lexer.next()?;
        }
        if self.lexer.peek()?.kind == TokenKind::Eof {
            return Err(ParseError::Eof);
        }

        let tokens = self.statement_tokens()?;
        Self::from_tokens(tokens)
    }

    /// Collect tokens up to the end of the statement.
    fn statement_tokens(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.lexer.next()?;
            match token.kind {
                TokenKind::Eof | TokenKind::Semicolon => {
                    if depth > 0 {
                        return Err(ParseError::UnbalancedParens { pos: token.pos });
                    }
                    return Ok(tokens);
                }
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(ParseError::UnbalancedParens { pos: token.pos })?;
                }
                _ => {}
            }
            tokens.push(token);
        }
    }

    fn from_tokens(tokens: Vec<Token>) -> Result<Statement, ParseError> {
        let mut cursor = Cursor::new(&tokens);
        let parsed = match cursor.peek_keyword() {
            Some(Keyword::Insert) => cursor.parse_insert()?.map(Statement::Insert),
            Some(Keyword::Create) => cursor.parse_create_table()?.map(Statement::CreateTable),
            _ => None,
        };
        if let Some(statement) = parsed {
            return Ok(statement);
        }

        let Some(first) = tokens.first() else {
            return Err(ParseError::Eof);
        };
        if !matches!(first.kind, TokenKind::Word(_) | TokenKind::LParen) {
            return Err(ParseError::UnexpectedToken {
                expected: "a statement",
                found: first.to_string(),
                pos: first.pos,
            });
        }
        Ok(Statement::Other(tokens))
    }
}

/// Column keywords that start options rather than a type name.
fn starts_column_option(word: &Word) -> bool {
    matches!(
        word.keyword,
        Some(
            Keyword::AutoIncrement
                | Keyword::Check
                | Keyword::Collate
                | Keyword::Comment
                | Keyword::Constraint
                | Keyword::Default
                | Keyword::Key
                | Keyword::Not
                | Keyword::Null
                | Keyword::Primary
                | Keyword::References
                | Keyword::Unique
        )
    )
}

/// Keywords that open a table-level constraint or index.
fn starts_table_constraint(keyword: Option<Keyword>) -> bool {
    matches!(
        keyword,
        Some(
            Keyword::Check
                | Keyword::Constraint
                | Keyword::Foreign
                | Keyword::Fulltext
                | Keyword::Index
                | Keyword::Key
                | Keyword::Primary
                | Keyword::Spatial
                | Keyword::Unique
        )
    )
}

/// Cursor over the balanced token list of one statement.
struct Cursor<'t> {
    tokens: &'t [Token],
    index: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.index + n)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.peek().and_then(|token| token.kind.keyword())
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|token| &token.kind == kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    fn is_empty(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn rest(&mut self) -> Vec<Token> {
        let rest = self.tokens[self.index..].to_vec();
        self.index = self.tokens.len();
        rest
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                expected,
                found: token.to_string(),
                pos: token.pos,
            },
            None => ParseError::UnexpectedEof { expected },
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_is(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek_keyword() == Some(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Expect a word and return it as an identifier.
    ///
    /// Keywords are accepted too, as is common in SQL dialects.
    fn expect_ident(&mut self, expected: &'static str) -> Result<Ident, ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => {
                self.index += 1;
                Ok(Ident::from(word))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_object_name(&mut self) -> Result<ObjectName, ParseError> {
        let mut parts = alloc::vec![self.expect_ident("table name")?];
        while self.eat(&TokenKind::Period) {
            parts.push(self.expect_ident("name after `.`")?);
        }
        Ok(ObjectName(parts))
    }

    /// Consume a parenthesized group and return the tokens inside it.
    fn group(&mut self) -> Result<&'t [Token], ParseError> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let start = self.index;
        let mut depth = 0usize;
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth == 0 => return Ok(&self.tokens[start..self.index - 1]),
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
        }
        Err(ParseError::UnexpectedEof { expected: "`)`" })
    }

    /// Consume tokens up to the next top-level `,` or `)` without consuming it.
    fn list_item(&mut self, expected: &'static str) -> Result<&'t [Token], ParseError> {
        let start = self.index;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen | TokenKind::Comma if depth == 0 => break,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.index += 1;
        }
        if self.index == start {
            return Err(self.unexpected(expected));
        }
        Ok(&self.tokens[start..self.index])
    }

    /// Parse `INSERT INTO`.
    ///
    /// Returns `None` for INSERT forms that are printed back as written
    /// (`INSERT IGNORE`, `INSERT LOW_PRIORITY`, ...).
    fn parse_insert(&mut self) -> Result<Option<InsertStatement>, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        if !self.eat_keyword(Keyword::Into) {
            return Ok(None);
        }

        let table = self.parse_object_name()?;

        // Optional column list, unless the parenthesis opens a subquery
        let mut columns = None;
        if self.peek_is(&TokenKind::LParen)
            && !matches!(
                self.peek_nth(1).and_then(|token| token.kind.keyword()),
                Some(Keyword::Select | Keyword::With)
            )
        {
            self.index += 1;
            let mut list = Vec::new();
            if !self.eat(&TokenKind::RParen) {
                loop {
                    list.push(self.expect_ident("column name")?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "`,` or `)`")?;
            }
            columns = Some(list);
        }

        let source_start = self.index;
        if self.eat_keyword(Keyword::Values) || self.eat_keyword(Keyword::Value) {
            if let Some(rows) = self.parse_rows()? {
                return Ok(Some(InsertStatement {
                    table,
                    columns,
                    source: RowSource::Values(rows),
                }));
            }
            self.index = source_start;
        }

        if self.is_empty() {
            return Err(self.unexpected("VALUES or a query"));
        }
        Ok(Some(InsertStatement {
            table,
            columns,
            source: RowSource::Query(self.rest()),
        }))
    }

    /// Parse the tuples after `VALUES`.
    ///
    /// Returns `None` when the list is not a plain tuple list running to the
    /// end of the statement.
    fn parse_rows(&mut self) -> Result<Option<Vec<Row>>, ParseError> {
        let mut rows = Vec::new();
        if self.is_empty() {
            return Ok(Some(rows));
        }

        loop {
            if !self.eat(&TokenKind::LParen) {
                return Ok(None);
            }
            let mut row = Vec::new();
            if !self.eat(&TokenKind::RParen) {
                loop {
                    row.push(Expr(self.list_item("value")?.to_vec()));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "`,` or `)`")?;
            }
            rows.push(row);

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(self.is_empty().then_some(rows))
    }

    /// Parse `CREATE TABLE`.
    ///
    /// Returns `None` for other CREATE statements and for tables without a
    /// parenthesized body (`CREATE TABLE t LIKE u`, `CREATE TABLE t AS ...`).
    fn parse_create_table(&mut self) -> Result<Option<CreateTable>, ParseError> {
        self.expect_keyword(Keyword::Create)?;
        if !self.eat_keyword(Keyword::Table) {
            return Ok(None);
        }

        let if_not_exists = self.eat_keyword(Keyword::If);
        if if_not_exists {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
        }

        let name = self.parse_object_name()?;
        if !self.eat(&TokenKind::LParen) {
            return Ok(None);
        }
        if self.peek_is(&TokenKind::RParen) {
            return Err(ParseError::EmptyColumnList);
        }

        let mut elements = Vec::new();
        loop {
            let item = self.list_item("column definition")?;
            elements.push(Self::parse_table_element(item)?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "`,` or `)`")?;

        Ok(Some(CreateTable {
            if_not_exists,
            name,
            elements,
            options: self.rest(),
        }))
    }

    fn parse_table_element(item: &[Token]) -> Result<TableElement, ParseError> {
        let mut cursor = Cursor::new(item);
        if starts_table_constraint(cursor.peek_keyword()) {
            return Ok(TableElement::Constraint(item.to_vec()));
        }

        let name = cursor.expect_ident("column name")?;
        let data_type = match cursor.peek() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) if word.quote.is_none() && !starts_column_option(word) => {
                cursor.index += 1;
                let args = if cursor.peek_is(&TokenKind::LParen) {
                    Some(cursor.group()?.to_vec())
                } else {
                    None
                };
                Some(DataType {
                    name: word.value.clone(),
                    args,
                })
            }
            _ => None,
        };

        Ok(TableElement::Column(ColumnDef {
            name,
            data_type,
            options: cursor.rest(),
        }))
    }
}
