//! SQL lexer for tokenizing input.
//!
//! Positions are byte offsets into the lexed input. Literal text (numbers,
//! string contents, identifier spelling) is kept as written so the printer can
//! reproduce it without reinterpreting values.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

macro_rules! define_keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// Words the printer treats as keywords and renders in lowercase.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
        }

        impl Keyword {
            /// Every known keyword.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),*];

            /// Canonical (lowercase) spelling of the keyword.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

define_keywords! {
    Add => "add",
    All => "all",
    Alter => "alter",
    And => "and",
    As => "as",
    Asc => "asc",
    AutoIncrement => "auto_increment",
    Begin => "begin",
    Between => "between",
    By => "by",
    Cascade => "cascade",
    Case => "case",
    Character => "character",
    Charset => "charset",
    Check => "check",
    Collate => "collate",
    Column => "column",
    Comment => "comment",
    Commit => "commit",
    Constraint => "constraint",
    Create => "create",
    Database => "database",
    Default => "default",
    Delete => "delete",
    Desc => "desc",
    Distinct => "distinct",
    Drop => "drop",
    Duplicate => "duplicate",
    Else => "else",
    End => "end",
    Engine => "engine",
    Exists => "exists",
    False => "false",
    Foreign => "foreign",
    From => "from",
    Fulltext => "fulltext",
    Group => "group",
    Having => "having",
    If => "if",
    Ignore => "ignore",
    In => "in",
    Index => "index",
    Inner => "inner",
    Insert => "insert",
    Into => "into",
    Is => "is",
    Join => "join",
    Key => "key",
    Left => "left",
    Like => "like",
    Limit => "limit",
    Lock => "lock",
    Not => "not",
    Null => "null",
    Offset => "offset",
    On => "on",
    Or => "or",
    Order => "order",
    Outer => "outer",
    Primary => "primary",
    Read => "read",
    References => "references",
    Replace => "replace",
    Returning => "returning",
    Right => "right",
    Rollback => "rollback",
    Select => "select",
    Set => "set",
    Spatial => "spatial",
    Table => "table",
    Tables => "tables",
    Temporary => "temporary",
    Then => "then",
    Transaction => "transaction",
    True => "true",
    Truncate => "truncate",
    Union => "union",
    Unique => "unique",
    Unlock => "unlock",
    Unsigned => "unsigned",
    Update => "update",
    Use => "use",
    Using => "using",
    Value => "value",
    Values => "values",
    View => "view",
    When => "when",
    Where => "where",
    With => "with",
    Write => "write",
    Zerofill => "zerofill",
}

impl Keyword {
    /// Keywords that double as function names and print without a space
    /// before their argument list.
    #[must_use]
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            Keyword::Database | Keyword::If | Keyword::Left | Keyword::Replace | Keyword::Right
        )
    }

    /// Reserved words can never name a table or column without quotes.
    /// The rest are keywords only in some positions.
    #[must_use]
    pub fn is_reserved(self) -> bool {
        !matches!(
            self,
            Keyword::AutoIncrement
                | Keyword::Begin
                | Keyword::Charset
                | Keyword::Comment
                | Keyword::Commit
                | Keyword::Duplicate
                | Keyword::End
                | Keyword::Engine
                | Keyword::Offset
                | Keyword::Returning
                | Keyword::Rollback
                | Keyword::Tables
                | Keyword::Temporary
                | Keyword::Transaction
                | Keyword::Truncate
                | Keyword::Value
                | Keyword::View
        )
    }

    /// Look up a bare word, ignoring ASCII case.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|keyword| keyword.as_str().eq_ignore_ascii_case(word))
    }
}

/// Multi-character operators, longest first so matching is greedy.
const OPERATORS: &[&str] = &[
    "<=>", "->>", "<>", "<=", ">=", "!=", "==", "||", "&&", "::", ":=", "<<", ">>", "->", "=",
    "<", ">", "+", "-", "*", "/", "%", "!", "|", "&", "^", "~", "?", ":",
];

/// A bare or quoted word: keyword, identifier or function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    /// The word as written, without surrounding quotes and with doubled
    /// quotes collapsed.
    pub value: String,
    /// The quote character for quoted identifiers (`` ` ``).
    pub quote: Option<char>,
    /// Set for unquoted words that match the keyword table.
    pub keyword: Option<Keyword>,
}

impl Word {
    /// Whether this is the given unquoted keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword == Some(keyword)
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The position in the input where this token starts.
    pub pos: usize,
}

/// The different kinds of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A keyword or identifier.
    Word(Word),
    /// Numeric literal, exactly as written.
    Number(String),
    /// String literal.
    String {
        /// Introducer written before the opening quote (`N`, `b`, `_utf8mb4`).
        prefix: Option<String>,
        /// Raw text between the quotes, escapes untouched.
        raw: String,
        /// The quote character used (`'` or `"`).
        quote: char,
    },
    /// Blob literal (X'...').
    Blob(Vec<u8>),
    /// Operator or other punctuation.
    Op(&'static str),
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Comma
    Comma,
    /// Semicolon
    Semicolon,
    /// Period
    Period,
    /// End of input
    Eof,
}

impl TokenKind {
    /// The keyword this token stands for, if it is an unquoted keyword.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            TokenKind::Word(word) => word.keyword,
            _ => None,
        }
    }
}

/// SQL lexer that produces tokens from input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Token>,
    /// Start of the open `/*! ... */` section, if any.
    conditional: Option<usize>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
            conditional: None,
        }
    }

    /// Byte offset just past the last token handed out (or peeked).
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Peek at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is malformed.
    pub fn peek(&mut self) -> Result<&Token, LexerError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is malformed.
    pub fn next(&mut self) -> Result<Token, LexerError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.next_token()
    }

    /// Skip whitespace and comments.
    ///
    /// The body of a MySQL conditional comment (`/*!40101 ... */`) is lexed
    /// as SQL: only its opening marker, version number and closing `*/` are
    /// skipped.
    fn skip_whitespace(&mut self) -> Result<(), LexerError> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            let next = bytes.get(self.pos + 1).copied();
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if self.conditional.is_some() && b == b'*' && next == Some(b'/') {
                self.conditional = None;
                self.pos += 2;
            } else if b == b'#' || (b == b'-' && next == Some(b'-') && self.dash_comment_follows()) {
                // Line comment
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/'
                && next == Some(b'*')
                && bytes.get(self.pos + 2) == Some(&b'!')
                && self.conditional.is_none()
            {
                self.conditional = Some(self.pos);
                self.pos += 3;
                let digits = bytes[self.pos..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if matches!(digits, 5 | 6) {
                    self.pos += digits;
                }
            } else if b == b'/' && next == Some(b'*') {
                // Block comment
                let start = self.pos;
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                if self.pos + 1 >= bytes.len() {
                    return Err(LexerError::UnterminatedComment { pos: start });
                }
                self.pos += 2;
            } else {
                break;
            }
        }
        match self.conditional {
            Some(start) if self.pos >= bytes.len() => {
                Err(LexerError::UnterminatedComment { pos: start })
            }
            _ => Ok(()),
        }
    }

    /// Whether the `--` at the current position starts a comment, which
    /// needs whitespace, a control character or the end of input after it.
    fn dash_comment_follows(&self) -> bool {
        self.input
            .as_bytes()
            .get(self.pos + 2)
            .is_none_or(|b| b.is_ascii_whitespace() || b.is_ascii_control())
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace()?;

        let start_pos = self.pos;
        let bytes = self.input.as_bytes();

        if self.pos >= bytes.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start_pos,
            });
        }

        let b = bytes[self.pos];
        let next = bytes.get(self.pos + 1).copied();

        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                return Ok(self.read_number(start_pos));
            }
            b'.' => TokenKind::Period,
            b'\'' | b'"' => return self.read_string(start_pos),
            b'`' => return self.read_quoted_identifier(start_pos),
            b'X' | b'x' if next == Some(b'\'') => return self.read_blob(start_pos),
            _ if b.is_ascii_digit() => return Ok(self.read_number(start_pos)),
            _ if is_ident_start(b) => return self.read_identifier(start_pos),
            _ => {
                let rest = &self.input[self.pos..];
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .ok_or(LexerError::UnexpectedChar {
                        char: b as char,
                        pos: start_pos,
                    })?;
                self.pos += op.len();
                return Ok(Token {
                    kind: TokenKind::Op(*op),
                    pos: start_pos,
                });
            }
        };

        self.pos += 1;
        Ok(Token {
            kind,
            pos: start_pos,
        })
    }

    /// Read a string literal whose opening quote is at the current position.
    /// Anything between `start_pos` and the quote is its introducer.
    fn read_string(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        let quote_pos = self.pos;
        let quote = bytes[self.pos];
        self.pos += 1;

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == b'\\' {
                self.pos += 2;
            } else if b == quote {
                // Doubled quote is an escaped quote
                if bytes.get(self.pos + 1) == Some(&quote) {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::String {
                            prefix: (quote_pos > start_pos)
                                .then(|| self.input[start_pos..quote_pos].to_string()),
                            raw: self.input[quote_pos + 1..self.pos - 1].to_string(),
                            quote: quote as char,
                        },
                        pos: start_pos,
                    });
                }
            } else {
                self.pos += 1;
            }
        }

        Err(LexerError::UnterminatedString { pos: start_pos })
    }

    fn read_quoted_identifier(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;

        let mut value = String::new();
        let mut chunk_start = self.pos;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'`' {
                value.push_str(&self.input[chunk_start..self.pos]);
                if bytes.get(self.pos + 1) == Some(&b'`') {
                    value.push('`');
                    self.pos += 2;
                    chunk_start = self.pos;
                } else {
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::Word(Word {
                            value,
                            quote: Some('`'),
                            keyword: None,
                        }),
                        pos: start_pos,
                    });
                }
            } else {
                self.pos += 1;
            }
        }

        Err(LexerError::UnterminatedIdentifier { pos: start_pos })
    }

    fn read_blob(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        self.pos += 2; // Skip X'

        let hex_start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b'\'' {
            let b = bytes[self.pos];
            if !b.is_ascii_hexdigit() {
                return Err(LexerError::InvalidHexDigit {
                    char: b as char,
                    pos: self.pos,
                });
            }
            self.pos += 1;
        }

        if self.pos >= bytes.len() {
            return Err(LexerError::UnterminatedBlob { pos: start_pos });
        }

        let hex = &bytes[hex_start..self.pos];
        self.pos += 1; // Skip closing quote

        // An odd digit count gets an implicit leading zero
        let mut blob = Vec::with_capacity(hex.len().div_ceil(2));
        let (head, tail) = hex.split_at(hex.len() % 2);
        if let Some(&digit) = head.first() {
            blob.push(hex_value(digit));
        }
        for pair in tail.chunks_exact(2) {
            blob.push((hex_value(pair[0]) << 4) | hex_value(pair[1]));
        }

        Ok(Token {
            kind: TokenKind::Blob(blob),
            pos: start_pos,
        })
    }

    fn read_number(&mut self, start_pos: usize) -> Token {
        let bytes = self.input.as_bytes();

        if bytes[self.pos] == b'0' && matches!(bytes.get(self.pos + 1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
        } else if bytes[self.pos] == b'0'
            && matches!(bytes.get(self.pos + 1), Some(b'b' | b'B'))
            && matches!(bytes.get(self.pos + 2), Some(b'0' | b'1'))
        {
            self.pos += 2;
            while self.pos < bytes.len() && matches!(bytes[self.pos], b'0' | b'1') {
                self.pos += 1;
            }
        } else {
            // Integer part
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }

            // Decimal point
            if self.pos < bytes.len() && bytes[self.pos] == b'.' {
                self.pos += 1;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            }

            // Exponent, only when digits follow
            if self.pos < bytes.len() && (bytes[self.pos] == b'e' || bytes[self.pos] == b'E') {
                let mut end = self.pos + 1;
                if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                    end += 1;
                }
                if end < bytes.len() && bytes[end].is_ascii_digit() {
                    self.pos = end;
                    while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                        self.pos += 1;
                    }
                }
            }
        }

        Token {
            kind: TokenKind::Number(self.input[start_pos..self.pos].to_string()),
            pos: start_pos,
        }
    }

    fn read_identifier(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();

        while self.pos < bytes.len() && is_ident_cont(bytes[self.pos]) {
            self.pos += 1;
        }

        let ident = &self.input[start_pos..self.pos];
        if is_literal_prefix(ident) && matches!(bytes.get(self.pos), Some(b'\'' | b'"')) {
            return self.read_string(start_pos);
        }

        Ok(Token {
            kind: TokenKind::Word(Word {
                value: ident.to_string(),
                quote: None,
                keyword: Keyword::lookup(ident),
            }),
            pos: start_pos,
        })
    }
}

/// Check if a byte can start an identifier.
///
/// Bytes of multi-byte UTF-8 sequences are accepted so identifiers never end
/// mid-character.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'@' || b == b'$' || !b.is_ascii()
}

/// Check if a byte can continue an identifier.
fn is_ident_cont(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Check if a word glued to a following quote introduces a string literal:
/// `b'..'` bit strings, `N'..'` national strings and `_charset'..'`.
fn is_literal_prefix(word: &str) -> bool {
    word.eq_ignore_ascii_case("b")
        || word.eq_ignore_ascii_case("n")
        || (word.len() > 1 && word.starts_with('_'))
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(word) => fmt::Display::fmt(word, f),
            TokenKind::Number(text) => f.write_str(text),
            TokenKind::String { prefix, raw, quote } => {
                if let Some(prefix) = prefix {
                    f.write_str(prefix)?;
                }
                write!(f, "{quote}{raw}{quote}")
            }
            TokenKind::Blob(blob) => {
                f.write_str("X'")?;
                for byte in blob {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
            TokenKind::Op(op) => f.write_str(op),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Period => f.write_str("."),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.keyword, self.quote) {
            (Some(keyword), None) => f.write_str(keyword.as_str()),
            (_, Some(quote)) => {
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
            (None, None) => f.write_str(&self.value),
        }
    }
}

/// Errors that can occur during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    /// Unexpected character in input.
    #[error("Unexpected character '{char}' at position {pos}")]
    UnexpectedChar {
        /// The unexpected character.
        char: char,
        /// Position in input.
        pos: usize,
    },
    /// Unterminated string literal.
    #[error("Unterminated string literal starting at position {pos}")]
    UnterminatedString {
        /// Position where string started.
        pos: usize,
    },
    /// Unterminated quoted identifier.
    #[error("Unterminated quoted identifier starting at position {pos}")]
    UnterminatedIdentifier {
        /// Position where the identifier started.
        pos: usize,
    },
    /// Unterminated blob literal.
    #[error("Unterminated blob literal starting at position {pos}")]
    UnterminatedBlob {
        /// Position where blob started.
        pos: usize,
    },
    /// Unterminated block comment.
    #[error("Unterminated block comment starting at position {pos}")]
    UnterminatedComment {
        /// Position where the comment started.
        pos: usize,
    },
    /// Invalid hex digit in blob.
    #[error("Invalid hex digit '{char}' at position {pos}")]
    InvalidHexDigit {
        /// The invalid character.
        char: char,
        /// Position in input.
        pos: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            if token.kind == TokenKind::Eof {
                return kinds;
            }
            kinds.push(token.kind);
        }
    }

    #[test]
    fn test_keywords_ignore_case() {
        let mut lexer = Lexer::new("INSERT into VaLuEs");
        assert_eq!(lexer.next().unwrap().kind.keyword(), Some(Keyword::Insert));
        assert_eq!(lexer.next().unwrap().kind.keyword(), Some(Keyword::Into));
        assert_eq!(lexer.next().unwrap().kind.keyword(), Some(Keyword::Values));
    }

    #[test]
    fn test_identifiers() {
        let mut lexer = Lexer::new("users my_table `order` `a``b`");
        let TokenKind::Word(users) = lexer.next().unwrap().kind else {
            panic!("Expected word");
        };
        assert_eq!(users.value, "users");
        assert_eq!(users.keyword, None);
        lexer.next().unwrap();
        let TokenKind::Word(order) = lexer.next().unwrap().kind else {
            panic!("Expected word");
        };
        assert_eq!(order.value, "order");
        assert_eq!(order.quote, Some('`'));
        assert_eq!(order.keyword, None);
        let TokenKind::Word(escaped) = lexer.next().unwrap().kind else {
            panic!("Expected word");
        };
        assert_eq!(escaped.value, "a`b");
        assert_eq!(escaped.to_string(), "`a``b`");
    }

    #[test]
    fn test_numbers_keep_their_text() {
        assert_eq!(
            kinds("42 3.10 1e10 .5 0xFF"),
            vec![
                TokenKind::Number("42".into()),
                TokenKind::Number("3.10".into()),
                TokenKind::Number("1e10".into()),
                TokenKind::Number(".5".into()),
                TokenKind::Number("0xFF".into()),
            ]
        );
    }

    #[test]
    fn test_strings_keep_escapes() {
        assert_eq!(
            kinds(r#"'it''s' "x" 'a\'b' 'ünï'"#),
            vec![
                TokenKind::String {
                    prefix: None,
                    raw: "it''s".into(),
                    quote: '\''
                },
                TokenKind::String {
                    prefix: None,
                    raw: "x".into(),
                    quote: '"'
                },
                TokenKind::String {
                    prefix: None,
                    raw: r"a\'b".into(),
                    quote: '\''
                },
                TokenKind::String {
                    prefix: None,
                    raw: "ünï".into(),
                    quote: '\''
                },
            ]
        );
    }

    #[test]
    fn test_blob() {
        assert_eq!(
            kinds("X'DEADBEEF' x'abc'"),
            vec![
                TokenKind::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]),
                TokenKind::Blob(vec![0x0A, 0xBC]),
            ]
        );
    }

    #[test]
    fn test_symbols_and_operators() {
        assert_eq!(
            kinds("(),;.>= <> - *"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Period,
                TokenKind::Op(">="),
                TokenKind::Op("<>"),
                TokenKind::Op("-"),
                TokenKind::Op("*"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("-- line\n/* block */ 1 # hash\n2"),
            vec![TokenKind::Number("1".into()), TokenKind::Number("2".into())]
        );
    }

    #[test]
    fn test_double_dash_needs_trailing_space() {
        assert_eq!(
            kinds("1--1"),
            vec![
                TokenKind::Number("1".into()),
                TokenKind::Op("-"),
                TokenKind::Op("-"),
                TokenKind::Number("1".into()),
            ]
        );
        assert_eq!(
            kinds("1 --\t2\n3 --"),
            vec![TokenKind::Number("1".into()), TokenKind::Number("3".into())]
        );
    }

    #[test]
    fn test_conditional_comment_body_is_lexed() {
        assert_eq!(
            kinds("/*!40101 SET x=1 */; /*! 2 */ /*!50503*/ /* 3 */"),
            vec![
                TokenKind::Word(Word {
                    value: "SET".into(),
                    quote: None,
                    keyword: Some(Keyword::Set),
                }),
                TokenKind::Word(Word {
                    value: "x".into(),
                    quote: None,
                    keyword: None,
                }),
                TokenKind::Op("="),
                TokenKind::Number("1".into()),
                TokenKind::Semicolon,
                TokenKind::Number("2".into()),
            ]
        );
        // Seven digits are not a version number
        assert_eq!(kinds("/*!1234567 */"), vec![TokenKind::Number("1234567".into())]);
        // The closing marker only ends an open section
        assert_eq!(
            kinds("2 */ 3"),
            vec![
                TokenKind::Number("2".into()),
                TokenKind::Op("*"),
                TokenKind::Op("/"),
                TokenKind::Number("3".into()),
            ]
        );
    }

    #[test]
    fn test_prefixed_literals_are_single_tokens() {
        let string = |prefix: Option<&str>, raw: &str| TokenKind::String {
            prefix: prefix.map(Into::into),
            raw: raw.into(),
            quote: '\'',
        };
        assert_eq!(
            kinds("b'101' N'abc' _utf8mb4'x' B'0' n'y' _binary 'z' 0b11 0B0"),
            vec![
                string(Some("b"), "101"),
                string(Some("N"), "abc"),
                string(Some("_utf8mb4"), "x"),
                string(Some("B"), "0"),
                string(Some("n"), "y"),
                TokenKind::Word(Word {
                    value: "_binary".into(),
                    quote: None,
                    keyword: None,
                }),
                string(None, "z"),
                TokenKind::Number("0b11".into()),
                TokenKind::Number("0B0".into()),
            ]
        );
        assert_eq!(string(Some("_utf8mb4"), "x").to_string(), "_utf8mb4'x'");
        let mut lexer = Lexer::new("  N'open");
        assert_eq!(lexer.next(), Err(LexerError::UnterminatedString { pos: 2 }));
    }

    #[test]
    fn test_binary_number_needs_a_digit() {
        assert_eq!(
            kinds("0b 0b2"),
            vec![
                TokenKind::Number("0".into()),
                TokenKind::Word(Word {
                    value: "b".into(),
                    quote: None,
                    keyword: None,
                }),
                TokenKind::Number("0".into()),
                TokenKind::Word(Word {
                    value: "b2".into(),
                    quote: None,
                    keyword: None,
                }),
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Lexer::new("'open").next(),
            Err(LexerError::UnterminatedString { pos: 0 })
        );
        assert_eq!(
            Lexer::new("  /* open").next(),
            Err(LexerError::UnterminatedComment { pos: 2 })
        );
        assert_eq!(
            Lexer::new("/*!40101 SET x = 1;").next().map(|token| token.kind.keyword()),
            Ok(Some(Keyword::Set))
        );
        let mut lexer = Lexer::new("/*!40101 SET");
        lexer.next().unwrap();
        assert_eq!(lexer.next(), Err(LexerError::UnterminatedComment { pos: 0 }));
        assert_eq!(
            Lexer::new("X'0G'").next(),
            Err(LexerError::InvalidHexDigit { char: 'G', pos: 3 })
        );
        assert_eq!(
            Lexer::new("{").next(),
            Err(LexerError::UnexpectedChar { char: '{', pos: 0 })
        );
    }

    #[test]
    fn test_position_tracks_consumed_input() {
        let mut lexer = Lexer::new("a ; b");
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.position(), 3);
    }
}
