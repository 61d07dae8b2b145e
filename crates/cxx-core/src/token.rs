// Lexical tokens as seen by visitors

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token classification used by the visitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,
    /// End of the token stream
    Eof,
    /// Keywords, punctuators, operators and everything else
    Other,
}

/// A single lexical token
///
/// `line` and `column` are both 1-based; the column counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
    /// Synthesized by the parser rather than present in the source text
    pub generated: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
            generated: false,
        }
    }

    pub fn identifier(value: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TokenKind::Identifier, value, line, column)
    }

    pub fn number(value: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TokenKind::NumericLiteral, value, line, column)
    }

    pub fn string(value: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TokenKind::StringLiteral, value, line, column)
    }

    pub fn character(value: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TokenKind::CharacterLiteral, value, line, column)
    }

    pub fn other(value: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TokenKind::Other, value, line, column)
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }

    /// Mark the token as synthesized
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Length of the verbatim value in characters
    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' at {}:{}", self.kind, self.value, self.line, self.column)
    }
}
