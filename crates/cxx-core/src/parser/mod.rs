//! C++ token stream source built on tree-sitter-cpp
//!
//! Parses a translation unit and flattens the syntax tree into the ordered
//! `AstEvent` sequence the visitors consume.


use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, TreeCursor};

use crate::token::{Token, TokenKind};
use crate::visitor::{AstEvent, Comment};
use crate::{CxxError, Result};

/// Literal nodes emitted as a single token instead of being descended into
const ATOMIC_LITERALS: &[&str] = &[
    "string_literal",
    "raw_string_literal",
    "char_literal",
    "system_lib_string",
];

/// Directives that take no part in the token stream
const DIRECTIVES: &[&str] = &[
    "preproc_include",
    "preproc_def",
    "preproc_function_def",
    "preproc_call",
];

/// A parsed file as an ordered event sequence
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub path: PathBuf,
    pub events: Vec<AstEvent>,
    /// The parser had to recover from syntax errors
    pub has_errors: bool,
}

impl TranslationUnit {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.events.iter().filter_map(|event| match event {
            AstEvent::Token(token) => Some(token),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.events.iter().filter_map(|event| match event {
            AstEvent::Comment(comment) => Some(comment),
            _ => None,
        })
    }
}

/// Map a tree-sitter-cpp node kind to a token kind
pub fn token_kind(node_kind: &str) -> TokenKind {
    match node_kind {
        "identifier" | "field_identifier" | "type_identifier" | "namespace_identifier"
        | "statement_identifier" => TokenKind::Identifier,
        "number_literal" => TokenKind::NumericLiteral,
        "string_literal" | "raw_string_literal" | "system_lib_string" => TokenKind::StringLiteral,
        "char_literal" => TokenKind::CharacterLiteral,
        _ => TokenKind::Other,
    }
}

/// How a node contributes to the event stream
#[derive(Debug, Clone, Copy)]
enum NodeClass {
    /// Named inner node bracketed by enter/leave events
    Branch,
    /// Anonymous inner node, only its children contribute
    Transparent,
    Token(TokenKind),
    Comment,
    /// Contributes nothing, children included
    Skipped,
}

/// C++ parser producing translation units
pub struct CxxParser {
    parser: tree_sitter::Parser,
}

impl CxxParser {
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| CxxError::Language(format!("Failed to set C++ language: {e}")))?;

        Ok(Self { parser })
    }

    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<TranslationUnit> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CxxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &source)
    }

    /// Parse source text; syntax errors are recovered from, never reported as `Err`
    pub fn parse(&mut self, path: impl Into<PathBuf>, source: &str) -> Result<TranslationUnit> {
        let path = path.into();
        let tree = self.parser.parse(source, None).ok_or_else(|| CxxError::Parse {
            path: path.clone(),
            message: "parser returned no tree".to_string(),
        })?;
        let root = tree.root_node();

        let mut events = Vec::new();
        let mut cursor = root.walk();
        'outer: loop {
            let class = classify(&cursor);
            let node = cursor.node();
            match class {
                NodeClass::Branch => events.push(AstEvent::EnterNode {
                    kind: node.kind(),
                    line: node.start_position().row + 1,
                }),
                NodeClass::Token(kind) => {
                    if let Some(token) = leaf_token(node, kind, source) {
                        events.push(AstEvent::Token(token));
                    }
                }
                NodeClass::Comment => {
                    let (line, column) = position(node, source);
                    events.push(AstEvent::Comment(Comment {
                        text: comment_text(node, source).to_string(),
                        line,
                        column,
                    }));
                }
                NodeClass::Transparent | NodeClass::Skipped => {}
            }

            let descend = matches!(class, NodeClass::Branch | NodeClass::Transparent);
            if descend && cursor.goto_first_child() {
                continue;
            }

            // Climb until a sibling is found, closing every finished branch
            loop {
                if matches!(classify(&cursor), NodeClass::Branch) {
                    events.push(AstEvent::LeaveNode {
                        kind: cursor.node().kind(),
                    });
                }
                if cursor.goto_next_sibling() {
                    continue 'outer;
                }
                if !cursor.goto_parent() {
                    break 'outer;
                }
            }
        }

        let (eof_line, eof_column) = end_position(source);
        events.push(AstEvent::Token(Token::eof(eof_line, eof_column)));

        tracing::debug!(
            file = %path.display(),
            events = events.len(),
            has_errors = root.has_error(),
            "parsed translation unit"
        );

        Ok(TranslationUnit {
            path,
            events,
            has_errors: root.has_error(),
        })
    }
}

fn classify(cursor: &TreeCursor) -> NodeClass {
    let node = cursor.node();
    let kind = node.kind();

    if node.is_missing() {
        return NodeClass::Token(token_kind(kind));
    }
    if kind == "comment" {
        return NodeClass::Comment;
    }
    if DIRECTIVES.contains(&kind) || kind.starts_with('#') || is_conditional_expression(cursor) {
        return NodeClass::Skipped;
    }
    if ATOMIC_LITERALS.contains(&kind) || node.child_count() == 0 {
        return NodeClass::Token(token_kind(kind));
    }
    if node.is_named() {
        NodeClass::Branch
    } else {
        NodeClass::Transparent
    }
}

/// Condition of `#if`/`#elif` and name of `#ifdef`/`#ifndef`
fn is_conditional_expression(cursor: &TreeCursor) -> bool {
    let Some(parent) = cursor.node().parent() else {
        return false;
    };
    match (parent.kind(), cursor.field_name()) {
        ("preproc_if" | "preproc_elif", Some("condition")) => true,
        ("preproc_ifdef" | "preproc_elifdef", Some("name")) => true,
        _ => false,
    }
}

fn leaf_token(node: Node, kind: TokenKind, source: &str) -> Option<Token> {
    let (line, column) = position(node, source);

    if node.is_missing() {
        // Inserted by error recovery, the expected kind stands in for the text
        return Some(Token::new(kind, node.kind(), line, column).generated());
    }
    if node.start_byte() == node.end_byte() {
        return None;
    }
    Some(Token::new(kind, node_text(node, source), line, column))
}

fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Line comments from CRLF sources end with the carriage return
fn comment_text<'s>(node: Node, source: &'s str) -> &'s str {
    let text = node_text(node, source);
    text.strip_suffix('\r').unwrap_or(text)
}

/// 1-based line and 1-based character column of a node start
fn position(node: Node, source: &str) -> (usize, usize) {
    let point = node.start_position();
    let start = node.start_byte();
    let line_start = start.saturating_sub(point.column);
    let column = source
        .get(line_start..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(point.column);
    (point.row + 1, column + 1)
}

/// Position just past the last character of the source
fn end_position(source: &str) -> (usize, usize) {
    let line = source.split('\n').count();
    let last = source.rsplit('\n').next().unwrap_or("");
    (line, last.chars().count() + 1)
}
