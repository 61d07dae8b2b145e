/*!
# Visitor Framework

Event-driven traversal of a parsed translation unit.

## Overview

A `TranslationUnit` is a flat, ordered list of `AstEvent`s produced by a depth-first
walk of the syntax tree. Visitors implement `AstVisitor` and pattern match on the
events they care about:

- `EnterNode` / `LeaveNode` bracket every named syntax node
- `Token` carries each lexical token in source order
- `Comment` carries comments, which never appear as tokens

## Example Usage

```rust,no_run
use cxx_core::{walk, CxxParser, FileContext, CommentRegularExpressionCheck};

# fn main() -> cxx_core::Result<()> {
let mut parser = CxxParser::new()?;
let unit = parser.parse("a.cpp", "// TODO: remove\nint main() { return 0; }")?;

let mut check = CommentRegularExpressionCheck::new("(?i).*TODO.*", "Avoid TODO")?;
let mut ctx = FileContext::new("a.cpp");
walk(&unit, &mut check, &mut ctx)?;
assert_eq!(ctx.messages().len(), 1);
# Ok(())
# }
```
*/

pub mod diagnostics;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::TranslationUnit;
use crate::token::Token;
use crate::Result;

pub use diagnostics::{DebugNote, Diagnostics, RecordingDiagnostics, TracingDiagnostics};

/// Node kind of a function definition in the C++ grammar
pub const FUNCTION_DEFINITION: &str = "function_definition";

/// A comment as it appears in the source, delimiters included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
    pub column: usize,
}

/// One step of the traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstEvent {
    EnterNode { kind: &'static str, line: usize },
    LeaveNode { kind: &'static str },
    Token(Token),
    Comment(Comment),
}

impl AstEvent {
    pub fn is_enter(&self, node_kind: &str) -> bool {
        matches!(self, AstEvent::EnterNode { kind, .. } if *kind == node_kind)
    }

    pub fn is_leave(&self, node_kind: &str) -> bool {
        matches!(self, AstEvent::LeaveNode { kind } if *kind == node_kind)
    }
}

/// A rule violation reported by a visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMessage {
    pub rule: String,
    pub line: usize,
    pub message: String,
}

/// Per-file state shared by all visitors of one file
#[derive(Debug, Clone)]
pub struct FileContext {
    path: PathBuf,
    messages: Vec<CheckMessage>,
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            messages: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Report a violation at a line
    pub fn report_line(&mut self, rule: &str, line: usize, message: impl Into<String>) {
        self.messages.push(CheckMessage {
            rule: rule.to_string(),
            line,
            message: message.into(),
        });
    }

    pub fn messages(&self) -> &[CheckMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<CheckMessage> {
        self.messages
    }
}

/// Core trait for visitors driven over a translation unit
///
/// Hooks are called in order: `visit_file`, `visit_event` once per event, then
/// `leave_file`. A visitor sees exactly one file at a time.
pub trait AstVisitor {
    /// Human-readable name for this visitor
    fn name(&self) -> &'static str;

    /// Called before the first event of a file
    fn visit_file(&mut self, ctx: &mut FileContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for each event in traversal order
    fn visit_event(&mut self, ctx: &mut FileContext, event: &AstEvent) -> Result<()>;

    /// Called after the last event of a file, even when an earlier hook failed
    fn leave_file(&mut self, ctx: &mut FileContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// Drive one visitor over one translation unit
///
/// Event errors do not stop the traversal. The first error raised by any hook is
/// returned once `leave_file` has run.
pub fn walk(
    unit: &TranslationUnit,
    visitor: &mut dyn AstVisitor,
    ctx: &mut FileContext,
) -> Result<()> {
    let mut first_error = visitor.visit_file(ctx).err();

    if first_error.is_none() {
        for event in &unit.events {
            if let Err(e) = visitor.visit_event(ctx, event) {
                tracing::warn!(
                    visitor = visitor.name(),
                    file = %ctx.path().display(),
                    "visitor error: {e}"
                );
                first_error.get_or_insert(e);
            }
        }
    }

    let leave_result = visitor.leave_file(ctx);
    match first_error {
        Some(e) => Err(e),
        None => leave_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use crate::CxxError;

    /// Records the order of hook calls
    #[derive(Default)]
    struct TraceVisitor {
        calls: Vec<String>,
        fail_on_token: Option<String>,
    }

    impl AstVisitor for TraceVisitor {
        fn name(&self) -> &'static str {
            "TraceVisitor"
        }

        fn visit_file(&mut self, _ctx: &mut FileContext) -> Result<()> {
            self.calls.push("visit_file".to_string());
            Ok(())
        }

        fn visit_event(&mut self, _ctx: &mut FileContext, event: &AstEvent) -> Result<()> {
            match event {
                AstEvent::EnterNode { kind, .. } => self.calls.push(format!("enter {kind}")),
                AstEvent::LeaveNode { kind } => self.calls.push(format!("leave {kind}")),
                AstEvent::Token(token) => {
                    self.calls.push(format!("token {}", token.value));
                    if self.fail_on_token.as_deref() == Some(token.value.as_str()) {
                        return Err(CxxError::Config(format!("failed on {}", token.value)));
                    }
                }
                AstEvent::Comment(comment) => self.calls.push(format!("comment {}", comment.text)),
            }
            Ok(())
        }

        fn leave_file(&mut self, _ctx: &mut FileContext) -> Result<()> {
            self.calls.push("leave_file".to_string());
            Ok(())
        }
    }

    fn unit(events: Vec<AstEvent>) -> TranslationUnit {
        TranslationUnit {
            path: PathBuf::from("test.cpp"),
            events,
            has_errors: false,
        }
    }

    #[test]
    fn test_walk_calls_hooks_in_order() {
        let unit = unit(vec![
            AstEvent::EnterNode { kind: FUNCTION_DEFINITION, line: 1 },
            AstEvent::Token(Token::identifier("x", 1, 1)),
            AstEvent::LeaveNode { kind: FUNCTION_DEFINITION },
        ]);
        let mut visitor = TraceVisitor::default();
        let mut ctx = FileContext::new("test.cpp");

        walk(&unit, &mut visitor, &mut ctx).unwrap();

        assert_eq!(
            visitor.calls,
            vec![
                "visit_file",
                "enter function_definition",
                "token x",
                "leave function_definition",
                "leave_file"
            ]
        );
    }

    #[test]
    fn test_walk_continues_after_event_error() {
        let unit = unit(vec![
            AstEvent::Token(Token::identifier("a", 1, 1)),
            AstEvent::Token(Token::identifier("b", 1, 3)),
        ]);
        let mut visitor = TraceVisitor {
            fail_on_token: Some("a".to_string()),
            ..Default::default()
        };
        let mut ctx = FileContext::new("test.cpp");

        let result = walk(&unit, &mut visitor, &mut ctx);

        assert!(result.is_err());
        assert_eq!(visitor.calls, vec!["visit_file", "token a", "token b", "leave_file"]);
    }

    #[test]
    fn test_event_kind_helpers() {
        let enter = AstEvent::EnterNode { kind: FUNCTION_DEFINITION, line: 4 };
        assert!(enter.is_enter(FUNCTION_DEFINITION));
        assert!(!enter.is_leave(FUNCTION_DEFINITION));
        assert!(!AstEvent::Token(Token::eof(1, 1)).is_enter(FUNCTION_DEFINITION));
        assert_eq!(TokenKind::Eof, Token::eof(1, 1).kind);
    }

    #[test]
    fn test_context_collects_messages() {
        let mut ctx = FileContext::new("a.cpp");
        ctx.report_line("Rule", 3, "at line");
        ctx.report_line("Rule", 7, "further down");

        assert_eq!(ctx.messages()[0].line, 3);
        assert_eq!(ctx.messages()[1].line, 7);
        assert_eq!(ctx.into_messages().len(), 2);
    }
}
