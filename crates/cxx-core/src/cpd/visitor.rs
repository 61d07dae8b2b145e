/*!
# CPD Visitor

Single-pass orchestration of copy-paste token emission for one file at a time:
function-definition events drive the scope tracker, in-scope tokens are normalized,
given a validated range and appended to the file's sink, and the sink is flushed
when the file is left.
*/

use crate::visitor::{
    AstEvent, AstVisitor, DebugNote, Diagnostics, FileContext, TracingDiagnostics,
    FUNCTION_DEFINITION,
};
use crate::{CxxError, Result};

use super::normalizer::NormalizationPolicy;
use super::range::{token_range, InputFileSet};
use super::scope::ScopeTracker;
use super::sink::FileTokenSink;
use super::CpdEngine;

/// State of the file currently open, dropped when the file is left
#[derive(Debug, Default)]
struct FileState {
    scope: ScopeTracker,
    /// `None` when the file is outside the analysis set
    sink: Option<FileTokenSink>,
}

/// Emits normalized function-body tokens to a `CpdEngine`
pub struct CpdVisitor<E: CpdEngine> {
    policy: NormalizationPolicy,
    files: InputFileSet,
    engine: E,
    diagnostics: Box<dyn Diagnostics>,
    state: Option<FileState>,
}

impl<E: CpdEngine> CpdVisitor<E> {
    pub fn new(policy: NormalizationPolicy, files: InputFileSet, engine: E) -> Self {
        Self {
            policy,
            files,
            engine,
            diagnostics: Box::new(TracingDiagnostics),
            state: None,
        }
    }

    /// Route dropped-token notes somewhere other than `tracing`
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Whether a file is currently open
    pub fn is_file_open(&self) -> bool {
        self.state.is_some()
    }

    fn scope_error(ctx: &FileContext, source: super::ScopeError) -> CxxError {
        CxxError::Scope {
            path: ctx.path().to_path_buf(),
            source,
        }
    }
}

impl<E: CpdEngine> AstVisitor for CpdVisitor<E> {
    fn name(&self) -> &'static str {
        "CpdVisitor"
    }

    fn visit_file(&mut self, ctx: &mut FileContext) -> Result<()> {
        if self.state.is_some() {
            tracing::warn!(
                file = %ctx.path().display(),
                "previous file was never left, discarding its cpd tokens"
            );
        }

        let sink = self.files.resolve(ctx.path()).map(FileTokenSink::on_file);
        if sink.is_none() {
            tracing::trace!(file = %ctx.path().display(), "not in analysis set, no cpd tokens");
        }

        self.state = Some(FileState {
            scope: ScopeTracker::new(),
            sink,
        });
        Ok(())
    }

    fn visit_event(&mut self, ctx: &mut FileContext, event: &AstEvent) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        match event {
            AstEvent::EnterNode { kind, .. } if *kind == FUNCTION_DEFINITION => {
                state.scope.enter_scope();
            }
            AstEvent::LeaveNode { kind } if *kind == FUNCTION_DEFINITION => {
                state
                    .scope
                    .exit_scope()
                    .map_err(|source| Self::scope_error(ctx, source))?;
            }
            AstEvent::Token(token) if state.scope.is_inside_scope() => {
                let Some(sink) = state.sink.as_mut() else {
                    return Ok(());
                };
                let Some(image) = self.policy.normalize(token) else {
                    return Ok(());
                };

                // Parse errors can leave tokens with positions outside the file.
                match token_range(sink.file(), token) {
                    Ok(range) => sink.add_token(range, image),
                    Err(e) => self.diagnostics.debug(DebugNote {
                        message: format!("CPD token dropped: {e}"),
                        file: ctx.path().to_path_buf(),
                        line: token.line,
                        column: token.column,
                    }),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn leave_file(&mut self, ctx: &mut FileContext) -> Result<()> {
        let Some(state) = self.state.take() else {
            return Ok(());
        };

        if let Some(sink) = state.sink {
            sink.flush(&mut self.engine);
        }

        state
            .scope
            .finish()
            .map_err(|source| Self::scope_error(ctx, source))
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cpd::{CpdTokenStore, InputFile, ScopeError};
    use crate::parser::TranslationUnit;
    use crate::token::Token;
    use crate::visitor::{walk, RecordingDiagnostics};

    const SOURCE: &str = "int x = 1;\nint f() {\n  foo = 42;\n}\n";

    fn file_set() -> InputFileSet {
        let mut set = InputFileSet::new();
        set.insert(InputFile::from_text("a.cpp", SOURCE));
        set
    }

    /// Events for SOURCE: one global declaration, one function body
    fn events() -> Vec<AstEvent> {
        vec![
            AstEvent::Token(Token::other("int", 1, 1)),
            AstEvent::Token(Token::identifier("x", 1, 5)),
            AstEvent::Token(Token::other("=", 1, 7)),
            AstEvent::Token(Token::number("1", 1, 9)),
            AstEvent::Token(Token::other(";", 1, 10)),
            AstEvent::EnterNode { kind: FUNCTION_DEFINITION, line: 2 },
            AstEvent::Token(Token::other("int", 2, 1)),
            AstEvent::Token(Token::identifier("f", 2, 5)),
            AstEvent::Token(Token::other("(", 2, 6)),
            AstEvent::Token(Token::other(")", 2, 7)),
            AstEvent::Token(Token::other("{", 2, 9)),
            AstEvent::Token(Token::identifier("foo", 3, 3)),
            AstEvent::Token(Token::other("=", 3, 7)),
            AstEvent::Token(Token::number("42", 3, 9)),
            AstEvent::Token(Token::other(";", 3, 11)),
            AstEvent::Token(Token::other("}", 4, 1)),
            AstEvent::LeaveNode { kind: FUNCTION_DEFINITION },
            AstEvent::Token(Token::eof(5, 1)),
        ]
    }

    fn unit(path: &str, events: Vec<AstEvent>) -> TranslationUnit {
        TranslationUnit {
            path: PathBuf::from(path),
            events,
            has_errors: false,
        }
    }

    fn run(policy: NormalizationPolicy, events: Vec<AstEvent>) -> CpdTokenStore {
        let mut visitor = CpdVisitor::new(policy, file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("a.cpp");
        walk(&unit("a.cpp", events), &mut visitor, &mut ctx).unwrap();
        visitor.into_engine()
    }

    #[test]
    fn test_emits_only_function_body_tokens() {
        let store = run(NormalizationPolicy::default(), events());
        assert_eq!(
            store.images(Path::new("a.cpp")),
            vec!["int", "f", "(", ")", "{", "foo", "=", "42", ";", "}"]
        );
    }

    #[test]
    fn test_ranges_follow_source_positions() {
        let store = run(NormalizationPolicy::default(), events());
        let tokens = store.tokens(Path::new("a.cpp")).unwrap();
        let literal = tokens.iter().find(|token| token.image == "42").unwrap();

        assert_eq!(literal.range.start.line, 3);
        assert_eq!(literal.range.start.line_offset, 8);
        assert_eq!(literal.range.end.line_offset, 10);
    }

    #[test]
    fn test_policies_apply_placeholders() {
        let store = run(NormalizationPolicy::new(true, true), events());
        assert_eq!(
            store.images(Path::new("a.cpp")),
            vec!["int", "_I", "(", ")", "{", "_I", "=", "_N", ";", "}"]
        );
    }

    #[test]
    fn test_invalid_range_is_dropped_and_noted() {
        let mut events = events();
        // "foo" moved far beyond the end of line 3
        events[11] = AstEvent::Token(Token::identifier("foo", 3, 300));

        let diagnostics = RecordingDiagnostics::new();
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new())
            .with_diagnostics(diagnostics.clone());
        let mut ctx = FileContext::new("a.cpp");
        walk(&unit("a.cpp", events), &mut visitor, &mut ctx).unwrap();

        let store = visitor.into_engine();
        assert_eq!(
            store.images(Path::new("a.cpp")),
            vec!["int", "f", "(", ")", "{", "=", "42", ";", "}"]
        );
        let notes = diagnostics.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!((notes[0].line, notes[0].column), (3, 300));
        assert_eq!(notes[0].file, PathBuf::from("a.cpp"));
    }

    #[test]
    fn test_overflowing_column_is_dropped_and_noted() {
        let events = vec![
            AstEvent::EnterNode { kind: FUNCTION_DEFINITION, line: 2 },
            AstEvent::Token(Token::identifier("foo", 1, usize::MAX)),
            AstEvent::Token(Token::other(";", 3, 11)),
            AstEvent::LeaveNode { kind: FUNCTION_DEFINITION },
        ];

        let diagnostics = RecordingDiagnostics::new();
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new())
            .with_diagnostics(diagnostics.clone());
        let mut ctx = FileContext::new("a.cpp");
        walk(&unit("a.cpp", events), &mut visitor, &mut ctx).unwrap();

        assert_eq!(visitor.into_engine().images(Path::new("a.cpp")), vec![";"]);
        let notes = diagnostics.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!((notes[0].line, notes[0].column), (1, usize::MAX));
    }

    #[test]
    fn test_unresolved_file_never_flushes() {
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("other.cpp");
        walk(&unit("other.cpp", events()), &mut visitor, &mut ctx).unwrap();

        let store = visitor.into_engine();
        assert!(store.flushes().is_empty());
        assert!(store.tokens(Path::new("other.cpp")).is_none());
    }

    #[test]
    fn test_flushes_once_per_file_even_when_empty() {
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("a.cpp");
        walk(&unit("a.cpp", vec![AstEvent::Token(Token::eof(1, 1))]), &mut visitor, &mut ctx)
            .unwrap();

        assert!(!visitor.is_file_open());
        let store = visitor.into_engine();
        assert_eq!(store.flushes(), &[PathBuf::from("a.cpp")]);
        assert_eq!(store.tokens(Path::new("a.cpp")), Some(&[][..]));
    }

    #[test]
    fn test_unbalanced_scope_reported_after_flush() {
        let mut events = events();
        events.retain(|event| !event.is_leave(FUNCTION_DEFINITION));

        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("a.cpp");
        let err = walk(&unit("a.cpp", events), &mut visitor, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            CxxError::Scope {
                source: ScopeError::Unbalanced { depth: 1 },
                ..
            }
        ));
        assert_eq!(visitor.engine().flush_count(Path::new("a.cpp")), 1);
    }

    #[test]
    fn test_exit_without_enter_is_an_error() {
        let events = vec![AstEvent::LeaveNode { kind: FUNCTION_DEFINITION }];
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("a.cpp");
        let err = walk(&unit("a.cpp", events), &mut visitor, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            CxxError::Scope {
                source: ScopeError::ExitWithoutEnter,
                ..
            }
        ));
    }

    #[test]
    fn test_events_outside_file_are_ignored() {
        let mut visitor = CpdVisitor::new(NormalizationPolicy::default(), file_set(), CpdTokenStore::new());
        let mut ctx = FileContext::new("a.cpp");
        visitor
            .visit_event(&mut ctx, &AstEvent::Token(Token::identifier("x", 1, 1)))
            .unwrap();
        visitor.leave_file(&mut ctx).unwrap();

        assert!(visitor.engine().flushes().is_empty());
    }
}
