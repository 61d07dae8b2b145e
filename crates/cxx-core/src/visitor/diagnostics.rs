/*!
# Diagnostics

Debug-level notes raised while visiting a file. Visitors receive a `Diagnostics`
implementation instead of logging directly so hosts can redirect or capture them.
*/

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// A structured debug note tied to a source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugNote {
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

/// Sink for debug-level notes
pub trait Diagnostics {
    fn debug(&self, note: DebugNote);
}

/// Forwards notes to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, note: DebugNote) {
        tracing::debug!(
            file = %note.file.display(),
            line = note.line,
            column = note.column,
            "{}",
            note.message
        );
    }
}

/// Keeps every note in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    notes: Rc<RefCell<Vec<DebugNote>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<DebugNote> {
        self.notes.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.notes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn debug(&self, note: DebugNote) {
        self.notes.borrow_mut().push(note);
    }
}
