/*!
# Scope Tracker

Nesting depth of function definitions during one file pass.
*/

/// Scope balance violations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("function scope exited at depth 0")]
    ExitWithoutEnter,

    #[error("{depth} function scope(s) still open at end of file")]
    Unbalanced { depth: usize },
}

/// Counter of enclosing function-definition scopes
///
/// The depth never goes below zero; an unmatched exit is reported and ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScopeTracker {
    depth: usize,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.depth += 1;
    }

    pub fn exit_scope(&mut self) -> Result<(), ScopeError> {
        self.depth = self.depth.checked_sub(1).ok_or(ScopeError::ExitWithoutEnter)?;
        Ok(())
    }

    pub fn is_inside_scope(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Verify every entered scope was exited
    pub fn finish(&self) -> Result<(), ScopeError> {
        if self.depth == 0 {
            Ok(())
        } else {
            Err(ScopeError::Unbalanced { depth: self.depth })
        }
    }
}
