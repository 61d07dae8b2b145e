/*!
# Copy-Paste Detection Tokens

Produces the normalized token stream a duplication engine compares. Only tokens
inside function bodies are emitted.

## Architecture

- `ScopeTracker`: depth of enclosing function definitions
- `NormalizationPolicy`: identifier and literal placeholders
- `token_range` / `InputFile`: validated source ranges
- `FileTokenSink`: per-file accumulation, flushed once
- `CpdVisitor`: drives all of the above from traversal events
- `CpdEngine`: where flushed tokens go; `CpdTokenStore` keeps them in memory
*/

pub mod normalizer;
pub mod range;
pub mod scope;
pub mod sink;
pub mod visitor;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use normalizer::NormalizationPolicy;
pub use range::{token_range, InputFile, InputFileSet, RangeError, TextPointer, TextRange};
pub use scope::{ScopeError, ScopeTracker};
pub use sink::FileTokenSink;
pub use visitor::CpdVisitor;

/// One emitted unit: where the token is and what it compares as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpdToken {
    pub range: TextRange,
    pub image: String,
}

/// Consumer of the per-file token sequences
pub trait CpdEngine {
    /// Receive the complete token sequence of one file
    fn save(&mut self, file: &InputFile, tokens: Vec<CpdToken>);
}

/// Tokens of one file, as reported by `CpdTokenStore::report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTokens {
    pub path: PathBuf,
    pub tokens: Vec<CpdToken>,
}

/// In-memory engine keeping every saved file in save order
#[derive(Debug, Default, Clone)]
pub struct CpdTokenStore {
    files: IndexMap<PathBuf, Vec<CpdToken>>,
    flushes: Vec<PathBuf>,
}

impl CpdTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self, path: &Path) -> Option<&[CpdToken]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Images of a file's tokens, empty when the file was never saved
    pub fn images(&self, path: &Path) -> Vec<&str> {
        self.tokens(path)
            .map(|tokens| tokens.iter().map(|token| token.image.as_str()).collect())
            .unwrap_or_default()
    }

    /// How many times a file was saved
    pub fn flush_count(&self, path: &Path) -> usize {
        self.flushes.iter().filter(|flushed| flushed.as_path() == path).count()
    }

    /// Every save in order
    pub fn flushes(&self) -> &[PathBuf] {
        &self.flushes
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn token_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn report(&self) -> Vec<FileTokens> {
        self.files
            .iter()
            .map(|(path, tokens)| FileTokens {
                path: path.clone(),
                tokens: tokens.clone(),
            })
            .collect()
    }
}

impl CpdEngine for CpdTokenStore {
    fn save(&mut self, file: &InputFile, tokens: Vec<CpdToken>) {
        tracing::debug!(
            file = %file.path().display(),
            tokens = tokens.len(),
            "saving cpd tokens"
        );
        self.flushes.push(file.path().to_path_buf());
        self.files.insert(file.path().to_path_buf(), tokens);
    }
}
