/*!
# File Token Sink

Accumulates the CPD tokens of the file currently being visited and hands them to
the duplication engine in one piece.
*/

use std::sync::Arc;

use super::range::{InputFile, TextRange};
use super::{CpdEngine, CpdToken};

/// Tokens of one open file
///
/// Created when a file of the analysis set is entered; consumed by `flush`, so a
/// sink can never be flushed twice or outlive its file.
#[derive(Debug)]
pub struct FileTokenSink {
    file: Arc<InputFile>,
    tokens: Vec<CpdToken>,
}

impl FileTokenSink {
    pub fn on_file(file: Arc<InputFile>) -> Self {
        Self {
            file,
            tokens: Vec::new(),
        }
    }

    pub fn file(&self) -> &InputFile {
        &self.file
    }

    pub fn add_token(&mut self, range: TextRange, image: impl Into<String>) {
        self.tokens.push(CpdToken {
            range,
            image: image.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn flush(self, engine: &mut dyn CpdEngine) {
        engine.save(&self.file, self.tokens);
    }
}
