/*!
# Source Ranges

Input files of the analysis set, range validation against their line lengths, and
construction of token ranges.

Lines are 1-based. Line offsets inside a `TextRange` are 0-based character offsets,
while token columns are 1-based, so a token at column `c` starts at offset `c - 1`.
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::token::Token;
use crate::{CxxError, Result};

/// Why a range was rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("line {line} is out of range, file has {lines} line(s)")]
    LineOutOfBounds { line: usize, lines: usize },

    #[error("offset {offset} is beyond the end of line {line} (length {length})")]
    OffsetOutOfBounds {
        line: usize,
        offset: usize,
        length: usize,
    },

    #[error("start {start_line}:{start_offset} is not before end {end_line}:{end_offset}")]
    EmptyRange {
        start_line: usize,
        start_offset: usize,
        end_line: usize,
        end_offset: usize,
    },

    #[error("column 0 at line {line}, columns are 1-based")]
    ZeroColumn { line: usize },
}

/// A position inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPointer {
    pub line: usize,
    pub line_offset: usize,
}

/// Half-open range `[start, end)` of characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPointer,
    pub end: TextPointer,
}

/// A file of the analysis set with its line metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
    line_lengths: Vec<usize>,
}

impl InputFile {
    /// Build from file content; the number of lines is the newline count plus one
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let line_lengths = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().count())
            .collect();

        Self {
            path: path.into(),
            line_lengths,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CxxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(path, &text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> usize {
        self.line_lengths.len()
    }

    pub fn line_length(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|index| self.line_lengths.get(index).copied())
    }

    fn pointer(&self, line: usize, line_offset: usize) -> std::result::Result<TextPointer, RangeError> {
        let length = self.line_length(line).ok_or(RangeError::LineOutOfBounds {
            line,
            lines: self.lines(),
        })?;
        if line_offset > length {
            return Err(RangeError::OffsetOutOfBounds {
                line,
                offset: line_offset,
                length,
            });
        }
        Ok(TextPointer { line, line_offset })
    }

    /// Validated range; the start must be strictly before the end
    pub fn new_range(
        &self,
        start_line: usize,
        start_offset: usize,
        end_line: usize,
        end_offset: usize,
    ) -> std::result::Result<TextRange, RangeError> {
        let start = self.pointer(start_line, start_offset)?;
        let end = self.pointer(end_line, end_offset)?;
        if start >= end {
            return Err(RangeError::EmptyRange {
                start_line,
                start_offset,
                end_line,
                end_offset,
            });
        }
        Ok(TextRange { start, end })
    }
}

/// Range covered by `token` on its own line
pub fn token_range(file: &InputFile, token: &Token) -> std::result::Result<TextRange, RangeError> {
    let offset = token
        .column
        .checked_sub(1)
        .ok_or(RangeError::ZeroColumn { line: token.line })?;
    let end = offset
        .checked_add(token.char_len())
        .ok_or_else(|| RangeError::OffsetOutOfBounds {
            line: token.line,
            offset,
            length: file.line_length(token.line).unwrap_or(0),
        })?;
    file.new_range(token.line, offset, token.line, end)
}

/// The set of files under analysis, keyed by path
#[derive(Debug, Default, Clone)]
pub struct InputFileSet {
    files: IndexMap<PathBuf, Arc<InputFile>>,
}

impl InputFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every path into the set
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(InputFile::from_path(path)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, file: InputFile) {
        self.files.insert(file.path.clone(), Arc::new(file));
    }

    /// `None` when the path is not part of the analysis
    pub fn resolve(&self, path: &Path) -> Option<Arc<InputFile>> {
        self.files.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}
