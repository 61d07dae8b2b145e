/*!
# Scanner

Reads C++ files, parses them and runs a set of visitors over each one. Files are
processed one after the other; a failure in one file is recorded in the summary and
never stops the remaining files.
*/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::parser::CxxParser;
use crate::visitor::{walk, AstVisitor, CheckMessage, FileContext};
use crate::DEFAULT_EXTENSIONS;

/// Outcome of scanning one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub messages: Vec<CheckMessage>,
    /// The parser recovered from syntax errors
    pub has_parse_errors: bool,
    pub errors: Vec<String>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Summary of a scan over many files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub files_processed: u64,
    pub files_failed: u64,
    pub reports: Vec<FileReport>,
}

impl ScanSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: FileReport) {
        self.files_processed += 1;
        if !report.success() {
            self.files_failed += 1;
        }
        self.reports.push(report);
    }

    pub fn messages(&self) -> impl Iterator<Item = (&Path, &CheckMessage)> {
        self.reports.iter().flat_map(|report| {
            report
                .messages
                .iter()
                .map(move |message| (report.path.as_path(), message))
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.reports.iter().flat_map(|report| {
            report
                .errors
                .iter()
                .map(move |error| (report.path.as_path(), error.as_str()))
        })
    }

    pub fn success(&self) -> bool {
        self.files_failed == 0
    }
}

/// Runs visitors over C++ files
pub struct CxxScanner {
    parser: CxxParser,
    source_extensions: Vec<String>,
}

impl CxxScanner {
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            parser: CxxParser::new()?,
            source_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        })
    }

    /// Set the file extensions picked up from directories
    pub fn source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    /// Expand directories into their C++ files; explicit files are kept as given
    pub fn collect_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                self.collect_directory(path, &mut files)?;
            } else if path.exists() {
                files.push(path.to_path_buf());
            } else {
                return Err(anyhow!("Path does not exist: {}", path.display()));
            }
        }
        Ok(files)
    }

    fn collect_directory(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.collect_directory(&path, files)?;
            } else if self.should_process_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Check if a file should be processed based on its extension
    fn should_process_file(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            self.source_extensions
                .iter()
                .any(|ext| ext.to_lowercase() == ext_str)
        } else {
            false
        }
    }

    /// Parse one file and run every visitor over it
    pub fn scan_file(&mut self, path: &Path, visitors: &mut [&mut dyn AstVisitor]) -> FileReport {
        let mut report = FileReport::new(path);

        let unit = match self.parser.parse_file(path) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(file = %path.display(), "skipping file: {e}");
                report.errors.push(e.to_string());
                return report;
            }
        };
        report.has_parse_errors = unit.has_errors;
        if unit.has_errors {
            tracing::debug!(file = %path.display(), "syntax errors, positions may be unreliable");
        }

        let mut ctx = FileContext::new(path);
        for visitor in visitors.iter_mut() {
            if let Err(e) = walk(&unit, &mut **visitor, &mut ctx) {
                report.errors.push(format!("{}: {e}", visitor.name()));
            }
        }
        report.messages = ctx.into_messages();
        report
    }

    /// Scan files in order
    pub fn scan_files<P: AsRef<Path>>(
        &mut self,
        files: &[P],
        visitors: &mut [&mut dyn AstVisitor],
    ) -> ScanSummary {
        let mut summary = ScanSummary::new();
        for file in files {
            summary.push(self.scan_file(file.as_ref(), visitors));
        }
        summary
    }

    /// Scan every C++ file below a directory
    pub fn scan_directory(
        &mut self,
        dir: impl AsRef<Path>,
        visitors: &mut [&mut dyn AstVisitor],
    ) -> Result<ScanSummary> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(anyhow!("Source directory does not exist: {}", dir.display()));
        }
        let files = self.collect_files(&[dir])?;
        Ok(self.scan_files(&files, visitors))
    }
}
