//! # Cxx Core
//!
//! Static analysis building blocks for C++ translation units:
//! - A tree-sitter based token stream source producing enter/leave/token events
//! - A visitor framework driving those events through rule checks
//! - Copy-paste (CPD) token emission scoped to function bodies
//! - A comment regular expression rule check
//! - A scanner that runs visitors over files and directories
//!
//! The crate produces the normalized token sequence a duplication engine needs; it
//! does not decide what counts as a duplicate.

#![warn(clippy::all)]

pub mod checks;
pub mod cpd;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod visitor;

use std::path::Path;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use checks::CommentRegularExpressionCheck;
pub use cpd::{
    CpdEngine, CpdToken, CpdTokenStore, CpdVisitor, InputFile, InputFileSet,
    NormalizationPolicy, TextRange,
};
pub use parser::{CxxParser, TranslationUnit};
pub use scanner::{CxxScanner, FileReport, ScanSummary};
pub use token::{Token, TokenKind};
pub use visitor::{
    walk, AstEvent, AstVisitor, CheckMessage, Diagnostics, FileContext, RecordingDiagnostics,
    TracingDiagnostics,
};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extensions treated as C++ sources when scanning directories
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "ipp",
];

/// Initialize tracing for cxx components
pub fn init_tracing(debug: bool) {
    let default_directive = if debug { "cxx_core=debug" } else { "cxx_core=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // A second initialization (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Analysis run configuration
///
/// Read once before scanning starts and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Token equivalence switches for copy-paste detection
    pub cpd: NormalizationPolicy,
    /// Regular expression matched against whole comments, inactive when absent
    pub comment_regex: Option<String>,
    /// Message reported for matching comments
    pub comment_message: Option<String>,
    /// Extensions scanned when a directory is given
    pub extensions: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cpd: NormalizationPolicy::default(),
            comment_regex: None,
            comment_message: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CxxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CxxError::Config(e.to_string()))
    }
}

/// Error types for cxx core operations
#[derive(thiserror::Error, Debug)]
pub enum CxxError {
    /// Reading a source or configuration file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The C++ grammar could not be loaded into the parser
    #[error("Language error: {0}")]
    Language(String),

    /// Parser produced no tree
    #[error("Parse error in {}: {message}", path.display())]
    Parse {
        path: std::path::PathBuf,
        message: String,
    },

    /// Rule check expression failed to compile
    #[error("Unable to compile regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Function scopes did not balance within a file
    #[error("Scope error in {}: {source}", path.display())]
    Scope {
        path: std::path::PathBuf,
        #[source]
        source: cpd::ScopeError,
    },
}

/// Result type for cxx core operations
pub type Result<T> = std::result::Result<T, CxxError>;
