//! Command line front end for cxx-core
//!
//! Collects C++ files, runs the copy-paste token visitor and the comment check over
//! them, and prints the findings as text or JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use cxx_core::checks::comment_regex::DEFAULT_MESSAGE;
use cxx_core::cpd::FileTokens;
use cxx_core::visitor::AstVisitor;
use cxx_core::{
    AnalysisConfig, CommentRegularExpressionCheck, CpdTokenStore, CpdVisitor, CxxScanner,
    InputFileSet, ScanSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything needed for one run
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub paths: Vec<PathBuf>,
    pub config: AnalysisConfig,
    pub format: OutputFormat,
    pub debug: bool,
}

/// Results of a run, also the JSON output document
#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub summary: ScanSummary,
    pub cpd: Vec<FileTokens>,
}

pub fn command() -> Command {
    Command::new("cxx-scan")
        .version(cxx_core::VERSION)
        .about("Emit copy-paste detection tokens and comment findings for C++ sources")
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("C++ files or directories to scan")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ignore-literals")
                .long("ignore-literals")
                .help("Treat numbers, strings and characters as equal regardless of value")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-identifiers")
                .long("ignore-identifiers")
                .help("Treat identifiers as equal regardless of spelling")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("comment-regex")
                .long("comment-regex")
                .value_name("PATTERN")
                .help("Report comments matching this regular expression"),
        )
        .arg(
            Arg::new("comment-message")
                .long("comment-message")
                .value_name("TEXT")
                .help("Message reported for matching comments"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

impl CliOptions {
    /// Merge the config file (if any) with command line overrides
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let paths: Vec<PathBuf> = matches
            .get_many::<PathBuf>("paths")
            .ok_or_else(|| anyhow!("No paths given"))?
            .cloned()
            .collect();

        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if matches.get_flag("ignore-literals") {
            config.cpd.ignore_literals = true;
        }
        if matches.get_flag("ignore-identifiers") {
            config.cpd.ignore_identifiers = true;
        }
        if let Some(pattern) = matches.get_one::<String>("comment-regex") {
            config.comment_regex = Some(pattern.clone());
        }
        if let Some(message) = matches.get_one::<String>("comment-message") {
            config.comment_message = Some(message.clone());
        }

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };

        Ok(Self {
            paths,
            config,
            format,
            debug: matches.get_flag("debug"),
        })
    }
}

/// Scan everything and write the report
pub fn run(options: &CliOptions, out: &mut dyn Write) -> Result<ScanOutcome> {
    let config = &options.config;
    let mut scanner = CxxScanner::new()?.source_extensions(config.extensions.clone());
    let files = scanner.collect_files(&options.paths)?;
    tracing::info!(files = files.len(), "scanning");

    let mut check = CommentRegularExpressionCheck::new(
        config.comment_regex.as_deref().unwrap_or_default(),
        config.comment_message.as_deref().unwrap_or(DEFAULT_MESSAGE),
    )?;

    // Unreadable files stay out of the analysis set and surface as scan errors
    let mut input_files = InputFileSet::new();
    for file in &files {
        match cxx_core::InputFile::from_path(file) {
            Ok(input) => input_files.insert(input),
            Err(e) => tracing::debug!(file = %file.display(), "not added to analysis set: {e}"),
        }
    }
    let mut cpd = CpdVisitor::new(config.cpd, input_files, CpdTokenStore::new());

    let summary = {
        let mut visitors: Vec<&mut dyn AstVisitor> = Vec::new();
        visitors.push(&mut cpd);
        if check.is_active() {
            visitors.push(&mut check);
        }
        scanner.scan_files(&files, &mut visitors)
    };

    let outcome = ScanOutcome {
        summary,
        cpd: cpd.into_engine().report(),
    };

    match options.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &outcome)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text(&outcome, out)?,
    }
    Ok(outcome)
}

fn write_text(outcome: &ScanOutcome, out: &mut dyn Write) -> Result<()> {
    for (path, message) in outcome.summary.messages() {
        writeln!(
            out,
            "{}:{}: [{}] {}",
            path.display(),
            message.line,
            message.rule,
            message.message
        )?;
    }
    for (path, error) in outcome.summary.errors() {
        writeln!(out, "{}: error: {error}", path.display())?;
    }
    for file in &outcome.cpd {
        writeln!(out, "{}: {} cpd token(s)", file.path.display(), file.tokens.len())?;
    }

    let tokens: usize = outcome.cpd.iter().map(|file| file.tokens.len()).sum();
    writeln!(
        out,
        "Scanned {} file(s), {} failed, {} cpd token(s), {} issue(s)",
        outcome.summary.files_processed,
        outcome.summary.files_failed,
        tokens,
        outcome.summary.messages().count()
    )?;
    Ok(())
}
