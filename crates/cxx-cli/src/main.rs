use std::io;

use anyhow::Result;
use cxx_cli::{command, run, CliOptions};
use cxx_core::init_tracing;

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = command().get_matches();
    let options = CliOptions::from_matches(&matches)?;

    // Initialize logging
    init_tracing(options.debug);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = run(&options, &mut out)?;

    if !outcome.summary.success() {
        tracing::warn!(
            failed = outcome.summary.files_failed,
            "some files could not be analyzed"
        );
    }
    Ok(())
}
