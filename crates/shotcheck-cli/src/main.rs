//! Shotcheck CLI: record and verify tiled screenshot baselines
//!
//! ## Usage
//!
//! ```bash
//! shotcheck record --source build/tiles --output screenshots
//! shotcheck verify --source build/tiles --output screenshots \
//!     --failure-dir build/failures --tolerance 0.5
//! ```
//!
//! Exit status is 0 on success, 1 when screenshots differ from the baseline
//! and 2 for any other error.

use clap::Parser;
use shotcheck_cli::{build_config, logging, run, Cli, Reporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);

    if let Err(e) = logging::init(config.verbosity) {
        eprintln!("Error: {e}");
        return e.exit_code();
    }

    let reporter = Reporter::new(&config);
    match run(cli.command, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
