//! Shotcheck CLI Library
//!
//! Command-line front end for the Shotcheck record / verify workflow.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, RecordArgs, VerifyArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;

use shotcheck::{Recorder, RecorderConfig, ShotcheckError};

/// Build the run configuration from parsed flags
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

/// Execute a parsed command
///
/// # Errors
///
/// Propagates library failures; mismatches are reported before returning.
pub fn run(command: Commands, reporter: &Reporter) -> CliResult<()> {
    match command {
        Commands::Record(args) => run_record(&args, reporter),
        Commands::Verify(args) => run_verify(&args, reporter),
    }
}

fn run_record(args: &RecordArgs, reporter: &Reporter) -> CliResult<()> {
    tracing::debug!(source = %args.source.display(), output = %args.output.display(), "record");
    let recorder = Recorder::new(RecorderConfig::new(&args.source, &args.output))?;
    let summary = recorder.record()?;
    reporter.recorded(&summary);
    Ok(())
}

fn run_verify(args: &VerifyArgs, reporter: &Reporter) -> CliResult<()> {
    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        return Err(CliError::invalid_argument(format!(
            "--tolerance must be a non-negative number, got {}",
            args.tolerance
        )));
    }

    let mut config = RecorderConfig::new(&args.source, &args.output).with_tolerance(args.tolerance);
    if let Some(dir) = &args.failure_dir {
        config = config.with_failure_dir(dir);
    }

    tracing::debug!(
        source = %args.source.display(),
        output = %args.output.display(),
        tolerance = args.tolerance,
        "verify"
    );
    match Recorder::new(config)?.verify() {
        Ok(summary) => {
            reporter.verified(&summary);
            Ok(())
        }
        Err(ShotcheckError::VerificationMismatch(report)) => {
            reporter.mismatches(&report.mismatches);
            Err(ShotcheckError::VerificationMismatch(report).into())
        }
        Err(e) => Err(e.into()),
    }
}
