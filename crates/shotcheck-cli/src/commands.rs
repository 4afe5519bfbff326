//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shotcheck: record and verify tiled screenshot baselines
#[derive(Parser, Debug)]
#[command(name = "shotcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct every screenshot and store it as the new baseline
    Record(RecordArgs),

    /// Reconstruct every screenshot and compare it against the baseline
    Verify(VerifyArgs),
}

/// Arguments for the record command
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Directory holding metadata.json and the tile images
    #[arg(short, long)]
    pub source: PathBuf,

    /// Baseline directory (replaced on every record)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the verify command
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Directory holding metadata.json and the tile images
    #[arg(short, long)]
    pub source: PathBuf,

    /// Baseline directory produced by `record`
    #[arg(short, long)]
    pub output: PathBuf,

    /// Collect diff/expected/actual images here and report every mismatch
    #[arg(short, long)]
    pub failure_dir: Option<PathBuf>,

    /// Maximum RMS difference still treated as identical
    #[arg(short, long, default_value = "0.0")]
    pub tolerance: f64,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
