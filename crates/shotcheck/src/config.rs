//! Run configuration for the record / verify workflow.

use crate::diff::DEFAULT_HIGHLIGHT;
use crate::result::{ShotcheckError, ShotcheckResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which workflow a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rebuild and persist the baseline
    Record,
    /// Rebuild candidates and compare them against the baseline
    Verify,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => f.write_str("record"),
            Self::Verify => f.write_str("verify"),
        }
    }
}

/// Configuration for a [`Recorder`](crate::Recorder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Directory holding `metadata.json` and the tiles
    pub source_dir: PathBuf,
    /// Baseline directory, written by record and read by verify
    pub output_dir: PathBuf,
    /// Where verify writes diff / expected / actual images
    #[serde(default)]
    pub failure_dir: Option<PathBuf>,
    /// Maximum RMS score still considered the same
    #[serde(default)]
    pub tolerance: f64,
    /// Outline color of diff images
    #[serde(default = "default_highlight")]
    pub highlight: [u8; 4],
}

const fn default_highlight() -> [u8; 4] {
    DEFAULT_HIGHLIGHT
}

impl RecorderConfig {
    /// Create a pixel-exact configuration with no failure directory
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            failure_dir: None,
            tolerance: 0.0,
            highlight: DEFAULT_HIGHLIGHT,
        }
    }

    /// Collect failure artifacts in `dir` and aggregate mismatches
    #[must_use]
    pub fn with_failure_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failure_dir = Some(dir.into());
        self
    }

    /// Set the RMS tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the diff outline color
    #[must_use]
    pub const fn with_highlight(mut self, highlight: [u8; 4]) -> Self {
        self.highlight = highlight;
        self
    }

    /// Reject configurations that cannot run
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a negative or non-finite tolerance.
    pub fn validate(&self) -> ShotcheckResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ShotcheckError::invalid_config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
