//! Result and error types for Shotcheck.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Shotcheck operations
pub type ShotcheckResult<T> = Result<T, ShotcheckError>;

/// Errors that can occur in Shotcheck
#[derive(Debug, Error)]
pub enum ShotcheckError {
    /// Configured source directory does not exist
    #[error("Source does not exist: {}", path.display())]
    SourceNotFound {
        /// Missing source path
        path: PathBuf,
    },

    /// A tile required by the manifest is absent
    #[error("Missing tile ({column}, {row}) of screenshot {screenshot}: {}", path.display())]
    MissingTile {
        /// Screenshot name
        screenshot: String,
        /// Tile column
        column: u32,
        /// Tile row
        row: u32,
        /// Expected tile path
        path: PathBuf,
    },

    /// `metadata.json` could not be read or parsed
    #[error(
        "Unable to parse metadata file {}: {message}. This commonly happens if the capture process did not finalize its output",
        path.display()
    )]
    MetadataUnreadable {
        /// Manifest path
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// Manifest parsed but a record violates its invariants
    #[error("Invalid metadata: {message}")]
    InvalidMetadata {
        /// Error message
        message: String,
    },

    /// Configuration rejected before running
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Baseline images are missing for some screenshots
    #[error("Missing baseline image(s) for: {}\nDid you forget to record?", names.join(", "))]
    MissingBaseline {
        /// Screenshot names without a baseline
        names: Vec<String>,
    },

    /// One or more screenshots differ from their baseline
    #[error("{0}")]
    VerificationMismatch(MismatchReport),

    /// Image decoding or encoding failed
    #[error("Image processing failed for {}: {source}", path.display())]
    Image {
        /// Image path
        path: PathBuf,
        /// Underlying image error
        #[source]
        source: image::ImageError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShotcheckError {
    /// Create an invalid metadata error
    #[must_use]
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Wrap an image error with the path it concerns
    #[must_use]
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a regression rather than an infrastructure failure
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::VerificationMismatch(_))
    }

    /// The mismatch report, if this is a regression
    #[must_use]
    pub const fn mismatch_report(&self) -> Option<&MismatchReport> {
        match self {
            Self::VerificationMismatch(report) => Some(report),
            _ => None,
        }
    }
}

/// One screenshot that failed the similarity check
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Screenshot name
    pub name: String,
    /// Baseline image
    pub expected: PathBuf,
    /// Freshly reconstructed image
    pub actual: PathBuf,
    /// Annotated diff image, when a failure directory is configured
    pub diff: Option<PathBuf>,
    /// RMS score, `None` when the sizes differed
    pub rms: Option<f64>,
}

/// Ordered list of mismatches from one verify run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MismatchReport {
    /// Mismatches in manifest order
    pub mismatches: Vec<Mismatch>,
    /// Where the failure artifacts were written
    pub failure_dir: Option<PathBuf>,
}

impl MismatchReport {
    /// Number of failing screenshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// Whether no screenshot failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Names of the failing screenshots
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.mismatches.iter().map(|m| m.name.as_str())
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, mismatch) in self.mismatches.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "Image {} is not same as {}",
                mismatch.expected.display(),
                mismatch.actual.display()
            )?;
        }
        if let Some(dir) = &self.failure_dir {
            write!(f, "\n\nView failed screenshots: {}", dir.display())?;
        }
        Ok(())
    }
}
