//! Error types for the CLI

use std::process::ExitCode;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Shotcheck library error
    #[error("{0}")]
    Shotcheck(#[from] shotcheck::ShotcheckError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether this is a visual regression rather than a broken run
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Shotcheck(e) if e.is_mismatch())
    }

    /// Numeric exit status: 1 for mismatches, 2 for everything else
    #[must_use]
    pub const fn code(&self) -> u8 {
        if self.is_mismatch() {
            1
        } else {
            2
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
