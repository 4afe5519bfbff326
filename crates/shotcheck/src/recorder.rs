//! Record / verify workflow.
//!
//! ## Record
//!
//! Clears the baseline directory, then reconstructs every manifest record
//! into `<output>/<name>.png`. Any reconstruction error aborts the run; files
//! already written stay in place.
//!
//! ## Verify
//!
//! Reconstructs every record into a fresh scratch directory, then compares
//! each candidate against its baseline in manifest order:
//!
//! - with a failure directory, the directory is emptied first, then
//!   mismatches are collected and their artifacts written as `<name>_diff.png`, `<name>_expected.png` and
//!   `<name>_actual.png`; one error listing all of them is raised at the end;
//! - without one, the first mismatch raises immediately.
//!
//! The scratch directory is deleted on success and kept whenever a mismatch
//! is reported so the candidates can be inspected.

use crate::config::{Mode, RecorderConfig};
use crate::diff::DiffWriter;
use crate::metadata::{Manifest, ScreenshotRecord};
use crate::result::{Mismatch, MismatchReport, ShotcheckError, ShotcheckResult};
use crate::similarity::SimilarityScorer;
use crate::tiles::TileReconstructor;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of verify scratch directories
const SCRATCH_PREFIX: &str = "screenshots";

/// Outcome of verifying one screenshot
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationResult {
    /// Candidate is the same as the baseline within tolerance
    Match {
        /// Screenshot name
        name: String,
    },
    /// Candidate differs from the baseline
    Mismatch(Mismatch),
}

impl VerificationResult {
    /// Screenshot name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Match { name } => name,
            Self::Mismatch(mismatch) => &mismatch.name,
        }
    }

    /// Whether the screenshot matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Summary of a successful verify run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerificationSummary {
    /// Number of screenshots compared
    pub compared: usize,
    /// Per-screenshot results in manifest order
    pub results: Vec<VerificationResult>,
}

/// Summary of a record run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSummary {
    /// Baseline images written, in manifest order
    pub written: Vec<PathBuf>,
}

/// Result of [`Recorder::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Baseline recorded
    Recorded(RecordSummary),
    /// Every screenshot matched its baseline
    Verified(VerificationSummary),
}

/// Drives record and verify runs over one source directory
#[derive(Debug, Clone)]
pub struct Recorder {
    config: RecorderConfig,
    reconstructor: TileReconstructor,
    scorer: SimilarityScorer,
    writer: DiffWriter,
}

impl Recorder {
    /// Create a recorder
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad tolerance and `SourceNotFound` if
    /// the source directory does not exist.
    pub fn new(config: RecorderConfig) -> ShotcheckResult<Self> {
        config.validate()?;
        if !config.source_dir.is_dir() {
            return Err(ShotcheckError::SourceNotFound {
                path: config.source_dir,
            });
        }

        Ok(Self {
            reconstructor: TileReconstructor::new(&config.source_dir),
            scorer: SimilarityScorer::new(config.tolerance),
            writer: DiffWriter::new(config.highlight),
            config,
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Run the given mode
    ///
    /// # Errors
    ///
    /// See [`Recorder::record`] and [`Recorder::verify`].
    pub fn run(&self, mode: Mode) -> ShotcheckResult<Outcome> {
        tracing::info!(
            %mode,
            source = %self.config.source_dir.display(),
            output = %self.config.output_dir.display(),
            "starting screenshot run"
        );
        match mode {
            Mode::Record => self.record().map(Outcome::Recorded),
            Mode::Verify => self.verify().map(Outcome::Verified),
        }
    }

    /// Rebuild the baseline directory from the source tiles
    ///
    /// # Errors
    ///
    /// Returns `MetadataUnreadable` / `InvalidMetadata` for a bad manifest,
    /// `MissingTile` or `Image` if a screenshot cannot be reconstructed.
    pub fn record(&self) -> ShotcheckResult<RecordSummary> {
        let manifest = Manifest::load(&self.config.source_dir)?;
        warn_if_empty(&manifest);

        let output = &self.config.output_dir;
        if output.exists() {
            fs::remove_dir_all(output)?;
        }
        fs::create_dir_all(output)?;

        let written = self.reconstruct_all(&manifest, output)?;
        tracing::info!(
            screenshots = written.len(),
            output = %output.display(),
            "recorded baseline"
        );
        Ok(RecordSummary { written })
    }

    /// Compare freshly reconstructed screenshots against the baseline
    ///
    /// # Errors
    ///
    /// Returns `VerificationMismatch` when screenshots differ. Manifest,
    /// tile and missing-baseline problems are reported as their own kinds.
    pub fn verify(&self) -> ShotcheckResult<VerificationSummary> {
        let manifest = Manifest::load(&self.config.source_dir)?;
        warn_if_empty(&manifest);

        let scratch = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        tracing::debug!(scratch = %scratch.path().display(), "reconstructing candidates");
        self.reconstruct_all(&manifest, scratch.path())?;

        self.check_baselines(&manifest)?;

        if let Some(failure_dir) = &self.config.failure_dir {
            if failure_dir.exists() {
                fs::remove_dir_all(failure_dir)?;
            }
            fs::create_dir_all(failure_dir)?;
        }

        let mut results = Vec::with_capacity(manifest.len());
        let mut mismatches = Vec::new();
        for record in &manifest {
            let result = self.verify_one(record, scratch.path())?;
            if let VerificationResult::Mismatch(mismatch) = &result {
                if self.config.failure_dir.is_none() {
                    let report = MismatchReport {
                        mismatches: vec![mismatch.clone()],
                        failure_dir: None,
                    };
                    keep_scratch(scratch);
                    return Err(ShotcheckError::VerificationMismatch(report));
                }
                mismatches.push(mismatch.clone());
            }
            results.push(result);
        }

        if !mismatches.is_empty() {
            let report = MismatchReport {
                mismatches,
                failure_dir: self.config.failure_dir.clone(),
            };
            keep_scratch(scratch);
            return Err(ShotcheckError::VerificationMismatch(report));
        }

        scratch.close()?;
        tracing::info!(screenshots = results.len(), "all screenshots match baseline");
        Ok(VerificationSummary {
            compared: results.len(),
            results,
        })
    }

    fn reconstruct_all(&self, manifest: &Manifest, dir: &Path) -> ShotcheckResult<Vec<PathBuf>> {
        manifest
            .iter()
            .map(|record| self.reconstructor.reconstruct_to(record, dir))
            .collect()
    }

    fn check_baselines(&self, manifest: &Manifest) -> ShotcheckResult<()> {
        let names: Vec<String> = manifest
            .iter()
            .filter(|record| !self.expected_path(record).is_file())
            .map(|record| record.name.clone())
            .collect();
        if names.is_empty() {
            Ok(())
        } else {
            Err(ShotcheckError::MissingBaseline { names })
        }
    }

    fn expected_path(&self, record: &ScreenshotRecord) -> PathBuf {
        self.config.output_dir.join(record.image_file_name())
    }

    fn verify_one(
        &self,
        record: &ScreenshotRecord,
        scratch: &Path,
    ) -> ShotcheckResult<VerificationResult> {
        let expected_path = self.expected_path(record);
        let actual_path = scratch.join(record.image_file_name());
        let expected = load_image(&expected_path)?;
        let actual = load_image(&actual_path)?;

        let comparison = self.scorer.compare(&expected, &actual);
        tracing::debug!(
            screenshot = %record.name,
            rms = ?comparison.rms,
            same = comparison.same,
            "compared screenshot"
        );
        if comparison.same {
            return Ok(VerificationResult::Match {
                name: record.name.clone(),
            });
        }

        let diff = match &self.config.failure_dir {
            Some(failure_dir) => {
                let diff_path = failure_dir.join(format!("{}_diff.png", record.name));
                self.writer.write(&actual, &comparison.diff, &diff_path)?;
                fs::copy(
                    &actual_path,
                    failure_dir.join(format!("{}_actual.png", record.name)),
                )?;
                fs::copy(
                    &expected_path,
                    failure_dir.join(format!("{}_expected.png", record.name)),
                )?;
                Some(diff_path)
            }
            None => None,
        };

        tracing::warn!(
            screenshot = %record.name,
            rms = ?comparison.rms,
            tolerance = self.scorer.tolerance(),
            "screenshot differs from baseline"
        );
        Ok(VerificationResult::Mismatch(Mismatch {
            name: record.name.clone(),
            expected: expected_path,
            actual: actual_path,
            diff,
            rms: comparison.rms,
        }))
    }
}

fn load_image(path: &Path) -> ShotcheckResult<RgbaImage> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|e| ShotcheckError::image(path, e))
}

fn warn_if_empty(manifest: &Manifest) {
    if manifest.is_empty() {
        tracing::warn!("manifest lists no screenshots");
    }
}

/// Leave the scratch directory behind for inspection
fn keep_scratch(scratch: TempDir) {
    let path = scratch.keep();
    tracing::warn!(scratch = %path.display(), "kept candidate screenshots for inspection");
}
