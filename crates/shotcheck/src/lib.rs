//! Shotcheck: tiled screenshot reconstruction and visual regression checks
//!
//! Screenshot tests on devices capture large views as grids of tiles and
//! describe them in a `metadata.json` manifest. Shotcheck stitches the tiles
//! back together, records the results as a baseline and later verifies fresh
//! captures against that baseline with an RMS tolerance, writing annotated
//! diff images for every regression.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ metadata.json│──►│ TileReconstructor│──►│ SimilarityScorer │
//! │ (Manifest)   │   │ (tiles → canvas) │   │ (RMS ≤ tolerance)│
//! └──────────────┘   └──────────────────┘   └────────┬─────────┘
//!                                                    │ mismatch
//!                    ┌──────────────────┐   ┌────────▼─────────┐
//!                    │ Recorder         │◄──│ DiffWriter       │
//!                    │ (record / verify)│   │ (bbox outline)   │
//!                    └──────────────────┘   └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use shotcheck::{Recorder, RecorderConfig};
//!
//! let config = RecorderConfig::new("build/screenshots", "screenshots")
//!     .with_failure_dir("build/screenshot-failures")
//!     .with_tolerance(0.5);
//! let recorder = Recorder::new(config)?;
//! match recorder.verify() {
//!     Ok(summary) => println!("{} screenshots match", summary.compared),
//!     Err(e) if e.is_mismatch() => eprintln!("regression:\n{e}"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), shotcheck::ShotcheckError>(())
//! ```

#![warn(missing_docs)]

mod config;
mod diff;
mod metadata;
mod recorder;
mod result;
mod similarity;
mod tiles;

pub use config::{Mode, RecorderConfig};
pub use diff::{bounding_box, BoundingBox, DiffWriter, DEFAULT_HIGHLIGHT};
pub use metadata::{tile_file_name, Manifest, ScreenshotRecord, METADATA_FILE_NAME};
pub use recorder::{Outcome, RecordSummary, Recorder, VerificationResult, VerificationSummary};
pub use result::{Mismatch, MismatchReport, ShotcheckError, ShotcheckResult};
pub use similarity::{difference, histogram, is_same, rms, Comparison, SimilarityScorer};
pub use tiles::{reconstruct, TileReconstructor};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        is_same, reconstruct, tile_file_name, DiffWriter, Manifest, Mode, Outcome, Recorder,
        RecorderConfig, ScreenshotRecord, ShotcheckError, ShotcheckResult, SimilarityScorer,
        TileReconstructor, VerificationResult,
    };
}
