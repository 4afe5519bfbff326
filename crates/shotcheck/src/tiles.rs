//! Tile reconstruction.
//!
//! Devices cap the size of a single screenshot, so tall or wide views are
//! captured as a grid of tiles. This module stitches the grid back into one
//! canvas. Tiles are pasted row-major with a stride fixed by tile `(0, 0)`;
//! irregular grids are not supported.

use crate::metadata::{tile_file_name, ScreenshotRecord};
use crate::result::{ShotcheckError, ShotcheckResult};
use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

/// Stitches tiled captures found in one source directory
#[derive(Debug, Clone)]
pub struct TileReconstructor {
    source_dir: PathBuf,
}

impl TileReconstructor {
    /// Create a reconstructor reading tiles from `source_dir`
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Directory tiles are read from
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Reconstruct the full image of one manifest record
    ///
    /// # Errors
    ///
    /// Returns `MissingTile` if any tile of the grid is absent, `Image` if a
    /// tile cannot be decoded.
    pub fn reconstruct(&self, record: &ScreenshotRecord) -> ShotcheckResult<RgbaImage> {
        reconstruct(
            &self.source_dir,
            &record.name,
            record.tile_width,
            record.tile_height,
        )
    }

    /// Reconstruct a record and write it as `<dir>/<name>.png`
    ///
    /// # Errors
    ///
    /// Propagates reconstruction errors and PNG encoding failures.
    pub fn reconstruct_to(&self, record: &ScreenshotRecord, dir: &Path) -> ShotcheckResult<PathBuf> {
        let image = self.reconstruct(record)?;
        let path = dir.join(record.image_file_name());
        image
            .save(&path)
            .map_err(|e| ShotcheckError::image(&path, e))?;
        Ok(path)
    }
}

/// Reconstruct screenshot `name` from a `tile_width` x `tile_height` grid.
///
/// The canvas is as wide as the tiles of row 0 and as tall as the tiles of
/// column 0. Tile `(i, j)` lands at `(i * w0, j * h0)` where `(w0, h0)` is
/// the size of tile `(0, 0)`.
///
/// # Errors
///
/// Returns `MissingTile` if any tile is absent, `Image` on decode failures.
pub fn reconstruct(
    source_dir: &Path,
    name: &str,
    tile_width: u32,
    tile_height: u32,
) -> ShotcheckResult<RgbaImage> {
    let (unit_width, unit_height) = tile_size(source_dir, name, 0, 0)?;

    let mut canvas_width = 0;
    for column in 0..tile_width {
        canvas_width += tile_size(source_dir, name, column, 0)?.0;
    }
    let mut canvas_height = 0;
    for row in 0..tile_height {
        canvas_height += tile_size(source_dir, name, 0, row)?.1;
    }

    let mut canvas = RgbaImage::new(canvas_width, canvas_height);
    for column in 0..tile_width {
        for row in 0..tile_height {
            let path = tile_path(source_dir, name, column, row)?;
            let tile = image::open(&path)
                .map_err(|e| ShotcheckError::image(&path, e))?
                .to_rgba8();
            imageops::replace(
                &mut canvas,
                &tile,
                i64::from(column * unit_width),
                i64::from(row * unit_height),
            );
        }
    }

    tracing::debug!(
        screenshot = name,
        tiles = tile_width * tile_height,
        width = canvas_width,
        height = canvas_height,
        "reconstructed screenshot"
    );
    Ok(canvas)
}

/// Path of an existing tile
fn tile_path(source_dir: &Path, name: &str, column: u32, row: u32) -> ShotcheckResult<PathBuf> {
    let path = source_dir.join(tile_file_name(name, column, row));
    if !path.is_file() {
        return Err(ShotcheckError::MissingTile {
            screenshot: name.to_string(),
            column,
            row,
            path,
        });
    }
    Ok(path)
}

/// Pixel size of a tile, read from its header only
fn tile_size(source_dir: &Path, name: &str, column: u32, row: u32) -> ShotcheckResult<(u32, u32)> {
    let path = tile_path(source_dir, name, column, row)?;
    image::image_dimensions(&path).map_err(|e| ShotcheckError::image(&path, e))
}
