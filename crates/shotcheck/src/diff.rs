//! Failure artifacts for mismatching screenshots.
//!
//! The diff artifact is a copy of the candidate image with the bounding box
//! of every differing pixel outlined in a highlight color.

use crate::result::{ShotcheckError, ShotcheckResult};
use crate::similarity::difference;
use image::{Rgba, RgbImage, RgbaImage};
use std::path::Path;

/// Default outline color
pub const DEFAULT_HIGHLIGHT: [u8; 4] = [255, 0, 0, 255];

/// Tightest box around the non-zero pixels of a difference image.
///
/// `right` and `bottom` are exclusive, so an identical 1x1 change at
/// `(x, y)` yields `(x, y, x + 1, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Leftmost differing column
    pub left: u32,
    /// Topmost differing row
    pub top: u32,
    /// One past the rightmost differing column
    pub right: u32,
    /// One past the bottommost differing row
    pub bottom: u32,
}

impl BoundingBox {
    /// Box width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Box height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Bounding box of all non-zero pixels, `None` if the images were identical
#[must_use]
pub fn bounding_box(diff: &RgbImage) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for (x, y, pixel) in diff.enumerate_pixels() {
        if pixel.0 == [0, 0, 0] {
            continue;
        }
        bbox = Some(match bbox {
            None => BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => BoundingBox {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }
    bbox
}

/// Writes annotated diff images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffWriter {
    highlight: Rgba<u8>,
}

impl Default for DiffWriter {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT)
    }
}

impl DiffWriter {
    /// Create a writer outlining differences in `highlight`
    #[must_use]
    pub const fn new(highlight: [u8; 4]) -> Self {
        Self {
            highlight: Rgba(highlight),
        }
    }

    /// Outline color
    #[must_use]
    pub const fn highlight(&self) -> [u8; 4] {
        self.highlight.0
    }

    /// Copy of `actual` with `bbox` outlined.
    ///
    /// The outline runs through `(left, top)` and `(right, bottom)`; edges
    /// falling outside the image are clipped away.
    #[must_use]
    pub fn annotate(&self, actual: &RgbaImage, bbox: Option<BoundingBox>) -> RgbaImage {
        let mut annotated = actual.clone();
        if let Some(bbox) = bbox {
            draw_rectangle_outline(&mut annotated, bbox, self.highlight);
        }
        annotated
    }

    /// Write the annotated candidate for a precomputed difference image
    ///
    /// # Errors
    ///
    /// Returns `Image` if the PNG cannot be written.
    pub fn write(&self, actual: &RgbaImage, diff: &RgbImage, path: &Path) -> ShotcheckResult<()> {
        let bbox = bounding_box(diff);
        if bbox.is_none() {
            tracing::debug!(path = %path.display(), "no differing pixels to outline");
        }
        self.annotate(actual, bbox)
            .save(path)
            .map_err(|e| ShotcheckError::image(path, e))
    }

    /// Difference `expected` and `actual` and write the annotated candidate
    ///
    /// # Errors
    ///
    /// Returns `Image` if the PNG cannot be written.
    pub fn write_diff(
        &self,
        expected: &RgbaImage,
        actual: &RgbaImage,
        path: &Path,
    ) -> ShotcheckResult<()> {
        self.write(actual, &difference(expected, actual), path)
    }
}

/// Draw an unfilled rectangle, skipping edges outside the image
fn draw_rectangle_outline(img: &mut RgbaImage, bbox: BoundingBox, color: Rgba<u8>) {
    let (img_width, img_height) = img.dimensions();
    if img_width == 0 || img_height == 0 {
        return;
    }
    let x_end = bbox.right.min(img_width - 1);
    let y_end = bbox.bottom.min(img_height - 1);

    // Top and bottom edges
    for x in bbox.left..=x_end {
        if bbox.top < img_height {
            img.put_pixel(x, bbox.top, color);
        }
        if bbox.bottom < img_height {
            img.put_pixel(x, bbox.bottom, color);
        }
    }

    // Left and right edges
    for y in bbox.top..=y_end {
        if bbox.left < img_width {
            img.put_pixel(bbox.left, y, color);
        }
        if bbox.right < img_width {
            img.put_pixel(bbox.right, y, color);
        }
    }
}
