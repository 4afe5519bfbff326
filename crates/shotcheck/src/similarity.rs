//! RMS similarity scoring between a baseline and a candidate image.
//!
//! Both images are reduced to RGB and differenced channel by channel. The
//! score is computed from the difference image's combined channel histogram:
//!
//! ```text
//! rms = sqrt( Σ_v count(v) · v² / (width · height) )
//! ```
//!
//! Counts from all three channels are summed while the divisor is the pixel
//! count, not the sample count. Recorded tolerances are calibrated against
//! this exact figure, so it must not be normalised per channel.

use image::{Rgb, RgbImage, RgbaImage};

/// Outcome of scoring two images
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Whether the images are the same within tolerance
    pub same: bool,
    /// RMS score; `None` when the sizes differ
    pub rms: Option<f64>,
    /// Absolute RGB difference over the overlapping region
    pub diff: RgbImage,
}

impl Comparison {
    /// Whether the comparison failed because the sizes differ
    #[must_use]
    pub const fn size_mismatch(&self) -> bool {
        self.rms.is_none()
    }
}

/// Scores image pairs against a fixed tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    tolerance: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::exact()
    }
}

impl SimilarityScorer {
    /// Create a scorer with the given RMS tolerance
    #[must_use]
    pub const fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Pixel-exact scorer
    #[must_use]
    pub const fn exact() -> Self {
        Self::new(0.0)
    }

    /// Configured tolerance
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Compare a baseline against a candidate.
    ///
    /// Images of different sizes never match, whatever the tolerance; the
    /// difference image then covers only their overlap.
    #[must_use]
    pub fn compare(&self, expected: &RgbaImage, actual: &RgbaImage) -> Comparison {
        let diff = difference(expected, actual);
        if expected.dimensions() != actual.dimensions() {
            return Comparison {
                same: false,
                rms: None,
                diff,
            };
        }

        let score = rms(&diff);
        Comparison {
            same: score <= self.tolerance,
            rms: Some(score),
            diff,
        }
    }
}

/// Whether `a` and `b` are the same within `tolerance`
#[must_use]
pub fn is_same(a: &RgbaImage, b: &RgbaImage, tolerance: f64) -> bool {
    SimilarityScorer::new(tolerance).compare(a, b).same
}

/// Absolute per-channel RGB difference; alpha is ignored
#[must_use]
pub fn difference(a: &RgbaImage, b: &RgbaImage) -> RgbImage {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());

    RgbImage::from_fn(width, height, |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        Rgb([
            pa[0].abs_diff(pb[0]),
            pa[1].abs_diff(pb[1]),
            pa[2].abs_diff(pb[2]),
        ])
    })
}

/// Combined 3 x 256 histogram of an RGB image, red then green then blue
#[must_use]
pub fn histogram(image: &RgbImage) -> [u64; 768] {
    let mut bins = [0u64; 768];
    for pixel in image.pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            bins[channel * 256 + usize::from(*value)] += 1;
        }
    }
    bins
}

/// RMS of a difference image, normalised by pixel count
#[must_use]
pub fn rms(diff: &RgbImage) -> f64 {
    let pixels = u64::from(diff.width()) * u64::from(diff.height());
    if pixels == 0 {
        return 0.0;
    }

    let sum_of_squares: u64 = histogram(diff)
        .iter()
        .enumerate()
        .map(|(index, count)| {
            let value = (index % 256) as u64;
            count * value * value
        })
        .sum();

    (sum_of_squares as f64 / pixels as f64).sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    mod rms_tests {
        use super::*;

        #[test]
        fn test_identical_images_score_zero() {
            let img = solid(4, 4, [10, 200, 30, 255]);
            let comparison = SimilarityScorer::exact().compare(&img, &img);
            assert!(comparison.same);
            assert_eq!(comparison.rms, Some(0.0));
        }

        #[test]
        fn test_sums_channels_over_pixel_count() {
            // Every pixel differs by 10 in all three channels:
            // sqrt(3 * N * 100 / N) = sqrt(300)
            let a = solid(5, 3, [100, 100, 100, 255]);
            let b = solid(5, 3, [110, 90, 110, 255]);
            let score = SimilarityScorer::exact().compare(&a, &b).rms.unwrap();
            assert!((score - 300f64.sqrt()).abs() < 1e-9);
        }

        #[test]
        fn test_single_channel_single_pixel() {
            let a = solid(2, 2, [0, 0, 0, 255]);
            let mut b = a.clone();
            b.put_pixel(1, 1, Rgba([0, 0, 20, 255]));
            // 20² / 4 pixels
            let score = rms(&difference(&a, &b));
            assert!((score - 10.0).abs() < 1e-9);
        }

        #[test]
        fn test_alpha_ignored() {
            let a = solid(3, 3, [50, 60, 70, 255]);
            let b = solid(3, 3, [50, 60, 70, 0]);
            assert!(is_same(&a, &b, 0.0));
        }

        #[test]
        fn test_blue_channel_counts() {
            let a = solid(1, 1, [0, 0, 0, 255]);
            let b = solid(1, 1, [0, 0, 255, 255]);
            assert!(!is_same(&a, &b, 254.0));
            assert!(is_same(&a, &b, 255.0));
        }

        #[test]
        fn test_empty_image_scores_zero() {
            assert_eq!(rms(&RgbImage::new(0, 0)), 0.0);
        }

        #[test]
        fn test_histogram_layout() {
            let image = RgbImage::from_pixel(2, 1, Rgb([1, 2, 3]));
            let bins = histogram(&image);
            assert_eq!(bins[1], 2);
            assert_eq!(bins[256 + 2], 2);
            assert_eq!(bins[512 + 3], 2);
            assert_eq!(bins.iter().sum::<u64>(), 6);
        }
    }

    mod tolerance_tests {
        use super::*;

        #[test]
        fn test_within_tolerance() {
            let a = solid(4, 4, [100, 100, 100, 255]);
            let b = solid(4, 4, [101, 100, 100, 255]);
            // rms = 1.0
            assert!(!is_same(&a, &b, 0.0));
            assert!(!is_same(&a, &b, 0.99));
            assert!(is_same(&a, &b, 1.0));
            assert!(is_same(&a, &b, 2.5));
        }

        #[test]
        fn test_scorer_tolerance_accessor() {
            assert_eq!(SimilarityScorer::new(0.5).tolerance(), 0.5);
            assert_eq!(SimilarityScorer::default().tolerance(), 0.0);
        }
    }

    mod size_tests {
        use super::*;

        #[test]
        fn test_size_mismatch_never_same() {
            let a = solid(4, 4, [0, 0, 0, 255]);
            let b = solid(4, 5, [0, 0, 0, 255]);
            let comparison = SimilarityScorer::new(f64::MAX).compare(&a, &b);
            assert!(!comparison.same);
            assert!(comparison.size_mismatch());
        }

        #[test]
        fn test_size_mismatch_diff_covers_overlap() {
            let a = solid(4, 6, [0, 0, 0, 255]);
            let b = solid(5, 3, [9, 9, 9, 255]);
            let comparison = SimilarityScorer::exact().compare(&a, &b);
            assert_eq!(comparison.diff.dimensions(), (4, 3));
            assert_eq!(*comparison.diff.get_pixel(0, 0), Rgb([9, 9, 9]));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn image_strategy() -> impl Strategy<Value = RgbaImage> {
            (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
                proptest::collection::vec(any::<u8>(), (w * h * 4) as usize)
                    .prop_map(move |raw| RgbaImage::from_raw(w, h, raw).unwrap())
            })
        }

        /// Two images of the same random size
        fn pair_strategy() -> impl Strategy<Value = (RgbaImage, RgbaImage)> {
            (1u32..6, 1u32..6).prop_flat_map(|(w, h)| {
                let len = (w * h * 4) as usize;
                (
                    proptest::collection::vec(any::<u8>(), len),
                    proptest::collection::vec(any::<u8>(), len),
                )
                    .prop_map(move |(ra, rb)| {
                        (
                            RgbaImage::from_raw(w, h, ra).unwrap(),
                            RgbaImage::from_raw(w, h, rb).unwrap(),
                        )
                    })
            })
        }

        proptest! {
            #[test]
            fn prop_reflexive(img in image_strategy()) {
                prop_assert!(is_same(&img, &img, 0.0));
            }

            #[test]
            fn prop_size_strict(
                w in 1u32..10,
                h in 1u32..10,
                extra in 1u32..4,
                tolerance in 0.0f64..1e9
            ) {
                let a = RgbaImage::new(w, h);
                let b = RgbaImage::new(w + extra, h);
                prop_assert!(!is_same(&a, &b, tolerance));
                prop_assert!(!is_same(&b, &a, tolerance));
            }

            #[test]
            fn prop_tolerance_monotonic(
                (a, b) in pair_strategy(),
                t1 in 0.0f64..500.0,
                delta in 0.0f64..500.0
            ) {
                if is_same(&a, &b, t1) {
                    prop_assert!(is_same(&a, &b, t1 + delta));
                }
            }

            #[test]
            fn prop_symmetric(
                (a, b) in pair_strategy()
            ) {
                let forward = rms(&difference(&a, &b));
                let backward = rms(&difference(&b, &a));
                prop_assert_eq!(forward, backward);
            }
        }
    }
}
