//! Export-time rescaling of the composite or the bar.

use image::{imageops, RgbImage};
use tracing::debug;

/// How an image is rescaled before it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScale {
    /// Scale both sides by the given percentage (values below `1` count as `1`).
    Percent(u32),
    /// Scale so that the longer side has the given length in pixels (values below `1` count as `1`).
    LongEdge(u32),
}

impl Default for ExportScale {
    fn default() -> Self {
        Self::Percent(100)
    }
}

impl ExportScale {
    /// The scale factor for an image of the given size.
    fn factor(self, width: u32, height: u32) -> f64 {
        match self {
            Self::Percent(percent) => f64::from(percent.max(1)) / 100.0,
            Self::LongEdge(edge) => f64::from(edge.max(1)) / f64::from(width.max(height).max(1)),
        }
    }
}

/// Computes the size of an image of `width x height` pixels after applying `scale`.
///
/// Each side is rounded to the nearest pixel and is at least `1`.
///
/// # Examples
/// ```
/// # use swatchbar::{compute_export_size, ExportScale};
/// assert_eq!(compute_export_size(640, 480, ExportScale::Percent(50)), (320, 240));
/// assert_eq!(compute_export_size(640, 480, ExportScale::LongEdge(320)), (320, 240));
/// ```
#[must_use]
pub fn compute_export_size(width: u32, height: u32, scale: ExportScale) -> (u32, u32) {
    let factor = scale.factor(width, height);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let side = |len: u32| ((f64::from(len) * factor).round() as u32).max(1);

    (side(width), side(height))
}

/// Resizes `image` according to `scale` with a Lanczos3 filter.
///
/// If the size does not change, `image` is returned as is.
#[must_use]
pub fn apply_export_resize(image: RgbImage, scale: ExportScale) -> RgbImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = compute_export_size(width, height, scale);
    if (new_width, new_height) == (width, height) {
        image
    } else {
        debug!(width, height, new_width, new_height, "resizing for export");
        imageops::resize(&image, new_width, new_height, imageops::FilterType::Lanczos3)
    }
}
