//! Rasterizes a [`BarGeometry`] and a [`Palette`] into an image.

use crate::{BarGeometry, Palette, Rect};
use image::{Rgb, RgbImage};
use palette::{cast, Srgb};

/// The non-palette colors of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarColors {
    /// The fill behind everything else.
    pub background: Srgb<u8>,
    /// The color of the gaps between swatches.
    pub separator: Srgb<u8>,
    /// The color of the border ring.
    pub border: Srgb<u8>,
}

impl BarColors {
    /// The default background color.
    pub const DEFAULT_BACKGROUND: Srgb<u8> = Srgb::new(30, 30, 30);
    /// The default separator color.
    pub const DEFAULT_SEPARATOR: Srgb<u8> = Srgb::new(220, 220, 220);
    /// The default border color.
    pub const DEFAULT_BORDER: Srgb<u8> = Srgb::new(190, 190, 190);
}

impl Default for BarColors {
    fn default() -> Self {
        Self {
            background: Self::DEFAULT_BACKGROUND,
            separator: Self::DEFAULT_SEPARATOR,
            border: Self::DEFAULT_BORDER,
        }
    }
}

/// Fills the part of `rect` that lies inside `image`.
fn fill(image: &mut RgbImage, rect: Rect, color: Srgb<u8>) {
    let color = Rgb(cast::into_array(color));
    let right = rect.right.min(image.width());
    let bottom = rect.bottom.min(image.height());
    for y in rect.top..bottom {
        for x in rect.left..right {
            image.put_pixel(x, y, color);
        }
    }
}

/// Draws a bar of `geometry.width() x geometry.height()` pixels.
///
/// The bar is filled with the background color, then the border ring, the swatches
/// (in palette order), and the separators (if the separator width is not zero) are drawn.
#[must_use]
pub fn render(geometry: &BarGeometry, palette: &Palette, colors: &BarColors) -> RgbImage {
    let mut bar = RgbImage::from_pixel(
        geometry.width(),
        geometry.height(),
        Rgb(cast::into_array(colors.background)),
    );

    if geometry.border_px() > 0 {
        for side in geometry.border_ring() {
            fill(&mut bar, side, colors.border);
        }
    }

    for (&swatch, sample) in geometry.swatches().iter().zip(palette.iter()) {
        fill(&mut bar, swatch, sample.color);
    }

    if geometry.separator_px() > 0 {
        for &separator in geometry.separators() {
            fill(&mut bar, separator, colors.separator);
        }
    }

    bar
}
