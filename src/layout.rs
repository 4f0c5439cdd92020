//! Pixel-exact placement of the swatches, separators, and border of a palette bar.
//!
//! The bar is as wide as the image. Its height comes from one of two branches:
//!
//! - With a [`SwatchAspect`], the swatch width is derived from the inner width and
//!   the swatch height from the aspect, and the bar is exactly as tall as one swatch
//!   plus the border. There is no upper limit on the height in this branch.
//! - Otherwise, the height is a fraction of the image height, clamped to
//!   `height_min..=height_max`.
//!
//! All rectangles have exclusive right and bottom edges. Within a [`BarGeometry`],
//! swatches, separators, and the border ring never overlap.

use crate::PaletteSize;
use std::{convert::Infallible, fmt, str::FromStr};

/// The swatch aspect used when an aspect string cannot be parsed.
pub const DEFAULT_SWATCH_ASPECT: f64 = 10.0;

/// The width to height ratio of a single swatch.
///
/// This is a positive, finite `f64`. Construction is lenient: anything that does not
/// give a positive, finite ratio falls back to [`DEFAULT_SWATCH_ASPECT`].
///
/// # Examples
/// ```
/// # use swatchbar::SwatchAspect;
/// assert_eq!(SwatchAspect::parse("4:3").ratio(), 4.0 / 3.0);
/// assert_eq!(SwatchAspect::parse("2.5").ratio(), 2.5);
/// assert_eq!(SwatchAspect::parse("3:0").ratio(), 3.0);
/// assert_eq!(SwatchAspect::parse("wide").ratio(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct SwatchAspect(f64);

impl SwatchAspect {
    /// A square swatch.
    pub const SQUARE: Self = Self(1.0);

    /// Creates a [`SwatchAspect`] if the given ratio is positive and finite.
    #[must_use]
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    /// Parses a number (`"1.5"`) or a `"W:H"` pair (`"4:3"`).
    ///
    /// For `"W:H"` with `H == 0` the result is `W`. Parse failures and
    /// non-positive results give [`DEFAULT_SWATCH_ASPECT`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let ratio = match s.split_once(':') {
            Some((w, h)) => match (w.trim().parse::<f64>(), h.trim().parse::<f64>()) {
                (Ok(w), Ok(h)) if h == 0.0 => Some(w),
                (Ok(w), Ok(h)) => Some(w / h),
                _ => None,
            },
            None => s.trim().parse().ok(),
        };

        ratio.and_then(Self::new).unwrap_or_default()
    }

    /// Gets the inner ratio.
    #[must_use]
    pub const fn ratio(self) -> f64 {
        self.0
    }
}

impl Default for SwatchAspect {
    fn default() -> Self {
        Self(DEFAULT_SWATCH_ASPECT)
    }
}

impl From<f64> for SwatchAspect {
    fn from(ratio: f64) -> Self {
        Self::new(ratio).unwrap_or_default()
    }
}

impl FromStr for SwatchAspect {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for SwatchAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An axis-aligned rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// The leftmost column.
    pub left: u32,
    /// The topmost row.
    pub top: u32,
    /// One past the rightmost column.
    pub right: u32,
    /// One past the bottom row.
    pub bottom: u32,
}

impl Rect {
    /// Creates a new [`Rect`].
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    /// The width of the rectangle, or `0` if it is empty.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// The height of the rectangle, or `0` if it is empty.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether the rectangle contains no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether the two rectangles share at least one pixel.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// The inputs that determine the geometry of a bar (besides the image size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// The number of swatches.
    pub palette_size: PaletteSize,
    /// The width of the gap between swatches.
    pub separator_px: u32,
    /// The thickness of the border ring.
    pub border_px: u32,
    /// The swatch aspect. If `Some`, the bar height is derived from it.
    pub swatch_aspect: Option<SwatchAspect>,
    /// The bar height as a fraction of the image height.
    pub height_ratio: f64,
    /// The lower bound for the ratio-derived bar height.
    pub height_min: u32,
    /// The upper bound for the ratio-derived bar height.
    pub height_max: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            palette_size: PaletteSize::DEFAULT,
            separator_px: 2,
            border_px: 2,
            swatch_aspect: None,
            height_ratio: 0.09,
            height_min: 60,
            height_max: 200,
        }
    }
}

/// The computed geometry of a palette bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarGeometry {
    /// The bar width.
    width: u32,
    /// The bar height.
    height: u32,
    /// The border thickness.
    border_px: u32,
    /// The separator width.
    separator_px: u32,
    /// The nominal swatch width.
    swatch_width: u32,
    /// The region inside the border.
    inner: Rect,
    /// One rectangle per swatch.
    swatches: Vec<Rect>,
    /// One rectangle between each pair of swatches.
    separators: Vec<Rect>,
}

impl BarGeometry {
    /// The width of the bar (the image width).
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the bar.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The thickness of the border ring.
    #[must_use]
    pub const fn border_px(&self) -> u32 {
        self.border_px
    }

    /// The width of the gaps between swatches.
    #[must_use]
    pub const fn separator_px(&self) -> u32 {
        self.separator_px
    }

    /// The nominal width of every swatch but the last.
    #[must_use]
    pub const fn swatch_width(&self) -> u32 {
        self.swatch_width
    }

    /// The region inside the border ring.
    #[must_use]
    pub const fn inner(&self) -> Rect {
        self.inner
    }

    /// The swatch rectangles, left to right.
    #[must_use]
    pub fn swatches(&self) -> &[Rect] {
        &self.swatches
    }

    /// The separator rectangles, left to right. These are empty if the separator width is `0`.
    #[must_use]
    pub fn separators(&self) -> &[Rect] {
        &self.separators
    }

    /// The four sides of the border ring: top, bottom, left, and right.
    ///
    /// Together with [`inner`](Self::inner), these tile the whole bar.
    #[must_use]
    pub fn border_ring(&self) -> [Rect; 4] {
        let Self { width, height, inner, .. } = *self;
        [
            Rect::new(0, 0, width, inner.top),
            Rect::new(0, inner.bottom, width, height),
            Rect::new(0, inner.top, inner.left, inner.bottom),
            Rect::new(inner.right, inner.top, width, inner.bottom),
        ]
    }
}

/// Rounds a non-negative pixel length to the nearest `u32`, saturating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_px(value: f64) -> u32 {
    value.round() as u32
}

/// Computes the geometry of a bar for an image of the given size.
///
/// See the [module documentation](self) for more details.
///
/// # Examples
/// ```
/// # use swatchbar::{layout, LayoutOptions, PaletteSize, SwatchAspect};
/// # fn main() -> Result<(), swatchbar::Error> {
/// let options = LayoutOptions {
///     palette_size: PaletteSize::try_from(5u16)?,
///     swatch_aspect: Some(SwatchAspect::SQUARE),
///     ..LayoutOptions::default()
/// };
/// let geometry = layout(120, 80, &options);
/// assert_eq!(geometry.height(), 25);
/// assert_eq!(geometry.swatches()[4].right, 118);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn layout(image_width: u32, image_height: u32, options: &LayoutOptions) -> BarGeometry {
    let LayoutOptions {
        palette_size,
        separator_px: sep,
        border_px: border,
        swatch_aspect,
        height_ratio,
        height_min,
        height_max,
    } = *options;

    let n = u32::from(palette_size.into_inner());
    let width = image_width;

    let inner_width = width.saturating_sub(border.saturating_mul(2)).max(1);
    let total_separators = (n - 1).saturating_mul(sep);
    let swatch_width = (inner_width.saturating_sub(total_separators) / n).max(1);

    let (height, swatch_height) = match swatch_aspect {
        Some(aspect) => {
            let swatch_height = round_px(f64::from(swatch_width) / aspect.ratio()).max(1);
            let min_height = border.saturating_mul(2).saturating_add(1);
            let height = swatch_height
                .saturating_add(border.saturating_mul(2))
                .max(min_height);
            (height, Some(swatch_height))
        }
        None => {
            let height = round_px(f64::from(image_height) * height_ratio)
                .max(height_min)
                .min(height_max)
                .max(1);
            (height, None)
        }
    };

    let left = border.min(width);
    let top = border.min(height);
    let inner = Rect::new(
        left,
        top,
        width.saturating_sub(border).max(left),
        height.saturating_sub(border).max(top),
    );

    let swatch_bottom = swatch_height.map_or(inner.bottom, |h| top.saturating_add(h).min(inner.bottom));

    let mut swatches = Vec::with_capacity(palette_size.as_usize());
    let mut separators = Vec::with_capacity(palette_size.as_usize() - 1);
    let clamp = |x: u32| x.min(inner.right);
    let mut x = inner.left;
    for i in 0..n {
        let swatch_left = clamp(x);
        if i == n - 1 {
            swatches.push(Rect::new(swatch_left, top, inner.right, swatch_bottom));
        } else {
            let swatch_right = clamp(x.saturating_add(swatch_width));
            let separator_right = clamp(swatch_right.saturating_add(sep));
            swatches.push(Rect::new(swatch_left, top, swatch_right, swatch_bottom));
            separators.push(Rect::new(swatch_right, top, separator_right, swatch_bottom));
            x = x.saturating_add(swatch_width).saturating_add(sep);
        }
    }

    BarGeometry {
        width,
        height,
        border_px: border,
        separator_px: sep,
        swatch_width,
        inner,
        swatches,
        separators,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn options(n: u16) -> LayoutOptions {
        LayoutOptions {
            palette_size: PaletteSize::try_from(n).unwrap(),
            ..LayoutOptions::default()
        }
    }

    fn all_rects(geometry: &BarGeometry) -> Vec<Rect> {
        let mut rects = geometry.border_ring().to_vec();
        rects.extend_from_slice(geometry.swatches());
        rects.extend_from_slice(geometry.separators());
        rects
    }

    fn assert_disjoint(geometry: &BarGeometry) {
        let rects = all_rects(geometry);
        for (i, a) in rects.iter().enumerate() {
            assert!(a.right <= geometry.width() || a.is_empty(), "{a:?} exceeds bar");
            assert!(a.bottom <= geometry.height() || a.is_empty(), "{a:?} exceeds bar");
            for b in &rects[(i + 1)..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    fn area(rects: &[Rect]) -> u64 {
        rects
            .iter()
            .map(|r| u64::from(r.width()) * u64::from(r.height()))
            .sum()
    }

    #[test]
    fn parse_aspect() {
        assert_eq!(SwatchAspect::parse("1:1"), SwatchAspect::SQUARE);
        assert_eq!(SwatchAspect::parse(" 3 : 2 ").ratio(), 1.5);
        assert_eq!(SwatchAspect::parse("0.5").ratio(), 0.5);
        assert_eq!(SwatchAspect::parse("7:0").ratio(), 7.0);
        for bad in ["", "abc", "1:x", "0", "-2", "0:5", "-1:1", "0:0", "inf", "NaN"] {
            assert_eq!(SwatchAspect::parse(bad).ratio(), DEFAULT_SWATCH_ASPECT, "{bad:?}");
        }
        assert_eq!(SwatchAspect::from(-1.0), SwatchAspect::default());
        assert_eq!("4:5".parse::<SwatchAspect>(), Ok(SwatchAspect::parse("4:5")));
    }

    #[test]
    fn ratio_branch_clamps_height() {
        assert_eq!(layout(100, 50, &options(4)).height(), 60);
        assert_eq!(layout(100, 1000, &options(4)).height(), 90);
        assert_eq!(layout(100, 10_000, &options(4)).height(), 200);
    }

    #[test]
    fn ratio_branch_tiles_the_bar() {
        for (w, n, sep, border) in [(100, 4, 2, 2), (640, 16, 2, 2), (333, 7, 0, 5), (50, 3, 3, 0)] {
            let opts = LayoutOptions {
                separator_px: sep,
                border_px: border,
                ..options(n)
            };
            let geometry = layout(w, 480, &opts);
            assert_disjoint(&geometry);
            assert_eq!(geometry.swatches().len(), usize::from(n));
            assert_eq!(geometry.separators().len(), usize::from(n) - 1);

            let widths = geometry.swatches().iter().map(Rect::width).sum::<u32>();
            assert_eq!(widths + (u32::from(n) - 1) * sep + 2 * border, w);

            let total = u64::from(geometry.width()) * u64::from(geometry.height());
            assert_eq!(area(&all_rects(&geometry)), total);
        }
    }

    #[test]
    fn aspect_branch_square_swatches() {
        let opts = LayoutOptions {
            swatch_aspect: Some(SwatchAspect::parse("1:1")),
            ..options(5)
        };
        let geometry = layout(120, 80, &opts);

        assert_eq!(geometry.swatch_width(), 21);
        assert_eq!(geometry.height(), 25);
        assert_eq!(geometry.swatches()[0], Rect::new(2, 2, 23, 23));
        assert_eq!(geometry.separators()[0], Rect::new(23, 2, 25, 23));
        assert_eq!(geometry.swatches()[4].right, 118);
        assert_eq!(geometry.swatches()[4].left, 94);
        assert_disjoint(&geometry);
    }

    #[test]
    fn aspect_branch_has_no_upper_clamp() {
        let opts = LayoutOptions {
            swatch_aspect: Some(SwatchAspect::parse("1:4")),
            ..options(2)
        };
        let geometry = layout(1000, 10, &opts);
        assert!(geometry.height() > opts.height_max);
        assert_disjoint(&geometry);
    }

    #[test]
    fn aspect_branch_minimum_height() {
        let opts = LayoutOptions {
            swatch_aspect: Some(SwatchAspect::from(1000.0)),
            border_px: 0,
            ..options(3)
        };
        let geometry = layout(30, 30, &opts);
        assert_eq!(geometry.height(), 1);
        assert!(geometry.swatches().iter().all(|r| r.height() == 1));
    }

    #[test]
    fn zero_separator_gives_empty_separators() {
        let opts = LayoutOptions { separator_px: 0, ..options(6) };
        let geometry = layout(200, 100, &opts);
        assert_eq!(geometry.separators().len(), 5);
        assert!(geometry.separators().iter().all(Rect::is_empty));
        for pair in geometry.swatches().windows(2) {
            assert_eq!(pair[0].right, pair[1].left);
        }
    }

    #[test]
    fn tiny_images_stay_in_bounds() {
        for (w, n, border) in [(1, 8, 2), (3, 32, 1), (10, 256, 0), (4, 2, 10)] {
            for aspect in [None, Some(SwatchAspect::SQUARE)] {
                let opts = LayoutOptions {
                    border_px: border,
                    swatch_aspect: aspect,
                    ..options(n)
                };
                let geometry = layout(w, 5, &opts);
                assert_eq!(geometry.swatches().len(), usize::from(n));
                assert_disjoint(&geometry);
            }
        }
    }
}
