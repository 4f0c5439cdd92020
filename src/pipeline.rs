//! The high-level API: from an image and a set of options to a composited palette bar.

use crate::{
    compose, image_colors, layout, normalize, render, BarColors, BarGeometry, ColorSample,
    LayoutOptions, Palette, PaletteSize, QuantizeMethod, Quantizer, Result, SwatchAspect,
};
use image::RgbImage;
use palette::Srgb;
use tracing::{debug, instrument};

/// A builder struct holding every option of a palette bar.
///
/// # Examples
/// ```
/// # use swatchbar::{BarOptions, PaletteSize, QuantizeMethod, SwatchAspect};
/// # fn main() -> Result<(), swatchbar::Error> {
/// let options = BarOptions::new()
///     .palette_size(PaletteSize::try_from(8u16)?)
///     .swatch_aspect(Some(SwatchAspect::parse("4:3")))
///     .quantize_method(QuantizeMethod::Octree)
///     .sort_by_luma(false);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarOptions {
    /// The number of swatches.
    pub(crate) palette_size: PaletteSize,
    /// The bar height as a fraction of the image height.
    pub(crate) height_ratio: f64,
    /// The lower bound for the ratio-derived bar height.
    pub(crate) height_min: u32,
    /// The upper bound for the ratio-derived bar height.
    pub(crate) height_max: u32,
    /// The width of the gap between swatches.
    pub(crate) separator_px: u32,
    /// The thickness of the border ring.
    pub(crate) border_px: u32,
    /// The non-palette colors.
    pub(crate) colors: BarColors,
    /// Whether to sort swatches by luminance.
    pub(crate) sort_by_luma: bool,
    /// The swatch aspect, overriding the height ratio if set.
    pub(crate) swatch_aspect: Option<SwatchAspect>,
    /// The quantizer.
    pub(crate) quantize_method: QuantizeMethod,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BarOptions {
    /// Creates a new [`BarOptions`] with default values.
    #[must_use]
    pub fn new() -> Self {
        let LayoutOptions {
            palette_size,
            separator_px,
            border_px,
            swatch_aspect,
            height_ratio,
            height_min,
            height_max,
        } = LayoutOptions::default();

        Self {
            palette_size,
            height_ratio,
            height_min,
            height_max,
            separator_px,
            border_px,
            colors: BarColors::default(),
            sort_by_luma: true,
            swatch_aspect,
            quantize_method: QuantizeMethod::default(),
        }
    }

    /// Sets the number of swatches. The default is `16`.
    #[must_use]
    pub fn palette_size(mut self, size: PaletteSize) -> Self {
        self.palette_size = size;
        self
    }

    /// Sets the bar height as a fraction of the image height. The default is `0.09`.
    ///
    /// This is ignored if a swatch aspect is set.
    #[must_use]
    pub fn height_ratio(mut self, ratio: f64) -> Self {
        self.height_ratio = ratio;
        self
    }

    /// Sets the minimum bar height in the ratio branch. The default is `60`.
    #[must_use]
    pub fn height_min(mut self, height: u32) -> Self {
        self.height_min = height;
        self
    }

    /// Sets the maximum bar height in the ratio branch. The default is `200`.
    #[must_use]
    pub fn height_max(mut self, height: u32) -> Self {
        self.height_max = height;
        self
    }

    /// Sets the width of the gaps between swatches. The default is `2`.
    #[must_use]
    pub fn separator_px(mut self, px: u32) -> Self {
        self.separator_px = px;
        self
    }

    /// Sets the thickness of the border ring. The default is `2`.
    #[must_use]
    pub fn border_px(mut self, px: u32) -> Self {
        self.border_px = px;
        self
    }

    /// Sets the background color. The default is `(30, 30, 30)`.
    #[must_use]
    pub fn background(mut self, color: Srgb<u8>) -> Self {
        self.colors.background = color;
        self
    }

    /// Sets the separator color. The default is `(220, 220, 220)`.
    #[must_use]
    pub fn separator_color(mut self, color: Srgb<u8>) -> Self {
        self.colors.separator = color;
        self
    }

    /// Sets the border color. The default is `(190, 190, 190)`.
    #[must_use]
    pub fn border_color(mut self, color: Srgb<u8>) -> Self {
        self.colors.border = color;
        self
    }

    /// Sets whether the swatches are sorted from dark to light. The default is `true`.
    #[must_use]
    pub fn sort_by_luma(mut self, sort: bool) -> Self {
        self.sort_by_luma = sort;
        self
    }

    /// Sets the swatch aspect. The default is `None`.
    ///
    /// If set, the bar height is derived from the swatch width and this aspect
    /// instead of the height ratio.
    #[must_use]
    pub fn swatch_aspect(mut self, aspect: Option<SwatchAspect>) -> Self {
        self.swatch_aspect = aspect;
        self
    }

    /// Sets the quantization method. The default is [`QuantizeMethod::MedianCut`].
    #[must_use]
    pub fn quantize_method(mut self, method: QuantizeMethod) -> Self {
        self.quantize_method = method;
        self
    }

    /// The non-palette colors of the bar.
    #[must_use]
    pub fn colors(&self) -> BarColors {
        self.colors
    }

    /// The options that determine the bar geometry.
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            palette_size: self.palette_size,
            separator_px: self.separator_px,
            border_px: self.border_px,
            swatch_aspect: self.swatch_aspect,
            height_ratio: self.height_ratio,
            height_min: self.height_min,
            height_max: self.height_max,
        }
    }
}

/// The result of [`build_palette_bar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteBar {
    /// The source image with the bar beneath it.
    pub composite: RgbImage,
    /// The bar alone.
    pub bar: RgbImage,
    /// The palette shown in the bar, left to right.
    pub palette: Palette,
    /// The geometry of the bar.
    pub geometry: BarGeometry,
}

/// Builds the bar from the quantizer output.
fn finish(image: &RgbImage, samples: Vec<ColorSample>, options: &BarOptions) -> Result<PaletteBar> {
    debug!(samples = samples.len(), "quantized");

    let palette = normalize(samples, options.palette_size, options.sort_by_luma)?;

    let geometry = layout(image.width(), image.height(), &options.layout_options());
    debug!(
        bar_height = geometry.height(),
        swatch_width = geometry.swatch_width(),
        "computed bar layout"
    );

    let bar = render(&geometry, &palette, &options.colors);
    let composite = compose(image, &bar)?;

    Ok(PaletteBar { composite, bar, palette, geometry })
}

/// Extracts a palette from `image` and composites a swatch bar beneath it.
///
/// # Errors
/// Returns [`Error::NoColors`](crate::Error::NoColors) if the image is empty,
/// or [`Error::ImageTooLarge`](crate::Error::ImageTooLarge) if the image or the composite
/// is too large.
///
/// # Examples
/// ```
/// # use swatchbar::{build_palette_bar, BarOptions, PaletteSize};
/// # use image::{Rgb, RgbImage};
/// # fn main() -> Result<(), swatchbar::Error> {
/// let image = RgbImage::from_pixel(100, 50, Rgb([255, 0, 0]));
/// let options = BarOptions::new().palette_size(PaletteSize::try_from(4u16)?);
/// let result = build_palette_bar(&image, &options)?;
/// assert_eq!(result.composite.dimensions(), (100, 110));
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(width = image.width(), height = image.height(), method = %options.quantize_method))]
pub fn build_palette_bar(image: &RgbImage, options: &BarOptions) -> Result<PaletteBar> {
    let samples = options
        .quantize_method
        .quantize(image_colors(image)?, options.palette_size);
    finish(image, samples, options)
}

/// Extracts a palette from `image` in parallel and composites a swatch bar beneath it.
///
/// The result is identical to [`build_palette_bar`].
///
/// # Errors
/// See [`build_palette_bar`].
#[cfg(feature = "threads")]
#[instrument(skip_all, fields(width = image.width(), height = image.height(), method = %options.quantize_method))]
pub fn build_palette_bar_par(image: &RgbImage, options: &BarOptions) -> Result<PaletteBar> {
    let samples = options
        .quantize_method
        .quantize_image_par(image, options.palette_size)?;
    finish(image, samples, options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{luminance, tests::*, Error};
    use image::Rgb;

    fn size(n: u16) -> PaletteSize {
        PaletteSize::try_from(n).unwrap()
    }

    fn methods() -> Vec<QuantizeMethod> {
        #[allow(unused_mut)]
        let mut methods = vec![QuantizeMethod::MedianCut, QuantizeMethod::Octree];
        #[cfg(feature = "kmeans")]
        methods.push(QuantizeMethod::kmeans());
        methods
    }

    #[test]
    fn solid_red_ratio_branch() {
        let image = solid_image(100, 50, Srgb::new(255, 0, 0));
        let result = build_palette_bar(&image, &BarOptions::new().palette_size(size(4))).unwrap();

        assert_eq!(result.bar.dimensions(), (100, 60));
        assert_eq!(result.composite.dimensions(), (100, 110));
        assert_eq!(result.palette.len(), 4);
        assert!(result.palette.colors().all(|c| c == Srgb::new(255, 0, 0)));
        assert_eq!(result.composite.get_pixel(50, 25), &Rgb([255, 0, 0]));
        assert_eq!(result.composite.get_pixel(0, 50), &Rgb([190, 190, 190]));
    }

    #[test]
    fn square_swatches() {
        let image = block_image(&BLOCK_COLORS[..5], 24, 80);
        let options = BarOptions::new()
            .palette_size(size(5))
            .swatch_aspect(Some(SwatchAspect::parse("1:1")));
        let result = build_palette_bar(&image, &options).unwrap();

        assert_eq!(result.geometry.swatch_width(), 21);
        assert_eq!(result.bar.dimensions(), (120, 25));
        assert_eq!(result.composite.dimensions(), (120, 105));
        assert_eq!(result.geometry.swatches()[4].right, 118);
    }

    #[test]
    fn composite_top_is_source_and_bottom_is_bar() {
        let image = block_image(&BLOCK_COLORS, 20, 30);
        let result = build_palette_bar(&image, &BarOptions::new()).unwrap();

        let (width, height) = image.dimensions();
        for (x, y, pixel) in image.enumerate_pixels() {
            assert_eq!(result.composite.get_pixel(x, y), pixel);
        }
        for (x, y, pixel) in result.bar.enumerate_pixels() {
            assert_eq!(result.composite.get_pixel(x, y + height), pixel);
        }
        assert_eq!(result.bar.width(), width);
    }

    #[test]
    fn palette_has_exact_length_for_every_method() {
        let image = block_image(&BLOCK_COLORS, 10, 10);
        for method in methods() {
            for n in [1, 3, 6, 16, 32] {
                let options = BarOptions::new().palette_size(size(n)).quantize_method(method);
                let result = build_palette_bar(&image, &options).unwrap();
                assert_eq!(result.palette.len(), usize::from(n), "{method} with {n} colors");
                assert_eq!(result.geometry.swatches().len(), usize::from(n));
            }
        }
    }

    #[test]
    fn sorted_palette_is_non_decreasing_in_luma() {
        let image = block_image(&BLOCK_COLORS, 10, 10);
        for method in methods() {
            let options = BarOptions::new().palette_size(size(6)).quantize_method(method);
            let result = build_palette_bar(&image, &options).unwrap();
            for pair in result.palette.windows(2) {
                assert!(luminance(pair[0].color) <= luminance(pair[1].color));
            }
        }
    }

    #[test]
    fn bucket_methods_recover_blocks() {
        let image = block_image(&BLOCK_COLORS, 10, 10);
        for method in [QuantizeMethod::MedianCut, QuantizeMethod::Octree] {
            let options = BarOptions::new()
                .palette_size(size(BLOCK_COLORS.len() as u16))
                .quantize_method(method);
            let result = build_palette_bar(&image, &options).unwrap();

            let mut colors = result.palette.colors().collect::<Vec<_>>();
            colors.sort_by_key(|&c| palette::cast::into_array(c));
            let mut expected = BLOCK_COLORS.to_vec();
            expected.sort_by_key(|&c| palette::cast::into_array(c));
            assert_eq!(colors, expected, "{method}");
            assert!(result.palette.iter().all(|s| s.count == 100));
        }
    }

    #[test]
    #[cfg(feature = "kmeans")]
    fn kmeans_single_color() {
        let image = solid_image(30, 30, Srgb::new(40, 80, 120));
        let options = BarOptions::new()
            .palette_size(size(5))
            .quantize_method(QuantizeMethod::kmeans());
        let result = build_palette_bar(&image, &options).unwrap();
        assert_eq!(result.palette.len(), 5);
        assert!(result.palette.colors().all(|c| c == Srgb::new(40, 80, 120)));
    }

    #[test]
    fn empty_image_has_no_colors() {
        let image = RgbImage::new(0, 0);
        assert_eq!(build_palette_bar(&image, &BarOptions::new()), Err(Error::NoColors));
    }

    #[test]
    fn custom_colors_are_used() {
        let image = solid_image(50, 50, Srgb::new(0, 0, 0));
        let options = BarOptions::new()
            .palette_size(size(2))
            .border_color(Srgb::new(1, 2, 3))
            .separator_color(Srgb::new(4, 5, 6));
        let result = build_palette_bar(&image, &options).unwrap();

        assert_eq!(result.bar.get_pixel(0, 0), &Rgb([1, 2, 3]));
        let separator = result.geometry.separators()[0];
        assert_eq!(result.bar.get_pixel(separator.left, separator.top), &Rgb([4, 5, 6]));
    }

    #[test]
    #[cfg(feature = "threads")]
    fn parallel_matches_serial() {
        let image = block_image(&BLOCK_COLORS, 16, 16);
        for method in methods() {
            let options = BarOptions::new().palette_size(size(4)).quantize_method(method);
            assert_eq!(
                build_palette_bar(&image, &options).unwrap(),
                build_palette_bar_par(&image, &options).unwrap()
            );
        }
    }
}
