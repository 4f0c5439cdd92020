//! Contains the set of supported quantization methods and their options.

use crate::{image_colors, median_cut::MedianCut, octree::Octree, ColorSample, PaletteSize, Quantizer, Result};
use image::RgbImage;
use palette::Srgb;
use std::{convert::Infallible, fmt, str::FromStr};

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use swatchbar::KmeansOptions;
/// let options = KmeansOptions::new()
///     .seed(1)
///     .sample_seed(Some(42));
/// ```
#[cfg(feature = "kmeans")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmeansOptions {
    /// The seed for centroid initialization and reseeding.
    pub(crate) seed: u64,
    /// The seed for drawing the pixel sample, or `None` to seed from the operating system.
    pub(crate) sample_seed: Option<u64>,
}

#[cfg(feature = "kmeans")]
impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "kmeans")]
impl KmeansOptions {
    /// The default seed for centroid initialization.
    pub const DEFAULT_SEED: u64 = 42;

    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            sample_seed: None,
        }
    }

    /// Sets the seed used to pick the initial centroids and to reseed empty clusters.
    ///
    /// The default seed is `42`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the seed used to sample large images.
    ///
    /// By default this is `None`, and a fresh seed is drawn from the operating system
    /// for each run, so results for images above
    /// [`MAX_SAMPLES`](crate::kmeans::MAX_SAMPLES) pixels may differ between runs.
    #[must_use]
    pub const fn sample_seed(mut self, sample_seed: Option<u64>) -> Self {
        self.sample_seed = sample_seed;
        self
    }
}

/// The set of supported color quantization methods.
///
/// If the `kmeans` feature is enabled, then support will be added for that method.
///
/// Methods can be parsed by name (`"MedianCut"`, `"FastOctree"`, or `"KMeans"`).
/// Parsing never fails: an unknown name gives the default method, [`QuantizeMethod::MedianCut`].
/// ```
/// # use swatchbar::QuantizeMethod;
/// assert_eq!(QuantizeMethod::from_name("FastOctree"), QuantizeMethod::Octree);
/// assert_eq!(QuantizeMethod::from_name("Popularity"), QuantizeMethod::MedianCut);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuantizeMethod {
    /// Median cut over a binned histogram.
    ///
    /// See the [`median_cut`](crate::median_cut) module for more details.
    #[default]
    MedianCut,
    /// Octree bucketing.
    ///
    /// See the [`octree`](crate::octree) module for more details.
    Octree,
    /// K-means clustering over a sample of the pixels.
    ///
    /// See the [`kmeans`](crate::kmeans) module for more details.
    #[cfg(feature = "kmeans")]
    Kmeans(KmeansOptions),
}

impl QuantizeMethod {
    /// Creates a new [`QuantizeMethod::Kmeans`] with the default [`KmeansOptions`].
    #[must_use]
    #[cfg(feature = "kmeans")]
    pub const fn kmeans() -> Self {
        Self::Kmeans(KmeansOptions::new())
    }

    /// Returns the method with the given name, or the default method if the name is unknown.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "MedianCut" => Self::MedianCut,
            "FastOctree" => Self::Octree,
            #[cfg(feature = "kmeans")]
            "KMeans" => Self::kmeans(),
            _ => Self::default(),
        }
    }

    /// The name of this method.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MedianCut => "MedianCut",
            Self::Octree => "FastOctree",
            #[cfg(feature = "kmeans")]
            Self::Kmeans(_) => "KMeans",
        }
    }

    /// Quantizes the pixels of the given image.
    ///
    /// # Errors
    /// Returns an error if the image has too many pixels (see [`image_colors`]).
    pub fn quantize_image(&self, image: &RgbImage, palette_size: PaletteSize) -> Result<Vec<ColorSample>> {
        Ok(self.quantize(image_colors(image)?, palette_size))
    }

    /// Quantizes the given colors, running in parallel where the method supports it.
    ///
    /// The result is identical to [`Quantizer::quantize`].
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn quantize_par(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
        match self {
            #[cfg(feature = "kmeans")]
            Self::Kmeans(options) => crate::kmeans::palette_par(colors, palette_size, *options),
            method => method.quantize(colors, palette_size),
        }
    }

    /// Quantizes the pixels of the given image in parallel where the method supports it.
    ///
    /// # Errors
    /// Returns an error if the image has too many pixels (see [`image_colors`]).
    #[cfg(feature = "threads")]
    pub fn quantize_image_par(&self, image: &RgbImage, palette_size: PaletteSize) -> Result<Vec<ColorSample>> {
        Ok(self.quantize_par(image_colors(image)?, palette_size))
    }
}

impl Quantizer for QuantizeMethod {
    fn quantize(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
        match self {
            Self::MedianCut => MedianCut.quantize(colors, palette_size),
            Self::Octree => Octree.quantize(colors, palette_size),
            #[cfg(feature = "kmeans")]
            Self::Kmeans(options) => options.quantize(colors, palette_size),
        }
    }
}

impl FromStr for QuantizeMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for QuantizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "kmeans")]
impl From<KmeansOptions> for QuantizeMethod {
    fn from(options: KmeansOptions) -> Self {
        Self::Kmeans(options)
    }
}
