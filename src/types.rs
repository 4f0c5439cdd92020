//! Contains various types needed across the crate.

use crate::{Error, Result, MAX_COLORS, MAX_PIXELS};
use image::RgbImage;
use palette::{
    cast::{self, ComponentsAs},
    Srgb,
};
use std::{
    fmt::{self, Display},
    ops::Deref,
};

/// The BT.709 luminance weights for the red, green, and blue channels.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Computes the perceptual luminance of a color using the BT.709 coefficients.
///
/// The result is in the range `0.0..=255.0`.
#[must_use]
pub fn luminance(color: Srgb<u8>) -> f64 {
    cast::into_array(color)
        .into_iter()
        .zip(LUMA_WEIGHTS)
        .map(|(c, w)| w * f64::from(c))
        .sum()
}

/// Returns the pixels of the given image as a slice of colors.
///
/// # Errors
/// Returns [`Error::ImageTooLarge`] if the image has more than [`MAX_PIXELS`] pixels,
/// since pixel counts are stored as `u32`s.
pub fn image_colors(image: &RgbImage) -> Result<&[Srgb<u8>]> {
    let pixels = image.pixels().len();
    if pixels <= MAX_PIXELS as usize {
        let buf = &image.as_raw()[..(pixels * 3)];
        Ok(buf.components_as())
    } else {
        Err(Error::ImageTooLarge {
            width: image.width(),
            height: image.height(),
        })
    }
}

/// This type is used to specify the number of colors in a palette (and swatches in a bar).
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// in the range `1..=MAX_COLORS`.
///
/// # Examples
/// ```
/// # use swatchbar::{PaletteSize, Error};
/// # fn main() -> Result<(), Error> {
/// let size = PaletteSize::try_from(16u16)?;
/// let clamped = PaletteSize::from_clamped(1024);
/// assert_eq!(clamped, PaletteSize::MAX);
/// assert!(PaletteSize::try_from(0u16).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// The smallest palette size, a single color.
    pub const MIN: Self = Self(1);

    /// The default palette size.
    pub const DEFAULT: Self = Self(16);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the inner value as a `usize` for lengths and indexing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to the range `1..=MAX_COLORS`.
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value == 0 {
            Self::MIN
        } else if value <= MAX_COLORS {
            Self(value)
        } else {
            Self::MAX
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Err(Error::ZeroPaletteSize),
            v if v <= MAX_COLORS => Ok(Self(v)),
            v => Err(Error::PaletteSizeTooLarge(v.into())),
        }
    }
}

impl TryFrom<u32> for PaletteSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .map_err(|_| Error::PaletteSizeTooLarge(value))
            .and_then(Self::try_from)
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// A representative color and the number of pixels that were mapped to it.
///
/// The count is only used for ranking and padding; it is never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSample {
    /// The representative color.
    pub color: Srgb<u8>,
    /// The number of source pixels assigned to `color`.
    pub count: u32,
}

impl ColorSample {
    /// Creates a new [`ColorSample`].
    #[must_use]
    pub const fn new(color: Srgb<u8>, count: u32) -> Self {
        Self { color, count }
    }

    /// The BT.709 luminance of the sample's color.
    #[must_use]
    pub fn luminance(&self) -> f64 {
        luminance(self.color)
    }
}

/// An ordered list of exactly `N` [`ColorSample`]s, in left to right render order.
///
/// A [`Palette`] can only be created through [`normalize`](crate::normalize),
/// which guarantees its length matches the requested [`PaletteSize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<ColorSample>);

impl Palette {
    /// Creates a [`Palette`] without checking its length.
    pub(crate) fn new_unchecked(samples: Vec<ColorSample>) -> Self {
        Self(samples)
    }

    /// Returns the inner `Vec` of samples.
    #[must_use]
    pub fn into_inner(self) -> Vec<ColorSample> {
        self.0
    }

    /// Returns an iterator over the colors of the palette.
    pub fn colors(&self) -> impl Iterator<Item = Srgb<u8>> + '_ {
        self.0.iter().map(|sample| sample.color)
    }
}

impl Deref for Palette {
    type Target = [ColorSample];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[ColorSample]> for Palette {
    fn as_ref(&self) -> &[ColorSample] {
        self
    }
}
