//! Contains the crate's error type.

use thiserror::Error;

/// The errors that can occur while building a palette bar.
///
/// Lenient configuration (an unparsable swatch aspect or an unknown quantization method)
/// never produces an error, it falls back to the defaults instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A palette size of zero was requested.
    #[error("palette size must be at least 1")]
    ZeroPaletteSize,

    /// A palette size above [`MAX_COLORS`](crate::MAX_COLORS) was requested.
    #[error("palette size {0} is above the maximum of 256")]
    PaletteSizeTooLarge(u32),

    /// The quantizer could not extract a single color (e.g., the image is empty).
    #[error("image has no extractable colors")]
    NoColors,

    /// The image has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels,
    /// or the composite would exceed the maximum image height.
    #[error("image too large: {width}x{height}")]
    ImageTooLarge {
        /// The width of the offending image.
        width: u32,
        /// The height of the offending image.
        height: u32,
    },

    /// The bar and the image do not have the same width.
    #[error("bar width {bar} does not match image width {image}")]
    WidthMismatch {
        /// The width of the source image.
        image: u32,
        /// The width of the rendered bar.
        bar: u32,
    },
}

/// A `Result` defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
