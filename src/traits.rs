use crate::{ColorSample, PaletteSize};
use palette::Srgb;

/// A color quantization strategy.
///
/// Given the pixels of an image, a quantizer returns at most `palette_size` representative
/// colors, each with the number of pixels mapped to it. It may return fewer colors
/// (e.g., when the image has fewer distinct colors), and it returns nothing for empty input.
///
/// The order of the returned samples is implementation-defined.
pub trait Quantizer {
    /// Computes the representative colors of `colors`.
    fn quantize(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample>;
}
