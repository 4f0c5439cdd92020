//! Turns the output of a quantizer into a [`Palette`] of exactly the requested size.

use crate::{ColorSample, Error, Palette, PaletteSize, Result};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Normalizes quantizer output into a [`Palette`] with exactly `palette_size` entries.
///
/// - If there are fewer samples than requested, the samples are ranked by count (descending,
///   ties keep their order) and `ranked[len % ranked.len()]` is appended until the palette
///   is full, where `len` is the current palette length.
/// - If `sort_by_luma` is set, the samples are stably sorted by ascending
///   [luminance](crate::luminance). Otherwise, the input order is kept.
/// - Only the first `palette_size` samples are kept.
///
/// # Errors
/// Returns [`Error::NoColors`] if `samples` is empty.
///
/// # Examples
/// ```
/// # use swatchbar::{normalize, ColorSample, PaletteSize};
/// # use palette::Srgb;
/// # fn main() -> Result<(), swatchbar::Error> {
/// let samples = vec![
///     ColorSample::new(Srgb::new(255, 255, 255), 10),
///     ColorSample::new(Srgb::new(0, 0, 0), 30),
/// ];
/// let palette = normalize(samples, PaletteSize::try_from(3u16)?, true)?;
/// assert_eq!(palette.len(), 3);
/// assert_eq!(palette[0].color, Srgb::new(0, 0, 0));
/// # Ok(())
/// # }
/// ```
pub fn normalize(
    mut samples: Vec<ColorSample>,
    palette_size: PaletteSize,
    sort_by_luma: bool,
) -> Result<Palette> {
    if samples.is_empty() {
        return Err(Error::NoColors);
    }

    let n = palette_size.as_usize();

    if samples.len() < n {
        let mut ranked = samples.clone();
        ranked.sort_by_key(|sample| Reverse(sample.count));
        while samples.len() < n {
            samples.push(ranked[samples.len() % ranked.len()]);
        }
    }

    if sort_by_luma {
        samples.sort_by_key(|sample| OrderedFloat(sample.luminance()));
    }

    samples.truncate(n);

    Ok(Palette::new_unchecked(samples))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use palette::Srgb;

    fn sample(r: u8, g: u8, b: u8, count: u32) -> ColorSample {
        ColorSample::new(Srgb::new(r, g, b), count)
    }

    fn size(n: u16) -> PaletteSize {
        PaletteSize::try_from(n).unwrap()
    }

    #[test]
    fn empty_is_an_error() {
        assert_eq!(normalize(Vec::new(), PaletteSize::DEFAULT, true), Err(Error::NoColors));
    }

    #[test]
    fn exact_length_for_every_size() {
        let samples = vec![sample(10, 20, 30, 5), sample(200, 100, 0, 9), sample(0, 0, 255, 1)];
        for n in 1..=40 {
            for sort in [false, true] {
                let palette = normalize(samples.clone(), size(n), sort).unwrap();
                assert_eq!(palette.len(), usize::from(n));
            }
        }
    }

    #[test]
    fn padding_cycles_through_ranked_samples() {
        let a = sample(1, 1, 1, 2);
        let b = sample(2, 2, 2, 7);
        let c = sample(3, 3, 3, 7);

        // ranked: [b, c, a]; pad indices are 3 % 3, 4 % 3, 5 % 3, 6 % 3
        let palette = normalize(vec![a, b, c], size(7), false).unwrap();
        assert_eq!(palette.into_inner(), vec![a, b, c, b, c, a, b]);
    }

    #[test]
    fn single_sample_fills_palette() {
        let red = sample(255, 0, 0, 100);
        let palette = normalize(vec![red], size(4), true).unwrap();
        assert!(palette.iter().all(|&s| s == red));
    }

    #[test]
    fn luma_sort_is_non_decreasing_and_stable() {
        let samples = vec![
            sample(255, 255, 255, 1),
            sample(0, 0, 255, 1),
            sample(0, 255, 0, 1),
            sample(0, 0, 255, 2),
            sample(255, 0, 0, 1),
        ];
        let palette = normalize(samples, size(5), true).unwrap();

        for pair in palette.windows(2) {
            assert!(pair[0].luminance() <= pair[1].luminance());
        }
        // equal colors keep their relative order
        assert_eq!(palette[0], sample(0, 0, 255, 1));
        assert_eq!(palette[1], sample(0, 0, 255, 2));
        assert_eq!(palette[4].color, Srgb::new(255, 255, 255));
    }

    #[test]
    fn unsorted_keeps_input_order() {
        let samples = vec![sample(255, 255, 255, 1), sample(0, 0, 0, 1)];
        let palette = normalize(samples.clone(), size(2), false).unwrap();
        assert_eq!(palette.into_inner(), samples);
    }

    #[test]
    fn truncates_after_sorting() {
        let samples = vec![sample(255, 255, 255, 1), sample(128, 128, 128, 1), sample(0, 0, 0, 1)];
        let palette = normalize(samples.clone(), size(2), true).unwrap();
        assert_eq!(palette.colors().collect::<Vec<_>>(), vec![Srgb::new(0, 0, 0), Srgb::new(128, 128, 128)]);

        let palette = normalize(samples, size(2), false).unwrap();
        assert_eq!(palette[0].color, Srgb::new(255, 255, 255));
    }
}
