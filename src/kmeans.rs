//! Color quantization using Lloyd's k-means over a random sample of the pixels.
//!
//! 1. If the image has more than [`MAX_SAMPLES`] pixels, a uniform random sample of
//!    [`MAX_SAMPLES`] pixels is drawn without replacement. Otherwise, all pixels are used.
//! 2. `min(k, samples)` distinct sample points are drawn as the initial centroids.
//! 3. Exactly [`ROUNDS`] rounds of assignment (by squared euclidean distance in RGB)
//!    and update are run. A centroid that is assigned no points is reseeded
//!    with a random sample point.
//! 4. Every pixel of the full image is assigned to its nearest centroid to get pixel counts.
//!
//! The resulting centroids are returned by descending pixel count.
//!
//! Two random number generators are used. The sampling generator (step 1) is seeded from
//! [`KmeansOptions::sample_seed`], or from the operating system if no seed was given.
//! The initialization generator (steps 2 and 3) is always seeded from [`KmeansOptions::seed`],
//! so the clustering is reproducible for the same sample.

use crate::{ColorSample, KmeansOptions, PaletteSize, Quantizer};
use ordered_float::OrderedFloat;
use palette::{cast, Srgb};
use rand::{seq::index, Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use tracing::trace;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The maximum number of pixels clustered during the k-means rounds.
pub const MAX_SAMPLES: usize = 50_000;

/// The number of assignment and update rounds.
pub const ROUNDS: usize = 10;

/// A centroid in RGB space.
type Centroid = [f64; 3];

impl Quantizer for KmeansOptions {
    fn quantize(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
        palette(colors, palette_size, *self)
    }
}

/// Returns the index of the centroid nearest to `color`, preferring the lowest index on ties.
#[inline]
fn nearest(centroids: &[Centroid], color: [u8; 3]) -> usize {
    let color = color.map(f64::from);
    centroids
        .iter()
        .map(|centroid| {
            let mut dist = 0.0;
            for c in 0..3 {
                let d = color[c] - centroid[c];
                dist += d * d;
            }
            OrderedFloat(dist)
        })
        .enumerate()
        .min_by_key(|&(_, dist)| dist)
        .map_or(0, |(i, _)| i)
}

/// Assigns each point to its nearest centroid.
fn assign(centroids: &[Centroid], points: &[[u8; 3]]) -> Vec<usize> {
    points.iter().map(|&p| nearest(centroids, p)).collect()
}

/// Assigns each point to its nearest centroid in parallel.
#[cfg(feature = "threads")]
fn assign_par(centroids: &[Centroid], points: &[[u8; 3]]) -> Vec<usize> {
    points.par_iter().map(|&p| nearest(centroids, p)).collect()
}

/// Draws the points to cluster from the full image.
fn sample_points(colors: &[[u8; 3]], sample_seed: Option<u64>) -> Vec<[u8; 3]> {
    if colors.len() > MAX_SAMPLES {
        let mut rng = match sample_seed {
            Some(seed) => Xoroshiro128PlusPlus::seed_from_u64(seed),
            None => Xoroshiro128PlusPlus::from_entropy(),
        };
        index::sample(&mut rng, colors.len(), MAX_SAMPLES)
            .into_iter()
            .map(|i| colors[i])
            .collect()
    } else {
        colors.to_vec()
    }
}

/// Runs k-means with the given assignment function.
fn run(
    colors: &[Srgb<u8>],
    k: PaletteSize,
    options: KmeansOptions,
    assign_labels: impl Fn(&[Centroid], &[[u8; 3]]) -> Vec<usize>,
) -> Vec<ColorSample> {
    let colors: &[[u8; 3]] = cast::into_array_slice(colors);
    let samples = sample_points(colors, options.sample_seed);
    if samples.is_empty() {
        return Vec::new();
    }

    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let k = k.as_usize().min(samples.len());

    let mut centroids = index::sample(rng, samples.len(), k)
        .into_iter()
        .map(|i| samples[i].map(f64::from))
        .collect::<Vec<Centroid>>();

    for round in 0..ROUNDS {
        let labels = assign_labels(&centroids, &samples);

        let mut sums = vec![[0u64; 3]; k];
        let mut counts = vec![0u64; k];
        for (&label, point) in labels.iter().zip(&samples) {
            counts[label] += 1;
            for (sum, &c) in sums[label].iter_mut().zip(point) {
                *sum += u64::from(c);
            }
        }

        let mut reseeded = 0;
        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            if count == 0 {
                *centroid = samples[rng.gen_range(0..samples.len())].map(f64::from);
                reseeded += 1;
            } else {
                #[allow(clippy::cast_precision_loss)]
                let n = count as f64;
                #[allow(clippy::cast_precision_loss)]
                {
                    *centroid = sum.map(|s| s as f64 / n);
                }
            }
        }

        trace!(round, reseeded, "k-means round");
    }

    let mut counts = vec![0u32; k];
    for label in assign_labels(&centroids, colors) {
        counts[label] += 1;
    }

    let mut palette = centroids
        .into_iter()
        .zip(counts)
        .map(|(centroid, count)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let color = centroid.map(|c| c.round().clamp(0.0, 255.0) as u8);
            ColorSample::new(cast::from_array(color), count)
        })
        .collect::<Vec<_>>();

    palette.sort_by_key(|sample| std::cmp::Reverse(sample.count));
    palette.truncate(k);
    palette
}

/// Computes a color palette from the given `colors` with at most `palette_size` entries.
///
/// See the [module documentation](self) for more details.
#[must_use]
pub fn palette(
    colors: &[Srgb<u8>],
    palette_size: PaletteSize,
    options: KmeansOptions,
) -> Vec<ColorSample> {
    run(colors, palette_size, options, assign)
}

/// Computes a color palette in parallel from the given `colors` with at most `palette_size` entries.
///
/// Given the same sample, the result is identical to [`palette`].
#[cfg(feature = "threads")]
#[must_use]
pub fn palette_par(
    colors: &[Srgb<u8>],
    palette_size: PaletteSize,
    options: KmeansOptions,
) -> Vec<ColorSample> {
    run(colors, palette_size, options, assign_par)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn seeded() -> KmeansOptions {
        KmeansOptions::new().sample_seed(Some(7))
    }

    #[test]
    fn empty_input() {
        assert!(palette(&[], PaletteSize::MAX, seeded()).is_empty());
    }

    #[test]
    fn single_color_gives_k_equal_samples() {
        for len in [1, 3, 100, MAX_SAMPLES + 10] {
            let colors = vec![Srgb::new(12, 200, 99); len];
            let k = PaletteSize::try_from(4u16).unwrap();
            let result = palette(&colors, k, KmeansOptions::new());
            assert_eq!(result.len(), len.min(4));
            assert!(result.iter().all(|s| s.color == Srgb::new(12, 200, 99)));
            assert_eq!(result.iter().map(|s| s.count as usize).sum::<usize>(), len);
        }
    }

    #[test]
    fn fewer_pixels_than_k() {
        let colors = [Srgb::new(0, 0, 0), Srgb::new(255, 0, 0)];
        let result = palette(&colors, PaletteSize::DEFAULT, seeded());
        assert_eq!(result.len(), 2);
        assert_eq!(result.iter().map(|s| s.count).sum::<u32>(), 2);
    }

    #[test]
    fn counts_cover_full_image_and_descend() {
        let colors = test_data_1024();
        let result = palette(&colors, PaletteSize::try_from(8u16).unwrap(), seeded());
        assert_eq!(result.len(), 8);
        assert_eq!(result.iter().map(|s| s.count).sum::<u32>(), 1024);
        for pair in result.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn reproducible_with_sample_seed() {
        let colors = [test_data_1024().as_slice(); 64].concat();
        assert!(colors.len() > MAX_SAMPLES);
        let k = PaletteSize::try_from(6u16).unwrap();
        assert_eq!(palette(&colors, k, seeded()), palette(&colors, k, seeded()));
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let colors = [test_data_1024().as_slice(); 64].concat();
        let k = PaletteSize::try_from(16u16).unwrap();
        assert_eq!(palette(&colors, k, seeded()), palette_par(&colors, k, seeded()));
    }
}
