//! Median cut color quantization over a binned RGB histogram.
//!
//! Pixels are first counted into a `32 x 32 x 32` histogram (the top 5 bits of each channel).
//! The histogram is then turned into cumulative moments so that the pixel count and the
//! component sums of any box of bins can be looked up in constant time.
//!
//! Starting from a single box spanning all occupied bins, the box with the most pixels
//! is repeatedly shrunk to its occupied bins and cut in two along its longest dimension
//! at the bin containing its median pixel. This continues until there are `palette_size`
//! boxes or no box spans more than one occupied bin.
//! Each box yields the mean color of its pixels.
//!
//! The result is deterministic for a given input.

use crate::{ColorSample, PaletteSize, Quantizer};
use num_traits::Zero;
use palette::{cast, Srgb};
use std::{
    array,
    collections::BinaryHeap,
    ops::{Add, AddAssign, Index, IndexMut, Sub},
};

/// The number of components in the color types.
const N: usize = 3;

/// The number of bits kept from each color component.
const BITS: u32 = 5;

/// The number of bins in each dimension.
const B: usize = 1 << BITS;

/// The median cut quantizer. See the [module documentation](self) for more details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
        palette(colors, palette_size)
    }
}

/// Computes a color palette from the given `colors` with at most `palette_size` entries.
#[must_use]
pub fn palette(colors: &[Srgb<u8>], palette_size: PaletteSize) -> Vec<ColorSample> {
    if colors.is_empty() {
        Vec::new()
    } else {
        Histogram::new(colors).palette(palette_size)
    }
}

/// A box over a range of histogram bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cube {
    /// The lower bin indices (inclusive).
    min: [u8; N],
    /// The upper bin indices (exclusive).
    max: [u8; N],
}

impl Cube {
    /// The cube spanning the whole histogram.
    #[allow(clippy::cast_possible_truncation)]
    const FULL: Self = Self { min: [0; N], max: [B as u8; N] };

    /// The number of bins spanned in the given dimension.
    fn extent(self, dim: usize) -> u8 {
        self.max[dim] - self.min[dim]
    }

    /// The dimension with the most bins, preferring red, then green, then blue on ties.
    fn longest_dim(self) -> usize {
        (0..N)
            .max_by_key(|&d| (self.extent(d), std::cmp::Reverse(d)))
            .unwrap_or(0)
    }
}

/// Statistics for a histogram bin (or for a box of bins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stats {
    /// The number of pixels assigned to the bin.
    count: u32,
    /// The component-wise sum of the pixels assigned to the bin.
    components: [u64; N],
}

impl Add for Stats {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            count: self.count + rhs.count,
            components: array::from_fn(|i| self.components[i] + rhs.components[i]),
        }
    }
}

impl Sub for Stats {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            count: self.count - rhs.count,
            components: array::from_fn(|i| self.components[i] - rhs.components[i]),
        }
    }
}

impl AddAssign for Stats {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        for i in 0..N {
            self.components[i] += rhs.components[i];
        }
    }
}

impl Zero for Stats {
    fn zero() -> Self {
        Self { count: 0, components: [0; N] }
    }

    fn is_zero(&self) -> bool {
        self.count == 0 && self.components.iter().all(Zero::is_zero)
    }
}

/// A `B x B x B` grid of values stored in a flat `Vec`.
struct Grid<T>(Vec<T>);

impl<T> Index<[usize; N]> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, [r, g, b]: [usize; N]) -> &Self::Output {
        &self.0[(r * B + g) * B + b]
    }
}

impl<T> IndexMut<[usize; N]> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, [r, g, b]: [usize; N]) -> &mut Self::Output {
        &mut self.0[(r * B + g) * B + b]
    }
}

impl<T> Index<[u8; N]> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: [u8; N]) -> &Self::Output {
        &self[index.map(usize::from)]
    }
}

/// This macro generates code for a fixed number of recursive calls to a volume function.
macro_rules! ndvolume {
    ($self: ident, $min: ident, $max: ident, $index: ident; $n: literal $(, $ns: literal)* $(,)?) => {{
        $index[$n] = $max[$n] - 1;
        let upper = ndvolume!($self, $min, $max, $index; $($ns,)*);

        let lower = if $min[$n] == 0 {
            Stats::zero()
        } else {
            $index[$n] = $min[$n] - 1;
            ndvolume!($self, $min, $max, $index; $($ns,)*)
        };

        upper - lower
    }};
    ($self: ident, $min: ident, $max: ident, $index: ident;) => {
        $self[$index]
    };
}

impl Grid<Stats> {
    /// Returns the sum of the bins inside the given cube.
    fn volume(&self, Cube { min, max }: Cube) -> Stats {
        let mut index = [0u8; N];
        ndvolume!(self, min, max, index; 0, 1, 2)
    }

    /// Returns the sum of the bins inside the given cube,
    /// but with the given dimension spanning all bins below `bin` instead.
    fn volume_below(&self, Cube { min, max }: Cube, dim: usize, bin: u8) -> Stats {
        if bin == 0 {
            Stats::zero()
        } else {
            let bin = bin - 1;
            let mut index = [0u8; N];
            match dim {
                0 => {
                    index[0] = bin;
                    ndvolume!(self, min, max, index; 1, 2)
                }
                1 => {
                    index[1] = bin;
                    ndvolume!(self, min, max, index; 0, 2)
                }
                2 => {
                    index[2] = bin;
                    ndvolume!(self, min, max, index; 0, 1)
                }
                _ => unreachable!("dim < {N}"),
            }
        }
    }

    /// Returns the number of pixels in the cube whose bin along `dim` lies in `cube.min[dim]..bin`.
    fn count_until(&self, cube: Cube, dim: usize, bin: u8) -> u32 {
        let base = self.volume_below(cube, dim, cube.min[dim]);
        (self.volume_below(cube, dim, bin) - base).count
    }
}

/// A cube and the number of pixels inside it, ordered by the pixel count.
struct CubeCount(Cube, u32);

impl PartialOrd for CubeCount {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CubeCount {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.1.cmp(&other.1)
    }
}

impl Eq for CubeCount {}

impl PartialEq for CubeCount {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

/// The cumulative histogram used for median cut.
struct Histogram {
    /// The cumulative moments of the histogram bins.
    moments: Grid<Stats>,
}

impl Histogram {
    /// Creates a new [`Histogram`] filled with the given colors.
    fn new(colors: &[Srgb<u8>]) -> Self {
        let mut moments = Grid(vec![Stats::zero(); B * B * B]);

        for &color in colors {
            let color = cast::into_array(color);
            let stats = &mut moments[color.map(|c| usize::from(c >> (u8::BITS - BITS)))];
            stats.count += 1;
            for (sum, c) in stats.components.iter_mut().zip(color) {
                *sum += u64::from(c);
            }
        }

        let mut hist = Self { moments };
        hist.calc_cumulative_moments();
        hist
    }

    /// Creates moments from the histogram bins to allow inclusion-exclusion lookups.
    fn calc_cumulative_moments(&mut self) {
        let hist = &mut self.moments;

        for r in 0..B {
            let mut area = [Stats::zero(); B];

            for g in 0..B {
                let mut line = Stats::zero();

                for b in 0..B {
                    line += hist[[r, g, b]];
                    area[b] += line;

                    if r == 0 {
                        hist[[r, g, b]] = area[b];
                    } else {
                        hist[[r, g, b]] = hist[[r - 1, g, b]] + area[b];
                    }
                }
            }
        }
    }

    /// Shrinks the given non-empty cube to the smallest cube containing all of its pixels.
    fn shrink(&self, cube: Cube) -> Cube {
        let total = self.moments.volume(cube).count;
        let mut tight = cube;

        for d in 0..N {
            let (lo, hi) = (cube.min[d], cube.max[d]);
            if let Some(min) = (lo..hi).find(|&bin| self.moments.count_until(cube, d, bin + 1) > 0) {
                tight.min[d] = min;
            }
            if let Some(max) = ((lo + 1)..=hi).find(|&bin| self.moments.count_until(cube, d, bin) == total) {
                tight.max[d] = max;
            }
        }

        tight
    }

    /// Attempts to cut the given (shrunk) cube in two at the median of its longest dimension.
    ///
    /// Returns `None` if the cube is a single bin.
    fn cut(&self, cube: Cube) -> Option<(Cube, Cube)> {
        let d = cube.longest_dim();
        if cube.extent(d) < 2 {
            return None;
        }

        let total = u64::from(self.moments.volume(cube).count);
        let last = cube.max[d] - 1;

        // Both halves are non-empty, since a shrunk cube has pixels in its first and last bins.
        let cut = ((cube.min[d] + 1)..last)
            .find(|&bin| 2 * u64::from(self.moments.count_until(cube, d, bin)) >= total)
            .unwrap_or(last);

        let mut lower = cube;
        let mut upper = cube;
        lower.max[d] = cut;
        upper.min[d] = cut;
        Some((self.shrink(lower), self.shrink(upper)))
    }

    /// Returns the disjoint cubes resulting from median cut.
    fn cubes(&self, k: PaletteSize) -> Vec<Cube> {
        let k = k.as_usize();

        let full = self.moments.volume(Cube::FULL).count;
        let mut queue = BinaryHeap::with_capacity(k);
        let mut done = Vec::new();

        if full > 0 {
            queue.push(CubeCount(self.shrink(Cube::FULL), full));
        }

        while queue.len() + done.len() < k {
            let Some(CubeCount(cube, _)) = queue.pop() else {
                break;
            };

            if let Some((lower, upper)) = self.cut(cube) {
                queue.push(CubeCount(lower, self.moments.volume(lower).count));
                queue.push(CubeCount(upper, self.moments.volume(upper).count));
            } else {
                done.push(cube);
            }
        }

        done.extend(queue.into_iter().map(|CubeCount(cube, _)| cube));
        done
    }

    /// Returns the mean color of and the number of pixels in the given cube.
    fn cube_sample(&self, cube: Cube) -> ColorSample {
        let Stats { count, components } = self.moments.volume(cube);
        debug_assert!(count > 0);
        let n = u64::from(count);
        #[allow(clippy::cast_possible_truncation)]
        let color = components.map(|c| ((c + n / 2) / n) as u8);
        ColorSample::new(cast::from_array(color), count)
    }

    /// Computes the color palette.
    fn palette(&self, k: PaletteSize) -> Vec<ColorSample> {
        self.cubes(k)
            .into_iter()
            .map(|cube| self.cube_sample(cube))
            .collect()
    }
}
