//! A library that extracts a small representative color palette from an image
//! and renders it as a swatch bar composited beneath the image.
//!
//! # Features
//! `swatchbar` has several `cargo` features that can be turned off or on:
//! - `kmeans`: adds k-means as an additional quantization method.
//! - `threads`: exposes parallel versions of the pipeline and k-means via [`rayon`].
//! - `cli`: builds the `swatchbar` command line tool.
//!
//! # High-Level API
//! To get started, see [`build_palette_bar`] and [`BarOptions`]:
//! ```no_run
//! # use swatchbar::{build_palette_bar, BarOptions, PaletteSize, QuantizeMethod, SwatchAspect};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let options = BarOptions::new()
//!     .palette_size(PaletteSize::try_from(12u16)?) // the number of swatches
//!     .swatch_aspect(Some(SwatchAspect::parse("1:1"))) // square swatches
//!     .quantize_method(QuantizeMethod::Octree);
//!
//! let result = build_palette_bar(&img, &options)?;
//! result.composite.save("with_bar.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Low-Level API
//! Each stage of the pipeline is also exposed on its own:
//! 1. a [`Quantizer`] (see [`median_cut`], [`octree`], and `kmeans`) reduces the pixels to
//!    at most `N` [`ColorSample`]s,
//! 2. [`normalize`] pads, sorts, and truncates those into a [`Palette`] of exactly `N` colors,
//! 3. [`layout()`] computes the [`BarGeometry`] for the image size,
//! 4. [`render()`] draws the bar, and [`compose()`] stacks it beneath the image.
//!
//! [`apply_export_resize`] rescales the result before it is saved.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod compose;
mod error;
mod export;
mod layout;
mod pipeline;
mod quantize_method;
mod render;
mod select;
mod traits;
mod types;

pub mod median_cut;
pub mod octree;

#[cfg(feature = "kmeans")]
pub mod kmeans;

pub use compose::compose;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use pipeline::*;
pub use quantize_method::*;
pub use render::*;
pub use select::normalize;
pub use traits::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

#[cfg(test)]
pub(crate) mod tests {
    use image::RgbImage;
    use palette::{cast, Srgb};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// Six colors that fall into distinct bins for every bucket quantizer.
    pub const BLOCK_COLORS: [Srgb<u8>; 6] = [
        Srgb::new(230, 25, 75),
        Srgb::new(60, 180, 75),
        Srgb::new(255, 225, 25),
        Srgb::new(0, 130, 200),
        Srgb::new(245, 130, 48),
        Srgb::new(145, 30, 180),
    ];

    /// 1024 random colors from a fixed seed.
    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
        (0..1024)
            .map(|_| cast::from_array(rng.gen::<[u8; 3]>()))
            .collect()
    }

    /// An image made of vertical stripes, one per color, each `block_width x height` pixels.
    pub fn block_image(colors: &[Srgb<u8>], block_width: u32, height: u32) -> RgbImage {
        let width = block_width * colors.len() as u32;
        RgbImage::from_fn(width, height, |x, _| {
            image::Rgb(cast::into_array(colors[(x / block_width) as usize]))
        })
    }

    /// An image of a single color.
    pub fn solid_image(width: u32, height: u32, color: Srgb<u8>) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb(cast::into_array(color)))
    }
}
